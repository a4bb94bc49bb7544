use crate::config::Config;
use crate::events::ScenarioEvents;
use crate::form::ScenarioFormController;
use crate::list::{ListOptions, ScenarioListController};
use crate::service::HttpLoanService;
use crate::ui::Tab;
use std::sync::Arc;
use tokio::task::JoinHandle;

#[derive(Clone)]
pub struct AppState {
    pub events: ScenarioEvents,
    pub form: Arc<ScenarioFormController<HttpLoanService>>,
    pub home: Arc<ScenarioListController<HttpLoanService>>,
    pub saved: Arc<ScenarioListController<HttpLoanService>>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let service = Arc::new(HttpLoanService::from_config(config));
        let events = ScenarioEvents::new();
        Self {
            form: Arc::new(ScenarioFormController::new(Arc::clone(&service), events.clone())),
            home: Arc::new(ScenarioListController::new(
                Arc::clone(&service),
                events.clone(),
                ListOptions { allow_delete: false },
            )),
            saved: Arc::new(ScenarioListController::new(
                service,
                events.clone(),
                ListOptions { allow_delete: true },
            )),
            events,
        }
    }

    pub fn list(&self, tab: Tab) -> &Arc<ScenarioListController<HttpLoanService>> {
        match tab {
            Tab::Home => &self.home,
            Tab::Saved => &self.saved,
        }
    }

    /// Loads both lists and starts their notification listeners.
    pub async fn mount(&self) -> Vec<JoinHandle<()>> {
        let mut listeners = Vec::new();
        for list in [&self.home, &self.saved] {
            list.mount().await;
            listeners.extend(list.spawn_listener().await);
        }
        listeners
    }

    pub async fn unmount(&self) {
        self.form.unmount();
        self.home.unmount().await;
        self.saved.unmount().await;
    }
}
