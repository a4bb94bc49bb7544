//! Saved scenarios: listing, detail modal, and delete confirmation.

use crate::events::{ScenarioEvents, Subscription};
use crate::models::{LoanScenario, ScenarioId};
use crate::service::LoanApi;
use serde::Serialize;
use std::sync::{
    Arc, Weak,
    atomic::{AtomicBool, Ordering},
};
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListOptions {
    pub allow_delete: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListState {
    pub loans: Vec<LoanScenario>,
    pub loading: bool,
    pub error: Option<String>,
    pub selected: Option<LoanScenario>,
    pub modal_open: bool,
    pub pending_delete_id: Option<ScenarioId>,
    pub viewing: bool,
    pub deleting: bool,
}

impl ListState {
    /// Scenario shown in the detail modal, if it is open.
    pub fn open_detail(&self) -> Option<&LoanScenario> {
        self.selected.as_ref().filter(|_| self.modal_open)
    }
}

#[derive(Debug, Clone)]
pub enum ListEvent {
    FetchStarted,
    FetchSucceeded(Vec<LoanScenario>),
    FetchFailed(String),
    FetchDiscarded,
    DetailRequested,
    DetailLoaded(LoanScenario),
    DetailFailed(String),
    DetailDiscarded,
    ModalClosed,
    DeleteRequested(ScenarioId),
    DeleteCancelled,
    DeleteConfirmed,
    DeleteSucceeded,
    DeleteFailed(String),
    DeleteDiscarded,
}

pub fn reduce(mut state: ListState, event: ListEvent) -> ListState {
    match event {
        ListEvent::FetchStarted => state.loading = true,
        ListEvent::FetchSucceeded(loans) => {
            state.loans = loans;
            state.error = None;
            state.loading = false;
        }
        ListEvent::FetchFailed(message) => {
            state.error = Some(message);
            state.loading = false;
        }
        ListEvent::FetchDiscarded => state.loading = false,
        ListEvent::DetailRequested => state.viewing = true,
        ListEvent::DetailLoaded(scenario) => {
            state.selected = Some(scenario);
            state.modal_open = true;
            state.viewing = false;
        }
        ListEvent::DetailFailed(message) => {
            state.error = Some(message);
            state.selected = None;
            state.modal_open = false;
            state.viewing = false;
        }
        ListEvent::DetailDiscarded => state.viewing = false,
        ListEvent::ModalClosed => {
            state.selected = None;
            state.modal_open = false;
        }
        ListEvent::DeleteRequested(id) => state.pending_delete_id = Some(id),
        ListEvent::DeleteCancelled => state.pending_delete_id = None,
        ListEvent::DeleteConfirmed => {
            state.pending_delete_id = None;
            state.deleting = true;
        }
        ListEvent::DeleteSucceeded => state.deleting = false,
        ListEvent::DeleteFailed(message) => {
            state.error = Some(message);
            state.deleting = false;
        }
        ListEvent::DeleteDiscarded => state.deleting = false,
    }
    state
}

pub struct ScenarioListController<S> {
    service: Arc<S>,
    events: ScenarioEvents,
    options: ListOptions,
    state: Mutex<ListState>,
    subscription: Mutex<Option<Subscription>>,
    mounted: AtomicBool,
}

impl<S: LoanApi> ScenarioListController<S> {
    pub fn new(service: Arc<S>, events: ScenarioEvents, options: ListOptions) -> Self {
        Self {
            service,
            events,
            options,
            state: Mutex::new(ListState::default()),
            subscription: Mutex::new(None),
            mounted: AtomicBool::new(false),
        }
    }

    pub fn allows_delete(&self) -> bool {
        self.options.allow_delete
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    pub async fn snapshot(&self) -> ListState {
        self.state.lock().await.clone()
    }

    async fn apply(&self, event: ListEvent) {
        let mut state = self.state.lock().await;
        *state = reduce(std::mem::take(&mut *state), event);
    }

    /// Starts listening for new scenarios, then loads the list.
    pub async fn mount(&self) {
        *self.subscription.lock().await = Some(self.events.subscribe());
        self.mounted.store(true, Ordering::SeqCst);
        self.refresh().await;
    }

    /// Stops listening; responses still in flight are dropped on arrival.
    pub async fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
        self.subscription.lock().await.take();
    }

    pub async fn refresh(&self) {
        if !self.is_mounted() {
            return;
        }
        self.apply(ListEvent::FetchStarted).await;
        let response = self.service.list().await;
        if !self.is_mounted() {
            debug!("list torn down; discarding scenario list");
            self.apply(ListEvent::FetchDiscarded).await;
            return;
        }
        match response {
            Ok(loans) => {
                debug!(count = loans.len(), "scenario list loaded");
                self.apply(ListEvent::FetchSucceeded(loans)).await;
            }
            Err(err) => {
                warn!("failed to load scenarios: {err}");
                self.apply(ListEvent::FetchFailed(err.to_string())).await;
            }
        }
    }

    /// Refreshes once for every notification already delivered. Returns how
    /// many refreshes ran.
    pub async fn process_notifications(&self) -> usize {
        let mut handled = 0;
        loop {
            let next = match self.subscription.lock().await.as_mut() {
                Some(subscription) => subscription.try_recv(),
                None => None,
            };
            if next.is_none() {
                return handled;
            }
            self.refresh().await;
            handled += 1;
        }
    }

    /// Moves the subscription into a background task that refreshes on each
    /// notification. The task ends when the controller is dropped or unmounted.
    pub async fn spawn_listener(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let mut subscription = self.subscription.lock().await.take()?;
        let controller: Weak<Self> = Arc::downgrade(self);
        Some(tokio::spawn(async move {
            while subscription.recv().await.is_some() {
                let Some(controller) = controller.upgrade() else {
                    break;
                };
                if !controller.is_mounted() {
                    break;
                }
                controller.refresh().await;
            }
        }))
    }

    pub async fn view(&self, id: &ScenarioId) {
        if !self.is_mounted() {
            debug!(%id, "view ignored; list not mounted");
            return;
        }
        {
            let mut state = self.state.lock().await;
            if state.viewing {
                debug!(%id, "view ignored; detail request outstanding");
                return;
            }
            *state = reduce(std::mem::take(&mut *state), ListEvent::DetailRequested);
        }

        let response = self.service.get_by_id(id).await;
        if !self.is_mounted() {
            debug!(%id, "list torn down; discarding scenario detail");
            self.apply(ListEvent::DetailDiscarded).await;
            return;
        }
        match response {
            Ok(scenario) => self.apply(ListEvent::DetailLoaded(scenario)).await,
            Err(err) => {
                warn!(%id, "failed to load scenario: {err}");
                self.apply(ListEvent::DetailFailed(err.to_string())).await;
            }
        }
    }

    pub async fn close_modal(&self) {
        self.apply(ListEvent::ModalClosed).await;
    }

    /// Opens the confirmation prompt. No-op on lists without delete.
    pub async fn request_delete(&self, id: ScenarioId) {
        if !self.allows_delete() {
            warn!(%id, "delete requested on a list without delete capability");
            return;
        }
        self.apply(ListEvent::DeleteRequested(id)).await;
    }

    pub async fn cancel_delete(&self) {
        self.apply(ListEvent::DeleteCancelled).await;
    }

    pub async fn confirm_delete(&self) {
        if !self.is_mounted() {
            debug!("confirm ignored; list not mounted");
            return;
        }
        let id = {
            let mut state = self.state.lock().await;
            if state.deleting {
                debug!("confirm ignored; delete outstanding");
                return;
            }
            let Some(id) = state.pending_delete_id.clone() else {
                return;
            };
            *state = reduce(std::mem::take(&mut *state), ListEvent::DeleteConfirmed);
            id
        };

        let response = self.service.remove(&id).await;
        if !self.is_mounted() {
            debug!(%id, "list torn down; discarding delete result");
            self.apply(ListEvent::DeleteDiscarded).await;
            return;
        }
        match response {
            Ok(()) => {
                info!(%id, "scenario deleted");
                self.apply(ListEvent::DeleteSucceeded).await;
                self.refresh().await;
            }
            Err(err) => {
                warn!(%id, "failed to delete scenario: {err}");
                self.apply(ListEvent::DeleteFailed(err.to_string())).await;
            }
        }
    }
}
