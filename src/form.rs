//! The loan form: input fields, validation, and creating scenarios.

use crate::errors::ServiceError;
use crate::events::ScenarioEvents;
use crate::models::{AmortizationEntry, Field, LoanRequest, LoanScenario, ScenarioId, ValidationErrors};
use crate::service::LoanApi;
use crate::validate::validate;
use serde::Serialize;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormPhase {
    #[default]
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

/// Save the scenario, or only compute it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitMode {
    Save,
    Preview,
}

/// Payment shown in the results panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentResult {
    pub monthly_payment: f64,
    pub schedule_preview: Vec<AmortizationEntry>,
}

impl From<LoanScenario> for PaymentResult {
    fn from(scenario: LoanScenario) -> Self {
        Self {
            monthly_payment: scenario.monthly_payment,
            schedule_preview: scenario.schedule_preview,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormState {
    pub amount: String,
    pub apr: String,
    pub term: String,
    pub phase: FormPhase,
    pub errors: ValidationErrors,
    pub result: Option<PaymentResult>,
}

impl FormState {
    /// Inputs and the submit trigger are disabled while a request is out.
    pub fn is_busy(&self) -> bool {
        self.phase == FormPhase::Submitting
    }
}

#[derive(Debug, Clone)]
pub enum FormEvent {
    AmountChanged(String),
    AprChanged(String),
    TermChanged(String),
    SubmitRequested,
    ValidationFailed(ValidationErrors),
    RequestSent,
    Completed(LoanScenario),
    Failed(ServiceError),
}

pub fn reduce(mut state: FormState, event: FormEvent) -> FormState {
    match event {
        FormEvent::AmountChanged(_)
        | FormEvent::AprChanged(_)
        | FormEvent::TermChanged(_)
        | FormEvent::SubmitRequested
            if state.is_busy() => {}
        FormEvent::AmountChanged(value) => state.amount = value,
        FormEvent::AprChanged(value) => state.apr = value,
        FormEvent::TermChanged(value) => state.term = value,
        FormEvent::SubmitRequested => state.phase = FormPhase::Validating,
        FormEvent::ValidationFailed(errors) => {
            state.phase = FormPhase::Idle;
            state.errors = errors;
            state.result = None;
        }
        FormEvent::RequestSent => {
            state.phase = FormPhase::Submitting;
            state.errors = ValidationErrors::new();
        }
        FormEvent::Completed(scenario) => {
            state.phase = FormPhase::Succeeded;
            state.errors = ValidationErrors::new();
            state.result = Some(scenario.into());
        }
        FormEvent::Failed(err) => {
            state.phase = FormPhase::Failed;
            state.errors = ValidationErrors::server(err.to_string());
            state.result = None;
        }
    }
    state
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// A request was already outstanding.
    Ignored,
    Invalid(ValidationErrors),
    Saved(ScenarioId),
    Calculated,
    Failed(ServiceError),
    /// The controller was torn down before the response arrived.
    Discarded,
}

pub struct ScenarioFormController<S> {
    service: Arc<S>,
    events: ScenarioEvents,
    state: Mutex<FormState>,
    mounted: AtomicBool,
}

impl<S: LoanApi> ScenarioFormController<S> {
    pub fn new(service: Arc<S>, events: ScenarioEvents) -> Self {
        Self {
            service,
            events,
            state: Mutex::new(FormState::default()),
            mounted: AtomicBool::new(true),
        }
    }

    pub async fn snapshot(&self) -> FormState {
        self.state.lock().await.clone()
    }

    pub async fn dispatch(&self, event: FormEvent) {
        let mut state = self.state.lock().await;
        *state = reduce(std::mem::take(&mut *state), event);
    }

    /// Replaces all three inputs, as a browser form post does.
    pub async fn set_inputs(&self, amount: &str, apr: &str, term: &str) {
        self.dispatch(FormEvent::AmountChanged(amount.to_string())).await;
        self.dispatch(FormEvent::AprChanged(apr.to_string())).await;
        self.dispatch(FormEvent::TermChanged(term.to_string())).await;
    }

    pub async fn submit(&self, mode: SubmitMode) -> SubmitOutcome {
        let request = match self.begin_submit().await {
            Ok(request) => request,
            Err(outcome) => return outcome,
        };

        let response = match mode {
            SubmitMode::Save => self.service.create(&request).await,
            SubmitMode::Preview => self.service.calculate(&request).await,
        };

        if !self.is_mounted() {
            debug!("form torn down; discarding loan service response");
            return SubmitOutcome::Discarded;
        }

        match response {
            Ok(scenario) => {
                let id = scenario.id.clone();
                self.dispatch(FormEvent::Completed(scenario)).await;
                match mode {
                    SubmitMode::Save => {
                        info!(%id, "scenario created");
                        self.events.notify_created();
                        SubmitOutcome::Saved(id)
                    }
                    SubmitMode::Preview => SubmitOutcome::Calculated,
                }
            }
            Err(err) => {
                warn!("scenario submit failed: {err}");
                self.dispatch(FormEvent::Failed(err.clone())).await;
                SubmitOutcome::Failed(err)
            }
        }
    }

    // Validates under the lock so a second submit sees `Submitting`.
    async fn begin_submit(&self) -> Result<LoanRequest, SubmitOutcome> {
        let mut state = self.state.lock().await;
        if state.is_busy() || !self.is_mounted() {
            debug!("submit ignored; request already outstanding");
            return Err(SubmitOutcome::Ignored);
        }

        *state = reduce(std::mem::take(&mut *state), FormEvent::SubmitRequested);
        match validate(&state.amount, &state.apr, &state.term) {
            Ok(request) => {
                *state = reduce(std::mem::take(&mut *state), FormEvent::RequestSent);
                Ok(request)
            }
            Err(errors) => {
                debug!(fields = errors.len(), "form validation failed");
                *state = reduce(std::mem::take(&mut *state), FormEvent::ValidationFailed(errors.clone()));
                Err(SubmitOutcome::Invalid(errors))
            }
        }
    }

    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    pub async fn error(&self, field: Field) -> Option<String> {
        self.state.lock().await.errors.get(field).map(str::to_string)
    }
}
