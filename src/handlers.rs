use crate::errors::AppError;
use crate::form::{FormState, SubmitMode};
use crate::list::ListState;
use crate::models::ScenarioId;
use crate::state::AppState;
use crate::ui::{Tab, render_home, render_saved};
use axum::{
    Form, Json,
    extract::{Path, State},
    response::{Html, Redirect},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Deserialize)]
pub struct CalculateForm {
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub apr: String,
    #[serde(default)]
    pub term: String,
    #[serde(default)]
    pub action: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StateResponse {
    pub form: FormState,
    pub home: ListState,
    pub saved: ListState,
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let form = state.form.snapshot().await;
    let list = state.home.snapshot().await;
    Html(render_home(&form, &list))
}

pub async fn saved(State(state): State<AppState>) -> Html<String> {
    let list = state.saved.snapshot().await;
    Html(render_saved(&list, state.saved.allows_delete()))
}

pub async fn calculate(State(state): State<AppState>, Form(payload): Form<CalculateForm>) -> Redirect {
    let mode = match payload.action.as_deref() {
        Some("preview") => SubmitMode::Preview,
        _ => SubmitMode::Save,
    };

    state.form.set_inputs(&payload.amount, &payload.apr, &payload.term).await;
    let outcome = state.form.submit(mode).await;
    debug!(?outcome, "form submitted");
    Redirect::to(Tab::Home.path())
}

pub async fn view_scenario(
    State(state): State<AppState>,
    Path((tab, id)): Path<(Tab, String)>,
) -> Redirect {
    state.list(tab).view(&ScenarioId::from(id.as_str())).await;
    Redirect::to(tab.path())
}

pub async fn close_modal(State(state): State<AppState>, Path(tab): Path<Tab>) -> Redirect {
    state.list(tab).close_modal().await;
    Redirect::to(tab.path())
}

pub async fn request_delete(
    State(state): State<AppState>,
    Path((tab, id)): Path<(Tab, String)>,
) -> Result<Redirect, AppError> {
    let list = state.list(tab);
    if !list.allows_delete() {
        return Err(AppError::bad_request(format!(
            "scenarios cannot be deleted from the {} tab",
            tab.slug()
        )));
    }

    list.request_delete(ScenarioId::from(id.as_str())).await;
    Ok(Redirect::to(tab.path()))
}

pub async fn confirm_delete(State(state): State<AppState>, Path(tab): Path<Tab>) -> Redirect {
    state.list(tab).confirm_delete().await;
    Redirect::to(tab.path())
}

pub async fn cancel_delete(State(state): State<AppState>, Path(tab): Path<Tab>) -> Redirect {
    state.list(tab).cancel_delete().await;
    Redirect::to(tab.path())
}

pub async fn get_state(State(state): State<AppState>) -> Json<StateResponse> {
    Json(StateResponse {
        form: state.form.snapshot().await,
        home: state.home.snapshot().await,
        saved: state.saved.snapshot().await,
    })
}
