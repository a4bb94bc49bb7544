//! Client for the remote loan service.
//!
//! Controllers only talk to [`LoanApi`]; [`HttpLoanService`] is the production
//! implementation speaking the service's JSON API.

use crate::config::Config;
use crate::errors::ServiceError;
use crate::models::{LoanRequest, LoanScenario, ScenarioId};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use tracing::{debug, warn};

const CREATE_FAILED: &str = "Failed to calculate loan payment";
const LIST_FAILED: &str = "Failed to fetch loans";
const DETAIL_FAILED: &str = "Failed to fetch loan details";
const DELETE_FAILED: &str = "Failed to delete loan";

pub trait LoanApi: Send + Sync + 'static {
    /// Computes and saves a scenario.
    fn create(
        &self,
        request: &LoanRequest,
    ) -> impl Future<Output = Result<LoanScenario, ServiceError>> + Send;

    /// Computes a scenario without saving it.
    fn calculate(
        &self,
        request: &LoanRequest,
    ) -> impl Future<Output = Result<LoanScenario, ServiceError>> + Send;

    /// Saved scenarios in service order; schedules may be omitted.
    fn list(&self) -> impl Future<Output = Result<Vec<LoanScenario>, ServiceError>> + Send;

    fn get_by_id(
        &self,
        id: &ScenarioId,
    ) -> impl Future<Output = Result<LoanScenario, ServiceError>> + Send;

    fn remove(&self, id: &ScenarioId) -> impl Future<Output = Result<(), ServiceError>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpLoanService {
    client: Client,
    base_url: String,
}

impl HttpLoanService {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_base_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn post_scenario(
        &self,
        path: &str,
        request: &LoanRequest,
    ) -> Result<LoanScenario, ServiceError> {
        let url = self.url(path);
        debug!(%url, "POST");
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(transport)?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = failure_detail(response).await.unwrap_or_else(|| CREATE_FAILED.to_string());
            warn!(%url, status, %message, "loan service rejected scenario");
            return Err(ServiceError::Rejected { status, message });
        }
        decode_scenario(response).await
    }
}

impl LoanApi for HttpLoanService {
    async fn create(&self, request: &LoanRequest) -> Result<LoanScenario, ServiceError> {
        self.post_scenario("/loans", request).await
    }

    async fn calculate(&self, request: &LoanRequest) -> Result<LoanScenario, ServiceError> {
        self.post_scenario("/loans/calculate", request).await
    }

    async fn list(&self) -> Result<Vec<LoanScenario>, ServiceError> {
        let url = self.url("/loans");
        debug!(%url, "GET");
        let response = self.client.get(&url).send().await.map_err(transport)?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = failure_detail(response).await.unwrap_or_else(|| LIST_FAILED.to_string());
            warn!(%url, status, %message, "listing scenarios failed");
            return Err(ServiceError::Rejected { status, message });
        }
        let loans: Vec<LoanScenario> = decode(response).await?;
        for loan in &loans {
            check_preview(loan)?;
        }
        Ok(loans)
    }

    async fn get_by_id(&self, id: &ScenarioId) -> Result<LoanScenario, ServiceError> {
        let url = self.url(&format!("/loans/{}", id.path_segment()));
        debug!(%url, "GET");
        let response = self.client.get(&url).send().await.map_err(transport)?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = failure_detail(response).await.unwrap_or_else(|| DETAIL_FAILED.to_string());
            warn!(%url, status, %message, "scenario lookup failed");
            return Err(ServiceError::NotFound { status, message });
        }
        decode_scenario(response).await
    }

    async fn remove(&self, id: &ScenarioId) -> Result<(), ServiceError> {
        let url = self.url(&format!("/loans/{}", id.path_segment()));
        debug!(%url, "DELETE");
        let response = self.client.delete(&url).send().await.map_err(transport)?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = failure_detail(response).await.unwrap_or_else(|| DELETE_FAILED.to_string());
            warn!(%url, status, %message, "scenario delete failed");
            return Err(ServiceError::Rejected { status, message });
        }
        Ok(())
    }
}

fn transport(err: reqwest::Error) -> ServiceError {
    warn!("loan service request failed: {err}");
    ServiceError::Transport(err.to_string())
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ServiceError> {
    response.json::<T>().await.map_err(|err| {
        warn!("failed to decode loan service response: {err}");
        ServiceError::Malformed(err.to_string())
    })
}

async fn decode_scenario(response: Response) -> Result<LoanScenario, ServiceError> {
    let scenario: LoanScenario = decode(response).await?;
    check_preview(&scenario)?;
    Ok(scenario)
}

fn check_preview(scenario: &LoanScenario) -> Result<(), ServiceError> {
    match scenario.preview_gap() {
        None => Ok(()),
        Some(month) => {
            warn!(id = %scenario.id, month, "schedule preview out of sequence");
            Err(ServiceError::Malformed(format!(
                "schedule for scenario {} is out of sequence at month {month}",
                scenario.id
            )))
        }
    }
}

/// Best-effort message from an error body. The service answers failures
/// with `{"detail": "..."}`, or a list of `{"msg": "..."}` objects when the
/// request body itself was rejected.
async fn failure_detail(response: Response) -> Option<String> {
    let body: Value = response.json().await.ok()?;
    detail_message(&body)
}

fn detail_message(body: &Value) -> Option<String> {
    match body.get("detail")? {
        Value::String(detail) if !detail.trim().is_empty() => Some(detail.clone()),
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}
