use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use super::types::{AskRequest, AskResponse, ErrorBody, ServiceResponse};
use super::QaService;
use crate::config::{RequestConfig, ServiceConfig};
use crate::error::{ServiceError, ServiceResult};
use crate::settings::ConfigurationSnapshot;

/// Path of the question endpoint, relative to the base URL.
pub const ASK_PATH: &str = "/ask";

/// Client for the rulebook question-answering service
#[derive(Clone)]
pub struct RulebotClient {
    client: Client,
    base_url: String,
    access_token: String,
    access_token_header: String,
    request_config: RequestConfig,
}

impl RulebotClient {
    /// Create a new client
    pub fn new(config: &ServiceConfig, request_config: RequestConfig) -> ServiceResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(request_config.timeout_ms))
            .build()
            .map_err(ServiceError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
            access_token_header: config.access_token_header.clone(),
            request_config,
        })
    }

    /// Ask one question with the given settings snapshot.
    ///
    /// Exactly one HTTP request is made; failures are returned, never retried.
    pub async fn ask(
        &self,
        snapshot: &ConfigurationSnapshot,
        question: &str,
    ) -> ServiceResult<ServiceResponse> {
        let url = format!("{}{}", self.base_url, ASK_PATH);
        let request = AskRequest::new(snapshot, question);
        let start = Instant::now();

        match self.execute_request(&url, &request).await {
            Ok(response) => {
                info!(
                    model = %request.gpt_model,
                    latency_ms = start.elapsed().as_millis(),
                    all_rules = response.retrieved_all_rules.len(),
                    top_rules = response.retrieved_top_rules.len(),
                    situations = response.retrieved_situations.len(),
                    "Question answered"
                );
                Ok(response)
            }
            Err(e) => {
                error!(
                    model = %request.gpt_model,
                    error = %e,
                    status = ?e.status(),
                    latency_ms = start.elapsed().as_millis(),
                    "Question request failed"
                );
                Err(e)
            }
        }
    }

    /// Execute a single request (internal)
    async fn execute_request(
        &self,
        url: &str,
        request: &AskRequest,
    ) -> ServiceResult<ServiceResponse> {
        debug!(
            url = %url,
            model = %request.gpt_model,
            question_len = request.question.len(),
            "Sending question"
        );

        let response = self
            .client
            .post(url)
            .header(self.access_token_header.as_str(), self.access_token.as_str())
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message());
            return Err(match detail {
                Some(detail) => ServiceError::Api {
                    status: status.as_u16(),
                    detail,
                },
                None => ServiceError::RequestFailed {
                    status: status.as_u16(),
                },
            });
        }

        let raw: AskResponse =
            serde_json::from_str(&body).map_err(|e| ServiceError::InvalidResponse {
                message: format!("Failed to parse response: {}", e),
            })?;

        if let Some(prompt) = raw.prompt.as_deref() {
            debug!(prompt_len = prompt.len(), prompt = %prompt, "Service prompt");
        }

        ServiceResponse::try_from(raw)
    }

    fn transport_error(&self, e: reqwest::Error) -> ServiceError {
        if e.is_timeout() {
            ServiceError::Timeout {
                timeout_ms: self.request_config.timeout_ms,
            }
        } else {
            ServiceError::Http(e)
        }
    }

    /// Get the base URL (for testing)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl QaService for RulebotClient {
    async fn ask(
        &self,
        snapshot: &ConfigurationSnapshot,
        question: &str,
    ) -> ServiceResult<ServiceResponse> {
        RulebotClient::ask(self, snapshot, question).await
    }
}
