use crate::client::{build_client, displayed, error_body, ServiceError, DEFAULT_TIMEOUT};
use serde::{Deserialize, Serialize};
use sitedit_editor::{ModelTier, RewriteError, RewriteRequest, RewriteResponse, RewriteService};
use tracing::{debug, warn};

/// Wire body sent to the rewrite endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RewriteBody<'a> {
    full_html: &'a str,
    element_code: &'a str,
    user_request: &'a str,
    model: ModelTier,
    creativity: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReplyBody {
    updated_code: Option<String>,
    error: Option<String>,
    details: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpRewriteService {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpRewriteService {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ServiceError> {
        Ok(Self::with_client(build_client(DEFAULT_TIMEOUT)?, endpoint))
    }

    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl RewriteService for HttpRewriteService {
    async fn rewrite(&self, request: &RewriteRequest) -> Result<RewriteResponse, RewriteError> {
        let body = RewriteBody {
            full_html: &request.full_document_markup,
            element_code: &request.target_element_markup,
            user_request: &request.instruction,
            model: request.model_tier,
            creativity: request.creativity,
        };
        debug!(endpoint = %self.endpoint, model = ?request.model_tier, "Sending rewrite request");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| RewriteError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = error_body(response).await;
            warn!(%status, "Rewrite service returned an error");
            // Error bodies are usually `{ error, details }` too
            return Err(match serde_json::from_str::<ReplyBody>(&text) {
                Ok(ReplyBody {
                    error: Some(message),
                    details,
                    ..
                }) => RewriteError::Service { message, details },
                _ => RewriteError::Service {
                    message: format!("status {status}"),
                    details: (!text.is_empty()).then(|| displayed(&text)),
                },
            });
        }

        let reply: ReplyBody = response
            .json()
            .await
            .map_err(|e| RewriteError::Transport(format!("invalid response: {e}")))?;

        if let Some(message) = reply.error {
            return Err(RewriteError::Service {
                message,
                details: reply.details,
            });
        }
        Ok(RewriteResponse {
            updated_element_markup: reply.updated_code,
        })
    }
}
