use crate::client::{build_client, displayed, error_body, ServiceError, DEFAULT_TIMEOUT};
use serde::Serialize;
use sitedit_editor::{PersistenceError, PersistenceService, SaveRequest};
use tracing::debug;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveBody<'a> {
    page_id: &'a str,
    content: &'a str,
}

/// Saves whole pages by POSTing them to one endpoint.
#[derive(Debug, Clone)]
pub struct HttpPersistenceService {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpPersistenceService {
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

impl PersistenceService for HttpPersistenceService {
    async fn save(&self, request: &SaveRequest) -> Result<(), PersistenceError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&SaveBody {
                page_id: request.page_id.as_str(),
                content: &request.content,
            })
            .send()
            .await
            .map_err(|e| PersistenceError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PersistenceError::Rejected {
                status: status.as_u16(),
                message: displayed(&error_body(response).await),
            });
        }
        debug!(page = %request.page_id, version = request.version, "Page saved");
        Ok(())
    }
}
