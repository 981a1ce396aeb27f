use crate::client::{build_client, displayed, error_body, ServiceError, DEFAULT_TIMEOUT};
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use sitedit_editor::{AssetError, AssetService};
use tracing::debug;

#[derive(Deserialize)]
struct UploadReply {
    url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpAssetService {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpAssetService {
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

impl AssetService for HttpAssetService {
    async fn upload(&self, bytes: Vec<u8>, content_type: &str) -> Result<String, AssetError> {
        let size = bytes.len();
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| AssetError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AssetError::Rejected {
                status: status.as_u16(),
                message: displayed(&error_body(response).await),
            });
        }

        let reply: UploadReply = response
            .json()
            .await
            .map_err(|e| AssetError::Transport(format!("invalid response: {e}")))?;
        let url = reply
            .url
            .filter(|url| !url.trim().is_empty())
            .ok_or(AssetError::MissingUrl)?;
        debug!(size, %url, "Image uploaded");
        Ok(url)
    }
}
