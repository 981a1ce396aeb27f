use crate::{HttpAssetService, HttpPersistenceService, HttpRewriteService};
use sitedit_editor::ServiceConfig;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("No {0} endpoint configured")]
    MissingEndpoint(&'static str),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client, ServiceError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// Longest failure body shown in a notification.
const MAX_DISPLAYED_BODY: usize = 200;

/// Whole body of a failed response.
pub(crate) async fn error_body(response: reqwest::Response) -> String {
    let text = response.text().await.unwrap_or_default();
    text.trim().to_string()
}

/// A failure body cut down for a notification.
pub(crate) fn displayed(text: &str) -> String {
    if text.chars().count() > MAX_DISPLAYED_BODY {
        format!("{}…", text.chars().take(MAX_DISPLAYED_BODY).collect::<String>())
    } else {
        text.to_string()
    }
}

/// Every collaborator that has an endpoint configured.
#[derive(Debug, Clone, Default)]
pub struct Services {
    pub rewrite: Option<HttpRewriteService>,
    pub persistence: Option<HttpPersistenceService>,
    pub assets: Option<HttpAssetService>,
}

impl Services {
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ServiceError> {
        let client = build_client(DEFAULT_TIMEOUT)?;
        Ok(Self {
            rewrite: config
                .rewrite_url
                .as_ref()
                .map(|url| HttpRewriteService::with_client(client.clone(), url)),
            persistence: config
                .save_url
                .as_ref()
                .map(|url| HttpPersistenceService::with_client(client.clone(), url)),
            assets: config
                .asset_url
                .as_ref()
                .map(|url| HttpAssetService::with_client(client.clone(), url)),
        })
    }

    pub fn rewrite(&self) -> Result<&HttpRewriteService, ServiceError> {
        self.rewrite
            .as_ref()
            .ok_or(ServiceError::MissingEndpoint("rewrite"))
    }

    pub fn persistence(&self) -> Result<&HttpPersistenceService, ServiceError> {
        self.persistence
            .as_ref()
            .ok_or(ServiceError::MissingEndpoint("save"))
    }

    pub fn assets(&self) -> Result<&HttpAssetService, ServiceError> {
        self.assets
            .as_ref()
            .ok_or(ServiceError::MissingEndpoint("asset"))
    }
}
