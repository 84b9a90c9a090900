use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{PowerAction, PowerController, ServerStatus};
use crate::errors::RemoteApiError;

/// REST client for the cloud hosting API (`/server/{id}` resources)
pub struct CloudApiClient {
    client: Client,
    api_base: String,
    server_id: String,
    api_token: String,
}

impl CloudApiClient {
    pub fn new(api_base: &str, server_id: &str, api_token: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client for the cloud API")?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            server_id: server_id.to_string(),
            api_token: api_token.to_string(),
        })
    }

    fn server_url(&self) -> String {
        format!("{}/server/{}", self.api_base, self.server_id)
    }

    /// Map a non-success response to `Rejected`, keeping the upstream `Message`
    async fn reject(operation: &str, response: Response) -> RemoteApiError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| {
                v.get("Message")
                    .or_else(|| v.get("message"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    format!("HTTP {}", status)
                } else {
                    body.trim().to_string()
                }
            });

        RemoteApiError::Rejected {
            operation: operation.to_string(),
            status,
            message,
        }
    }
}

#[async_trait]
impl PowerController for CloudApiClient {
    async fn status(&self) -> Result<ServerStatus, RemoteApiError> {
        let operation = "status";
        debug!("Polling server {} status", self.server_id);

        let response = self
            .client
            .get(self.server_url())
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| RemoteApiError::RequestFailed {
                operation: operation.to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            let error = Self::reject(operation, response).await;
            warn!("Server status request rejected: {}", error);
            return Err(error);
        }

        response
            .json::<ServerStatus>()
            .await
            .map_err(|e| RemoteApiError::InvalidResponse {
                operation: operation.to_string(),
                reason: e.to_string(),
            })
    }

    async fn request(&self, action: PowerAction) -> Result<(), RemoteApiError> {
        let operation = action.api_type();
        info!("Sending {} to server {}", operation, self.server_id);

        let response = self
            .client
            .post(format!("{}/action", self.server_url()))
            .bearer_auth(&self.api_token)
            .json(&json!({ "Type": operation }))
            .send()
            .await
            .map_err(|e| RemoteApiError::RequestFailed {
                operation: operation.to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            let error = Self::reject(operation, response).await;
            warn!("Power action rejected: {}", error);
            return Err(error);
        }

        info!("✓ {} accepted for server {}", operation, self.server_id);
        Ok(())
    }
}
