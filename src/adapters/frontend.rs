//! HTTP client for the trigger frontend's removal endpoint.
//!
//! Endpoint: POST http://{frontend}/remove_workflows
//! Body: {"trigger_id": "...", "workflows": [...]}
//! Success: HTTP 200 with {"status": "success", "message": "..."}

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use super::FrontendClient;
use crate::config::FrontendSettings;

/// Confirmation returned by a frontend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontendAck {
    pub message: Option<String>,
}

/// Why a frontend did not confirm a removal
#[derive(Debug, Error)]
pub enum FrontendError {
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("status code: {status} returned{}", message_suffix(.message))]
    Status { status: u16, message: Option<String> },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("response status: {status}{}", message_suffix(.message))]
    Rejected {
        status: String,
        message: Option<String>,
    },
}

impl FrontendError {
    /// Message the frontend sent along with the failure, if any
    pub fn frontend_message(&self) -> Option<&str> {
        match self {
            FrontendError::Status { message, .. } | FrontendError::Rejected { message, .. } => {
                message.as_deref()
            }
            _ => None,
        }
    }
}

fn message_suffix(message: &Option<String>) -> String {
    match message {
        Some(m) => format!(", message: {}", m),
        None => String::new(),
    }
}

#[derive(Debug, Serialize)]
struct RemoveWorkflowsPayload<'a> {
    trigger_id: &'a str,
    workflows: &'a [Value],
}

#[derive(Debug, Default, Deserialize)]
struct FrontendReply {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Frontend client over reqwest
pub struct HttpFrontendClient {
    client: reqwest::Client,
}

impl HttpFrontendClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Build a client that applies the configured timeouts
    pub fn from_settings(settings: &FrontendSettings) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_seconds))
            .connect_timeout(Duration::from_secs(settings.connect_timeout_seconds))
            .build()?;
        Ok(Self::new(client))
    }

    fn endpoint(frontend_ip_port: &str) -> String {
        format!("http://{}/remove_workflows", frontend_ip_port)
    }
}

#[async_trait]
impl FrontendClient for HttpFrontendClient {
    async fn remove_workflows(
        &self,
        frontend_ip_port: &str,
        trigger_id: &str,
        workflows: &[Value],
    ) -> Result<FrontendAck, FrontendError> {
        let url = Self::endpoint(frontend_ip_port);
        let payload = RemoveWorkflowsPayload {
            trigger_id,
            workflows,
        };
        debug!(%url, ?payload, "contacting frontend");

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| FrontendError::Transport {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| FrontendError::Transport {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        if status.as_u16() != 200 {
            // Keep whatever explanation the frontend gave, if it gave JSON
            let reply: FrontendReply = serde_json::from_str(&body).unwrap_or_default();
            return Err(FrontendError::Status {
                status: status.as_u16(),
                message: reply.message,
            });
        }

        let reply: FrontendReply = serde_json::from_str(&body)
            .map_err(|e| FrontendError::Malformed(format!("{}: {}", e, body)))?;

        match reply.status {
            Some(s) if s.eq_ignore_ascii_case("success") => {
                info!(%url, "frontend confirmed removal");
                Ok(FrontendAck {
                    message: reply.message,
                })
            }
            other => Err(FrontendError::Rejected {
                status: other.unwrap_or_else(|| "missing".to_string()),
                message: reply.message,
            }),
        }
    }
}
