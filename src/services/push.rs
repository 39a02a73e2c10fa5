//! Push delivery
//!
//! `PushSink` is the seam between the notification fan-out and the transport.
//! `FcmClient` speaks the FCM legacy HTTP protocol; `DisabledPush` is used when
//! push is switched off in configuration.

use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::config::PushConfig;
use crate::models::notification::PushPayload;
use crate::utils::errors::{KickaboutError, PushError, PushResult, Result};

#[async_trait]
pub trait PushSink: Send + Sync {
    /// Deliver one payload to every token. An empty token list is a no-op.
    async fn send(&self, tokens: &[String], payload: &PushPayload) -> PushResult<()>;
}

/// Multicast request body
#[derive(Debug, Serialize)]
struct FcmRequest<'a> {
    registration_ids: &'a [String],
    notification: FcmNotification<'a>,
    data: &'a std::collections::HashMap<String, String>,
}

#[derive(Debug, Serialize)]
struct FcmNotification<'a> {
    title: &'a str,
    body: &'a str,
}

/// Multicast response summary
#[derive(Debug, Clone, Deserialize)]
pub struct FcmResponse {
    pub success: u32,
    pub failure: u32,
}

#[derive(Clone, Debug)]
pub struct FcmClient {
    client: Client,
    endpoint: String,
    server_key: String,
}

impl FcmClient {
    pub fn new(config: &PushConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("Kickabout/1.0")
            .build()
            .map_err(KickaboutError::Http)?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            server_key: config.server_key.clone(),
        })
    }
}

#[async_trait]
impl PushSink for FcmClient {
    async fn send(&self, tokens: &[String], payload: &PushPayload) -> PushResult<()> {
        if tokens.is_empty() {
            return Ok(());
        }

        let body = FcmRequest {
            registration_ids: tokens,
            notification: FcmNotification {
                title: &payload.title,
                body: &payload.body,
            },
            data: &payload.data,
        };

        let response = self.client
            .post(&self.endpoint)
            .header(reqwest::header::AUTHORIZATION, format!("key={}", self.server_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PushError::Timeout
                } else if e.is_connect() {
                    PushError::ServiceUnavailable
                } else {
                    PushError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_server_error() {
            return Err(PushError::ServiceUnavailable);
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PushError::RequestFailed(format!("HTTP {}: {}", status, error_text)));
        }

        let summary: FcmResponse = response
            .json()
            .await
            .map_err(|e| PushError::InvalidResponse(e.to_string()))?;

        debug!(success = summary.success, failure = summary.failure, "FCM multicast accepted");

        if summary.success == 0 && summary.failure > 0 {
            return Err(PushError::RequestFailed(format!(
                "all {} registrations rejected", summary.failure
            )));
        }

        Ok(())
    }
}

/// Sink used when push delivery is disabled
#[derive(Clone, Debug, Default)]
pub struct DisabledPush;

#[async_trait]
impl PushSink for DisabledPush {
    async fn send(&self, tokens: &[String], payload: &PushPayload) -> PushResult<()> {
        debug!(token_count = tokens.len(), title = %payload.title, "Push disabled, dropping notification");
        Ok(())
    }
}
