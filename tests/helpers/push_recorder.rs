//! Push sink that records instead of delivering

use std::sync::Mutex;
use std::time::Duration;
use async_trait::async_trait;
use kickabout::models::notification::PushPayload;
use kickabout::services::PushSink;
use kickabout::utils::errors::{PushError, PushResult};

#[derive(Default)]
pub struct RecordingPush {
    sent: Mutex<Vec<(Vec<String>, PushPayload)>>,
    fail: bool,
}

impl RecordingPush {
    /// A sink that records the attempt and then reports the service as down
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<(Vec<String>, PushPayload)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushSink for RecordingPush {
    async fn send(&self, tokens: &[String], payload: &PushPayload) -> PushResult<()> {
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.sent.lock().unwrap().push((tokens.to_vec(), payload.clone()));

        if self.fail {
            Err(PushError::ServiceUnavailable)
        } else {
            Ok(())
        }
    }
}
