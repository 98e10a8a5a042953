//! Status polling for freshly created content.
//!
//! Each created item gets its own loop: check the status, stop as soon as it
//! is anything but `processing`, otherwise sleep and retry up to the attempt
//! budget. Failed checks count as attempts and are retried on the same
//! schedule. Every wait and every request is raced against a cancellation
//! token owned by the intake session.

use kbase_api_client::ContentApi;
use kbase_core::models::ContentStatus;
use kbase_core::ClientConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

const POLL_INTERVAL: Duration = Duration::from_secs(5);
const POLL_MAX_ATTEMPTS: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: POLL_INTERVAL,
            max_attempts: POLL_MAX_ATTEMPTS,
        }
    }
}

impl PollPolicy {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            interval: config.poll_interval(),
            max_attempts: config.poll_max_attempts,
        }
    }
}

/// How one item's polling loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The server reported a non-transitional status.
    Settled(ContentStatus),
    /// Still processing (or unreachable) after every attempt.
    Exhausted { attempts: u32 },
    /// The owning session was closed while polling.
    Cancelled,
}

impl PollOutcome {
    pub fn status(&self) -> Option<&ContentStatus> {
        match self {
            PollOutcome::Settled(status) => Some(status),
            _ => None,
        }
    }
}

pub async fn poll_until_settled(
    api: &dyn ContentApi,
    db_id: &str,
    content_id: &str,
    policy: PollPolicy,
    cancel: &CancellationToken,
) -> PollOutcome {
    for attempt in 1..=policy.max_attempts {
        let check = tokio::select! {
            _ = cancel.cancelled() => return PollOutcome::Cancelled,
            result = api.content_status(db_id, content_id) => result,
        };

        match check {
            Ok(response) if !response.status.is_transitional() => {
                tracing::info!(
                    db_id = %db_id,
                    content_id = %content_id,
                    attempt,
                    status = %response.status,
                    "Content processing settled"
                );
                return PollOutcome::Settled(response.status);
            }
            Ok(_) => {
                tracing::debug!(content_id = %content_id, attempt, "Content still processing");
            }
            Err(e) => {
                tracing::debug!(
                    content_id = %content_id,
                    attempt,
                    error = %e,
                    "Status check failed, will retry"
                );
            }
        }

        if attempt < policy.max_attempts {
            tokio::select! {
                _ = cancel.cancelled() => return PollOutcome::Cancelled,
                _ = sleep(policy.interval) => {}
            }
        }
    }

    tracing::warn!(
        db_id = %db_id,
        content_id = %content_id,
        attempts = policy.max_attempts,
        "Gave up waiting for content processing"
    );
    PollOutcome::Exhausted {
        attempts: policy.max_attempts,
    }
}

/// Run [`poll_until_settled`] as its own task.
pub fn spawn_poll(
    api: Arc<dyn ContentApi>,
    db_id: String,
    content_id: String,
    policy: PollPolicy,
    cancel: CancellationToken,
) -> JoinHandle<PollOutcome> {
    tokio::spawn(async move {
        poll_until_settled(api.as_ref(), &db_id, &content_id, policy, &cancel).await
    })
}
