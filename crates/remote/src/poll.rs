//! Fixed-interval status polling for one submitted job.
//!
//! [`poll_job`] drives a [`JobSession`] from `Submitted` to a terminal
//! state: it queries the backend, sleeps for a fixed interval while the job
//! is pending, and stops on the first success, failure, transport error,
//! attempt ceiling, or cancellation. Nothing is retried.
//!
//! Cancelling only abandons the loop on this side; the remote job keeps
//! running.

use std::time::Duration;

use studio_core::error::CoreError;
use studio_core::session::JobSession;
use studio_core::status::JobStatus;
use tokio_util::sync::CancellationToken;

use crate::api::RemoteError;
use crate::backend::JobBackend;

/// Default number of status queries before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 600;

/// Tunable parameters for the poll loop.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay between two consecutive status queries.
    pub interval: Duration,
    /// Upper bound on status queries; reaching it fails the job.
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl PollConfig {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }
}

/// Why a poll loop ended without results.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    /// A status query raised a transport, HTTP, or schema error.
    #[error("Status query for job {job_id} failed: {source}")]
    Remote {
        job_id: String,
        #[source]
        source: RemoteError,
    },

    /// The service reported the job as failed.
    #[error("Job {job_id} failed: {reason}")]
    JobFailed { job_id: String, reason: String },

    /// The attempt ceiling was reached while the job was still pending.
    #[error("Job {job_id} still pending after {attempts} status queries")]
    TimedOut { job_id: String, attempts: u32 },

    /// The caller abandoned the loop.
    #[error("Polling for job {job_id} was cancelled")]
    Cancelled { job_id: String },

    /// The session rejected a state transition.
    #[error(transparent)]
    Session(#[from] CoreError),
}

/// Poll `session`'s job until it reaches a terminal state.
///
/// Returns the result URLs exactly as the service listed them. On every
/// error except [`PollError::Cancelled`] the session is left in
/// `Failed` with the reason recorded.
pub async fn poll_job<B>(
    backend: &B,
    session: &mut JobSession,
    config: &PollConfig,
    cancel: &CancellationToken,
) -> Result<Vec<String>, PollError>
where
    B: JobBackend + ?Sized,
{
    let job_id = session.job_id().clone();
    let max_attempts = config.max_attempts.max(1);

    loop {
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!(job_id = %job_id, queries = session.queries(), "Polling cancelled");
                return Err(PollError::Cancelled { job_id: job_id.to_string() });
            }
            result = backend.query(&job_id) => result,
        };

        session.record_query()?;
        let attempt = session.queries();

        match result {
            Err(source) => {
                tracing::warn!(
                    job_id = %job_id,
                    attempt,
                    backend = backend.name(),
                    error = %source,
                    "Status query failed",
                );
                session.fail(source.to_string())?;
                return Err(PollError::Remote {
                    job_id: job_id.to_string(),
                    source,
                });
            }
            Ok(JobStatus::Succeeded { image_urls }) => {
                tracing::info!(
                    job_id = %job_id,
                    attempt,
                    images = image_urls.len(),
                    "Job succeeded",
                );
                session.succeed(image_urls.clone())?;
                return Ok(image_urls);
            }
            Ok(JobStatus::Failed { reason }) => {
                tracing::warn!(job_id = %job_id, attempt, reason = %reason, "Job failed");
                session.fail(reason.clone())?;
                return Err(PollError::JobFailed {
                    job_id: job_id.to_string(),
                    reason,
                });
            }
            Ok(JobStatus::Pending) => {
                tracing::debug!(job_id = %job_id, attempt, "Job pending");
            }
        }

        if attempt >= max_attempts {
            tracing::warn!(job_id = %job_id, attempt, "Giving up on pending job");
            session.fail(format!("still pending after {attempt} status queries"))?;
            return Err(PollError::TimedOut {
                job_id: job_id.to_string(),
                attempts: attempt,
            });
        }

        // Wait before the next query, respecting cancellation.
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(job_id = %job_id, queries = attempt, "Polling cancelled");
                return Err(PollError::Cancelled { job_id: job_id.to_string() });
            }
            _ = tokio::time::sleep(config.interval) => {}
        }
    }
}
