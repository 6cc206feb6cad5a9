//! Job handles, remote status, and the client-side job state machine.

use std::fmt;

use serde::Serialize;

use crate::error::CoreError;

/// Opaque identifier issued by a remote service for one submitted job.
///
/// Immutable once issued; a handle is only meaningful to the backend that
/// produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct JobHandle(String);

impl JobHandle {
    /// Wrap a service-issued id. Empty or whitespace-only ids are rejected.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(CoreError::Validation("job id must not be empty".to_string()));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Status of a remote job, normalized from each service's own codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    /// Queued or running; ask again later.
    Pending,
    /// Finished; carries the result asset URLs in service order.
    Succeeded { image_urls: Vec<String> },
    /// Finished without results; carries the raw status for diagnostics.
    Failed { reason: String },
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Pending)
    }
}

/// Client-side lifecycle of one job.
///
/// ```text
/// Submitted -> Pending -> Succeeded
///                 |  ^
///                 +--+ (self-transition while the service reports pending)
///                 |
///                 +-> Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Submitted,
    Pending,
    Succeeded,
    Failed,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Succeeded | JobState::Failed)
    }

    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(self, next: JobState) -> bool {
        matches!(
            (self, next),
            (JobState::Submitted, JobState::Pending)
                | (JobState::Pending, JobState::Pending)
                | (JobState::Pending, JobState::Succeeded)
                | (JobState::Pending, JobState::Failed)
        )
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobState::Submitted => "submitted",
            JobState::Pending => "pending",
            JobState::Succeeded => "succeeded",
            JobState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// One downloaded result. Identity is the source URL.
#[derive(Clone, PartialEq, Eq)]
pub struct ResultAsset {
    pub url: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for ResultAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultAsset")
            .field("url", &self.url)
            .field("len", &self.bytes.len())
            .finish()
    }
}
