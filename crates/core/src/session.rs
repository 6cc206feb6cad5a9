//! Per-invocation job state.
//!
//! A [`JobSession`] is created when the remote service issues a handle,
//! handed to the poll loop by `&mut`, and read back by the caller once the
//! loop returns. Nothing about a job is kept anywhere else.

use serde::Serialize;

use crate::error::CoreError;
use crate::status::{JobHandle, JobState};

#[derive(Debug, Clone, Serialize)]
pub struct JobSession {
    job_id: JobHandle,
    backend: &'static str,
    state: JobState,
    /// Number of status queries issued so far.
    queries: u32,
    image_urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<String>,
}

impl JobSession {
    /// Start a session in [`JobState::Submitted`].
    pub fn new(backend: &'static str, job_id: JobHandle) -> Self {
        Self {
            job_id,
            backend,
            state: JobState::Submitted,
            queries: 0,
            image_urls: Vec::new(),
            failure: None,
        }
    }

    pub fn job_id(&self) -> &JobHandle {
        &self.job_id
    }

    pub fn backend(&self) -> &'static str {
        self.backend
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn queries(&self) -> u32 {
        self.queries
    }

    /// Result URLs, populated once the job has succeeded.
    pub fn image_urls(&self) -> &[String] {
        &self.image_urls
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Count one status query. The first query moves `Submitted -> Pending`;
    /// later ones are the `Pending` self-transition.
    pub fn record_query(&mut self) -> Result<(), CoreError> {
        self.transition(JobState::Pending)?;
        self.queries += 1;
        Ok(())
    }

    pub fn succeed(&mut self, image_urls: Vec<String>) -> Result<(), CoreError> {
        self.transition(JobState::Succeeded)?;
        self.image_urls = image_urls;
        Ok(())
    }

    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), CoreError> {
        self.transition(JobState::Failed)?;
        self.failure = Some(reason.into());
        Ok(())
    }

    fn transition(&mut self, next: JobState) -> Result<(), CoreError> {
        if !self.state.can_transition_to(next) {
            return Err(CoreError::Internal(format!(
                "illegal job transition {} -> {next} for job {}",
                self.state, self.job_id
            )));
        }
        self.state = next;
        Ok(())
    }
}
