//! Job-level error type and its classification.

use serde::Serialize;
use studio_core::error::CoreError;
use studio_remote::api::RemoteError;
use studio_remote::poll::PollError;

/// Broad category of a failed job, used to pick a status code and a
/// user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The request never left this process.
    Validation,
    /// Missing or unusable credentials; retrying will not help.
    Configuration,
    /// The service rejected or never received the submission.
    Submission,
    /// A status query failed, or the service reported the job as failed.
    Poll,
    /// The job was still pending when the attempt ceiling was reached.
    Timeout,
    Cancelled,
    Internal,
}

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error(transparent)]
    Invalid(CoreError),

    #[error("Job submission failed: {0}")]
    Submit(RemoteError),

    #[error(transparent)]
    Poll(PollError),

    #[error("Job submission was cancelled")]
    Cancelled,

    #[error("Failed to assemble result archive: {0}")]
    Archive(CoreError),
}

impl JobError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            JobError::Invalid(_) => ErrorKind::Validation,
            JobError::Submit(RemoteError::Credential(_)) => ErrorKind::Configuration,
            JobError::Submit(_) => ErrorKind::Submission,
            JobError::Poll(PollError::Remote {
                source: RemoteError::Credential(_),
                ..
            }) => ErrorKind::Configuration,
            JobError::Poll(PollError::Remote { .. } | PollError::JobFailed { .. }) => {
                ErrorKind::Poll
            }
            JobError::Poll(PollError::TimedOut { .. }) => ErrorKind::Timeout,
            JobError::Poll(PollError::Cancelled { .. }) | JobError::Cancelled => {
                ErrorKind::Cancelled
            }
            JobError::Poll(PollError::Session(_)) | JobError::Archive(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use studio_remote::credential::CredentialError;

    use super::*;

    #[test]
    fn credential_failures_are_configuration_errors() {
        let submit = JobError::Submit(RemoteError::Credential(CredentialError::MissingSecretKey));
        assert_eq!(submit.kind(), ErrorKind::Configuration);

        let poll = JobError::Poll(PollError::Remote {
            job_id: "t-1".into(),
            source: RemoteError::Credential(CredentialError::MissingAccessKey),
        });
        assert_eq!(poll.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn remote_failures_split_by_stage() {
        let submit = JobError::Submit(RemoteError::ApiError {
            status: 500,
            body: "boom".into(),
        });
        assert_eq!(submit.kind(), ErrorKind::Submission);

        let failed = JobError::Poll(PollError::JobFailed {
            job_id: "j".into(),
            reason: "status 3".into(),
        });
        assert_eq!(failed.kind(), ErrorKind::Poll);

        let timed_out = JobError::Poll(PollError::TimedOut {
            job_id: "j".into(),
            attempts: 600,
        });
        assert_eq!(timed_out.kind(), ErrorKind::Timeout);
    }

    #[test]
    fn validation_message_passes_through() {
        let err = JobError::Invalid(CoreError::Validation("seed must not be 0".into()));
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.to_string(), "Validation failed: seed must not be 0");
    }
}
