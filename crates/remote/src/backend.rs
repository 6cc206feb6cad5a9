//! The seam between the job flow and a concrete remote service.

use async_trait::async_trait;
use studio_core::gallery::HistoryJob;
use studio_core::status::{JobHandle, JobStatus};

use crate::api::RemoteError;

/// A remote service that accepts jobs, reports their status, and lists
/// recent jobs.
///
/// Implementations issue exactly one HTTP call per method and never retry.
#[async_trait]
pub trait JobBackend: Send + Sync {
    /// Validated request type this backend submits.
    type Request: Send + Sync;

    /// Short name used in logs and job reports.
    fn name(&self) -> &'static str;

    /// Submit a new job. Resubmitting the same request creates another
    /// remote job.
    async fn submit(&self, request: &Self::Request) -> Result<JobHandle, RemoteError>;

    /// Ask for the current status of a job.
    async fn query(&self, job_id: &JobHandle) -> Result<JobStatus, RemoteError>;

    /// Recent jobs in service order (typically newest first).
    async fn history(&self) -> Result<Vec<HistoryJob>, RemoteError>;
}
