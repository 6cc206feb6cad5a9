//! The submit → poll → collect flow for a single job.

use studio_core::archive::ResultArchive;
use studio_core::job::Validate;
use studio_core::session::JobSession;
use studio_remote::backend::JobBackend;
use studio_remote::collector::{collect_results, AssetFailure, AssetFetcher};
use studio_remote::poll::{poll_job, PollConfig};
use tokio_util::sync::CancellationToken;

use crate::error::JobError;

/// Everything a finished job produced.
#[derive(Debug)]
pub struct JobReport {
    /// Final session state: job id, query count, result URLs in service order.
    pub session: JobSession,
    pub archive: ResultArchive,
    pub failures: Vec<AssetFailure>,
}

impl JobReport {
    pub fn image_urls(&self) -> &[String] {
        self.session.image_urls()
    }
}

/// Run one job from user input to a packaged archive.
///
/// `request` is validated before anything is sent; a rejected request makes
/// no network call at all. Cancelling `cancel` abandons the job locally at
/// the next await point.
pub async fn run_job<B, F>(
    backend: &B,
    fetcher: &F,
    request: &B::Request,
    poll_config: &PollConfig,
    cancel: &CancellationToken,
) -> Result<JobReport, JobError>
where
    B: JobBackend + ?Sized,
    B::Request: Validate,
    F: AssetFetcher + ?Sized,
{
    request.validate().map_err(JobError::Invalid)?;

    let job_id = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(JobError::Cancelled),
        result = backend.submit(request) => result.map_err(|e| {
            tracing::warn!(backend = backend.name(), error = %e, "Job submission failed");
            JobError::Submit(e)
        })?,
    };

    let mut session = JobSession::new(backend.name(), job_id);
    tracing::debug!(
        backend = backend.name(),
        job_id = %session.job_id(),
        state = %session.state(),
        "Job session started",
    );

    let urls = poll_job(backend, &mut session, poll_config, cancel)
        .await
        .map_err(JobError::Poll)?;

    let collected = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(JobError::Cancelled),
        result = collect_results(fetcher, &urls) => result.map_err(JobError::Archive)?,
    };

    tracing::info!(
        backend = backend.name(),
        job_id = %session.job_id(),
        queries = session.queries(),
        images = urls.len(),
        archived = collected.archive.len(),
        "Job completed",
    );

    Ok(JobReport {
        session,
        archive: collected.archive,
        failures: collected.failures,
    })
}
