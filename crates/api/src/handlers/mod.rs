pub mod text2img;
pub mod tryon;

use base64::Engine as _;
use serde::Serialize;
use studio_core::archive::{ARCHIVE_CONTENT_TYPE, ARCHIVE_FILE_NAME};
use studio_core::session::JobSession;
use studio_pipeline::JobReport;
use studio_remote::collector::AssetFailure;

/// The downloadable zip, inlined as base64.
#[derive(Debug, Serialize)]
pub struct ArchivePayload {
    pub file_name: &'static str,
    pub content_type: &'static str,
    /// Entry names in archive order.
    pub entries: Vec<String>,
    pub data_base64: String,
}

/// Response body of both job endpoints.
#[derive(Debug, Serialize)]
pub struct JobReportResponse {
    pub job: JobSession,
    /// Result URLs that could not be downloaded, with their 1-based position.
    pub failures: Vec<AssetFailure>,
    pub archive: ArchivePayload,
}

impl From<JobReport> for JobReportResponse {
    fn from(report: JobReport) -> Self {
        let entries = report
            .archive
            .entries()
            .iter()
            .map(|entry| entry.name.clone())
            .collect();
        let data_base64 =
            base64::engine::general_purpose::STANDARD.encode(report.archive.bytes());

        Self {
            job: report.session,
            failures: report.failures,
            archive: ArchivePayload {
                file_name: ARCHIVE_FILE_NAME,
                content_type: ARCHIVE_CONTENT_TYPE,
                entries,
                data_base64,
            },
        }
    }
}
