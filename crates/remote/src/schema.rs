//! Typed response schemas for every remote endpoint.
//!
//! Each service wraps its payload as `{"data": ...}`. Bodies are decoded
//! strictly into the structs below; a missing or mistyped required field
//! becomes [`RemoteError::Schema`] instead of a panic further down.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use studio_core::gallery::HistoryJob;
use studio_core::status::JobStatus;

use crate::api::RemoteError;

/// The `{ "data": T }` envelope shared by both services.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// Decode an envelope body and return its `data` member.
pub fn parse_envelope<T: DeserializeOwned>(
    endpoint: &'static str,
    body: &[u8],
) -> Result<T, RemoteError> {
    serde_json::from_slice::<Envelope<T>>(body)
        .map(|envelope| envelope.data)
        .map_err(|e| RemoteError::schema(endpoint, e.to_string()))
}

// ---------------------------------------------------------------------------
// Text-to-image job service
// ---------------------------------------------------------------------------

/// `status` value reported once a text-to-image job has finished.
pub const SDJOB_STATUS_SUCCEEDED: i64 = 2;
/// `status` value reported when a text-to-image job has errored out.
pub const SDJOB_STATUS_FAILED: i64 = 3;

/// `data` of `POST /api/v1/sdjob/text2img`.
#[derive(Debug, Clone, Deserialize)]
pub struct SdSubmitData {
    #[serde(rename = "jobUuid")]
    pub job_uuid: String,
}

/// `data` of `GET /api/v1/sdjob/result`.
#[derive(Debug, Clone, Deserialize)]
pub struct SdResultData {
    pub status: i64,
    #[serde(default)]
    pub output: Option<SdOutput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SdOutput {
    #[serde(default)]
    pub images: Vec<SdImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SdImage {
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

impl SdResultData {
    /// Map the numeric service status onto [`JobStatus`]. Codes other than
    /// success and failure mean the job is still queued or running.
    pub fn into_status(self) -> JobStatus {
        match self.status {
            SDJOB_STATUS_SUCCEEDED => JobStatus::Succeeded {
                image_urls: self
                    .output
                    .unwrap_or_default()
                    .images
                    .into_iter()
                    .map(|image| image.image_url)
                    .collect(),
            },
            SDJOB_STATUS_FAILED => JobStatus::Failed {
                reason: format!("service reported status {}", self.status),
            },
            _ => JobStatus::Pending,
        }
    }
}

/// One entry of `GET /api/v1/sdjob/list`.
#[derive(Debug, Clone, Deserialize)]
pub struct SdHistoryEntry {
    #[serde(default)]
    pub input: Option<SdHistoryInput>,
    #[serde(default)]
    pub output: Option<SdOutput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SdHistoryInput {
    #[serde(default)]
    pub txt2img: Option<SdTxt2ImgInput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SdTxt2ImgInput {
    #[serde(default)]
    pub prompt: String,
}

impl From<SdHistoryEntry> for HistoryJob {
    fn from(entry: SdHistoryEntry) -> Self {
        let label = entry
            .input
            .and_then(|input| input.txt2img)
            .map(|txt2img| txt2img.prompt)
            .unwrap_or_default();
        HistoryJob {
            label,
            image_urls: entry
                .output
                .unwrap_or_default()
                .images
                .into_iter()
                .map(|image| image.image_url)
                .collect(),
        }
    }
}

/// `data` of `GET /api/v1/model/version/list?type=CHECKPOINT`.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckpointList {
    #[serde(default)]
    pub item: Vec<CheckpointItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckpointItem {
    pub name: String,
    pub model_version_uuid: String,
}

/// `data` of `GET /api/v1/sampler/list`.
#[derive(Debug, Clone, Deserialize)]
pub struct SamplerList {
    #[serde(default)]
    pub item: Vec<String>,
}

// ---------------------------------------------------------------------------
// Try-on service
// ---------------------------------------------------------------------------

/// `task_status` reported once a try-on task has finished.
pub const TRYON_STATUS_SUCCEEDED: &str = "succeed";
/// `task_status` reported when a try-on task has failed.
pub const TRYON_STATUS_FAILED: &str = "failed";

/// `data` of `POST /v1/images/kolors-virtual-try-on`.
#[derive(Debug, Clone, Deserialize)]
pub struct TryOnSubmitData {
    pub task_id: String,
}

/// `data` of `GET /v1/images/kolors-virtual-try-on/{task_id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct TryOnTaskData {
    pub task_status: String,
    #[serde(default)]
    pub task_status_msg: Option<String>,
    #[serde(default)]
    pub task_result: Option<TryOnTaskResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TryOnTaskResult {
    #[serde(default)]
    pub images: Vec<TryOnImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TryOnImage {
    pub url: String,
}

impl TryOnTaskResult {
    fn into_urls(self) -> Vec<String> {
        self.images.into_iter().map(|image| image.url).collect()
    }
}

impl TryOnTaskData {
    /// Map the textual task status onto [`JobStatus`]. `submitted`,
    /// `processing`, and anything unrecognised count as pending.
    pub fn into_status(self) -> JobStatus {
        match self.task_status.as_str() {
            TRYON_STATUS_SUCCEEDED => JobStatus::Succeeded {
                image_urls: self.task_result.unwrap_or_default().into_urls(),
            },
            TRYON_STATUS_FAILED => JobStatus::Failed {
                reason: self
                    .task_status_msg
                    .filter(|msg| !msg.is_empty())
                    .unwrap_or_else(|| "task failed".to_string()),
            },
            _ => JobStatus::Pending,
        }
    }
}

/// One entry of `GET /v1/images/kolors-virtual-try-on`.
#[derive(Debug, Clone, Deserialize)]
pub struct TryOnHistoryEntry {
    #[serde(default)]
    pub task_result: Option<TryOnTaskResult>,
}

impl From<TryOnHistoryEntry> for HistoryJob {
    fn from(entry: TryOnHistoryEntry) -> Self {
        HistoryJob {
            label: String::new(),
            image_urls: entry.task_result.unwrap_or_default().into_urls(),
        }
    }
}
