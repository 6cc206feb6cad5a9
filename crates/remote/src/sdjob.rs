//! Client for the text-to-image job service.
//!
//! Endpoints (relative to the configured base URL):
//!
//! ```text
//! POST /api/v1/sdjob/text2img                    submit
//! GET  /api/v1/sdjob/result?jobUuid={id}         status + results
//! GET  /api/v1/sdjob/list                        recent jobs
//! GET  /api/v1/model/version/list?type=CHECKPOINT checkpoint catalog
//! GET  /api/v1/sampler/list                      sampler catalog
//! ```

use async_trait::async_trait;
use serde::Serialize;
use studio_core::gallery::HistoryJob;
use studio_core::job::Text2ImgRequest;
use studio_core::status::{JobHandle, JobStatus};

use crate::api::{normalize_base_url, read_envelope, RemoteError};
use crate::backend::JobBackend;
use crate::schema::{CheckpointList, SamplerList, SdHistoryEntry, SdResultData, SdSubmitData};

const SUBMIT_ENDPOINT: &str = "sdjob/text2img";
const RESULT_ENDPOINT: &str = "sdjob/result";
const LIST_ENDPOINT: &str = "sdjob/list";
const CHECKPOINT_ENDPOINT: &str = "model/version/list";
const SAMPLER_ENDPOINT: &str = "sampler/list";

/// Outbound body of `POST /api/v1/sdjob/text2img`.
///
/// Borrows from the validated request so prompt text goes on the wire
/// exactly as the user typed it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Text2ImgPayload<'a> {
    pub check_point_id: &'a str,
    pub clip_skip: u32,
    pub width: u32,
    pub height: u32,
    pub img_count: u32,
    pub scheduler: &'a str,
    pub steps: u32,
    pub cfg_scale: f64,
    pub seed: i64,
    pub prompt: &'a str,
    pub negative_prompt: &'a str,
}

impl<'a> From<&'a Text2ImgRequest> for Text2ImgPayload<'a> {
    fn from(request: &'a Text2ImgRequest) -> Self {
        Self {
            check_point_id: &request.checkpoint_id,
            clip_skip: request.clip_skip,
            width: request.width,
            height: request.height,
            img_count: request.img_count,
            scheduler: &request.scheduler,
            steps: request.steps,
            cfg_scale: request.cfg_scale,
            seed: request.seed,
            prompt: &request.prompt,
            negative_prompt: &request.negative_prompt,
        }
    }
}

/// A selectable base checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckpointOption {
    pub name: String,
    /// Value to send as `checkPointId`.
    pub id: String,
}

/// HTTP client for one text-to-image service.
pub struct SdJobApi {
    client: reqwest::Client,
    api_url: String,
}

impl SdJobApi {
    /// * `api_url` - Base HTTP URL, e.g. `http://host:30000`.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_url)
    }

    /// Reuse an existing [`reqwest::Client`] (shared pool and timeouts).
    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: normalize_base_url(api_url),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Checkpoints offered by the service, in service order.
    pub async fn list_checkpoints(&self) -> Result<Vec<CheckpointOption>, RemoteError> {
        let response = self
            .client
            .get(format!("{}/api/v1/model/version/list", self.api_url))
            .query(&[("type", "CHECKPOINT")])
            .send()
            .await?;

        let list: CheckpointList = read_envelope(CHECKPOINT_ENDPOINT, response).await?;
        Ok(list
            .item
            .into_iter()
            .map(|item| CheckpointOption {
                name: item.name,
                id: item.model_version_uuid,
            })
            .collect())
    }

    /// Sampler names offered by the service.
    pub async fn list_samplers(&self) -> Result<Vec<String>, RemoteError> {
        let response = self
            .client
            .get(format!("{}/api/v1/sampler/list", self.api_url))
            .send()
            .await?;

        let list: SamplerList = read_envelope(SAMPLER_ENDPOINT, response).await?;
        Ok(list.item)
    }
}

#[async_trait]
impl JobBackend for SdJobApi {
    type Request = Text2ImgRequest;

    fn name(&self) -> &'static str {
        "sdjob"
    }

    async fn submit(&self, request: &Text2ImgRequest) -> Result<JobHandle, RemoteError> {
        let response = self
            .client
            .post(format!("{}/api/v1/sdjob/text2img", self.api_url))
            .json(&Text2ImgPayload::from(request))
            .send()
            .await?;

        let data: SdSubmitData = read_envelope(SUBMIT_ENDPOINT, response).await?;
        let job_id = JobHandle::new(data.job_uuid)
            .map_err(|e| RemoteError::schema(SUBMIT_ENDPOINT, e.to_string()))?;

        tracing::info!(job_id = %job_id, "Text-to-image job submitted");
        Ok(job_id)
    }

    async fn query(&self, job_id: &JobHandle) -> Result<JobStatus, RemoteError> {
        let response = self
            .client
            .get(format!("{}/api/v1/sdjob/result", self.api_url))
            .query(&[("jobUuid", job_id.as_str())])
            .send()
            .await?;

        let data: SdResultData = read_envelope(RESULT_ENDPOINT, response).await?;
        Ok(data.into_status())
    }

    async fn history(&self) -> Result<Vec<HistoryJob>, RemoteError> {
        let response = self
            .client
            .get(format!("{}/api/v1/sdjob/list", self.api_url))
            .send()
            .await?;

        let entries: Vec<SdHistoryEntry> = read_envelope(LIST_ENDPOINT, response).await?;
        Ok(entries.into_iter().map(HistoryJob::from).collect())
    }
}
