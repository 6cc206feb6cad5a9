//! Client for the virtual try-on service.
//!
//! Every call carries `Authorization: Bearer <jwt>`, with a token signed
//! just before the request goes out.

use async_trait::async_trait;
use base64::Engine as _;
use serde::Serialize;
use studio_core::gallery::HistoryJob;
use studio_core::job::TryOnRequest;
use studio_core::status::{JobHandle, JobStatus};

use crate::api::{normalize_base_url, read_envelope, RemoteError};
use crate::backend::JobBackend;
use crate::credential::Credentials;
use crate::schema::{TryOnHistoryEntry, TryOnSubmitData, TryOnTaskData};

/// Path of the try-on resource, relative to the base URL.
pub const TRYON_PATH: &str = "/v1/images/kolors-virtual-try-on";

const SUBMIT_ENDPOINT: &str = "kolors-virtual-try-on";
const TASK_ENDPOINT: &str = "kolors-virtual-try-on/{task_id}";
const LIST_ENDPOINT: &str = "kolors-virtual-try-on (list)";

/// Outbound body of `POST /v1/images/kolors-virtual-try-on`.
#[derive(Serialize)]
pub struct TryOnPayload<'a> {
    pub model_name: &'a str,
    /// Standard base64, no data-URL prefix.
    pub human_image: String,
    pub cloth_image: String,
}

impl<'a> From<&'a TryOnRequest> for TryOnPayload<'a> {
    fn from(request: &'a TryOnRequest) -> Self {
        let engine = base64::engine::general_purpose::STANDARD;
        Self {
            model_name: &request.model_name,
            human_image: engine.encode(&request.human_image),
            cloth_image: engine.encode(&request.cloth_image),
        }
    }
}

/// HTTP client for the try-on service.
pub struct TryOnApi {
    client: reqwest::Client,
    api_url: String,
    credentials: Credentials,
}

impl TryOnApi {
    pub fn new(api_url: impl Into<String>, credentials: Credentials) -> Self {
        Self::with_client(reqwest::Client::new(), api_url, credentials)
    }

    pub fn with_client(
        client: reqwest::Client,
        api_url: impl Into<String>,
        credentials: Credentials,
    ) -> Self {
        Self {
            client,
            api_url: normalize_base_url(api_url),
            credentials,
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn resource_url(&self) -> String {
        format!("{}{TRYON_PATH}", self.api_url)
    }

    /// Sign a fresh token for the next call.
    fn token(&self) -> Result<String, RemoteError> {
        Ok(self.credentials.issue_token()?)
    }
}

#[async_trait]
impl JobBackend for TryOnApi {
    type Request = TryOnRequest;

    fn name(&self) -> &'static str {
        "tryon"
    }

    async fn submit(&self, request: &TryOnRequest) -> Result<JobHandle, RemoteError> {
        let token = self.token()?;
        let response = self
            .client
            .post(self.resource_url())
            .bearer_auth(token)
            .json(&TryOnPayload::from(request))
            .send()
            .await?;

        let data: TryOnSubmitData = read_envelope(SUBMIT_ENDPOINT, response).await?;
        let job_id = JobHandle::new(data.task_id)
            .map_err(|e| RemoteError::schema(SUBMIT_ENDPOINT, e.to_string()))?;

        tracing::info!(
            job_id = %job_id,
            model_name = %request.model_name,
            "Try-on task submitted",
        );
        Ok(job_id)
    }

    async fn query(&self, job_id: &JobHandle) -> Result<JobStatus, RemoteError> {
        let token = self.token()?;
        let response = self
            .client
            .get(format!("{}/{}", self.resource_url(), job_id.as_str()))
            .bearer_auth(token)
            .send()
            .await?;

        let data: TryOnTaskData = read_envelope(TASK_ENDPOINT, response).await?;
        Ok(data.into_status())
    }

    async fn history(&self) -> Result<Vec<HistoryJob>, RemoteError> {
        let token = self.token()?;
        let response = self
            .client
            .get(self.resource_url())
            .bearer_auth(token)
            .send()
            .await?;

        let entries: Vec<TryOnHistoryEntry> = read_envelope(LIST_ENDPOINT, response).await?;
        Ok(entries.into_iter().map(HistoryJob::from).collect())
    }
}
