//! Result download and archive packaging.
//!
//! URLs are fetched one at a time in service order. A failed download is
//! recorded against its URL and the batch moves on; the archive holds the
//! successes only, renumbered from 1.

use async_trait::async_trait;
use serde::Serialize;
use studio_core::archive::ResultArchive;
use studio_core::error::CoreError;
use studio_core::status::ResultAsset;

use crate::api::{ensure_success, RemoteError};

/// Downloads the bytes behind a result URL.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, RemoteError>;
}

/// [`AssetFetcher`] backed by a plain HTTP GET.
pub struct HttpAssetFetcher {
    client: reqwest::Client,
}

impl HttpAssetFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AssetFetcher for HttpAssetFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, RemoteError> {
        let response = self.client.get(url).send().await?;
        let response = ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

/// A result URL that could not be downloaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetFailure {
    /// 1-based position of the URL in the job's result list.
    pub position: usize,
    pub url: String,
    pub error: String,
}

/// Outcome of collecting one job's results.
#[derive(Debug)]
pub struct CollectedResults {
    pub archive: ResultArchive,
    pub failures: Vec<AssetFailure>,
}

/// Download every URL and package the successes into a zip archive.
///
/// Only archive assembly can fail; download errors end up in
/// [`CollectedResults::failures`].
pub async fn collect_results<F>(fetcher: &F, urls: &[String]) -> Result<CollectedResults, CoreError>
where
    F: AssetFetcher + ?Sized,
{
    let mut assets = Vec::with_capacity(urls.len());
    let mut failures = Vec::new();

    for (index, url) in urls.iter().enumerate() {
        match fetcher.fetch(url).await {
            Ok(bytes) => {
                tracing::debug!(url = %url, bytes = bytes.len(), "Fetched result asset");
                assets.push(ResultAsset {
                    url: url.clone(),
                    bytes,
                });
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Failed to fetch result asset");
                failures.push(AssetFailure {
                    position: index + 1,
                    url: url.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    let archive = ResultArchive::from_assets(&assets)?;
    tracing::info!(
        fetched = archive.len(),
        failed = failures.len(),
        "Result archive assembled",
    );

    Ok(CollectedResults { archive, failures })
}
