use std::sync::Arc;
use std::time::Duration;

use studio_remote::api::{build_http_client, RemoteError};
use studio_remote::collector::HttpAssetFetcher;
use studio_remote::credential::Credentials;
use studio_remote::poll::PollConfig;
use studio_remote::sdjob::SdJobApi;
use studio_remote::tryon::TryOnApi;
use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: every field is behind `Arc` or is already `Clone`.
/// Nothing in here is specific to one job; per-job state lives in the
/// handler's own `JobSession`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub sdjob: Arc<SdJobApi>,
    pub tryon: Arc<TryOnApi>,
    pub fetcher: Arc<HttpAssetFetcher>,
    pub sdjob_poll: PollConfig,
    pub tryon_poll: PollConfig,
    /// Cancelled on shutdown; every in-flight poll loop watches it.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Build the remote clients from `config`, sharing one HTTP client.
    pub fn new(config: ServerConfig, shutdown: CancellationToken) -> Result<Self, RemoteError> {
        let client = build_http_client(Duration::from_secs(config.http_client_timeout_secs))?;

        let sdjob = SdJobApi::with_client(client.clone(), config.sdjob.api_url.clone());
        let tryon = TryOnApi::with_client(
            client.clone(),
            config.tryon.api_url.clone(),
            Credentials::new(
                config.tryon.access_key.clone(),
                config.tryon.secret_key.clone(),
            ),
        );

        Ok(Self {
            sdjob_poll: config.sdjob_poll(),
            tryon_poll: config.tryon_poll(),
            config: Arc::new(config),
            sdjob: Arc::new(sdjob),
            tryon: Arc::new(tryon),
            fetcher: Arc::new(HttpAssetFetcher::new(client)),
            shutdown,
        })
    }
}
