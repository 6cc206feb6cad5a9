use std::time::Duration;

use studio_remote::poll::{PollConfig, DEFAULT_MAX_ATTEMPTS};

/// Default wall-clock ceiling on one HTTP request, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 1800;
/// Default delay between text-to-image status queries, in milliseconds.
pub const DEFAULT_SDJOB_POLL_INTERVAL_MS: u64 = 1000;
/// Default delay between try-on status queries, in milliseconds.
pub const DEFAULT_TRYON_POLL_INTERVAL_MS: u64 = 2000;

/// Settings for the text-to-image job service.
#[derive(Debug, Clone)]
pub struct SdJobConfig {
    /// Base URL (default: `http://localhost:30000`).
    pub api_url: String,
    /// Delay between status queries in milliseconds (default: `1000`).
    pub poll_interval_ms: u64,
}

/// Settings for the virtual try-on service.
///
/// Empty keys are accepted here; the first try-on call fails with a
/// configuration error instead, so text-to-image keeps working.
#[derive(Clone)]
pub struct TryOnConfig {
    /// Base URL (default: `https://api.klingai.com`).
    pub api_url: String,
    pub access_key: String,
    pub secret_key: String,
    /// Delay between status queries in milliseconds (default: `2000`).
    pub poll_interval_ms: u64,
}

impl std::fmt::Debug for TryOnConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TryOnConfig")
            .field("api_url", &self.api_url)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("poll_interval_ms", &self.poll_interval_ms)
            .finish()
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// Wall-clock ceiling on one HTTP request in seconds (default: `1800`).
    /// Must outlast the longest poll loop so an exhausted poll is reported
    /// as a job timeout rather than cut off by the HTTP layer.
    pub request_timeout_secs: u64,
    /// Timeout for each outbound call to a remote service (default: `60`).
    pub http_client_timeout_secs: u64,
    /// Status queries per job before giving up (default: `600`).
    pub poll_max_attempts: u32,
    /// Emit JSON log lines instead of the human-readable format.
    pub log_json: bool,
    pub sdjob: SdJobConfig,
    pub tryon: TryOnConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                   |
    /// |----------------------------|---------------------------|
    /// | `HOST`                     | `0.0.0.0`                 |
    /// | `PORT`                     | `3000`                    |
    /// | `CORS_ORIGINS`             | `http://localhost:5173`   |
    /// | `REQUEST_TIMEOUT_SECS`     | `1800`                    |
    /// | `HTTP_CLIENT_TIMEOUT_SECS` | `60`                      |
    /// | `POLL_MAX_ATTEMPTS`        | `600`                     |
    /// | `LOG_FORMAT`               | `text` (`json` to switch) |
    /// | `SDJOB_API_URL`            | `http://localhost:30000`  |
    /// | `SDJOB_POLL_INTERVAL_MS`   | `1000`                    |
    /// | `TRYON_API_URL`            | `https://api.klingai.com` |
    /// | `TRYON_ACCESS_KEY`         | empty                     |
    /// | `TRYON_SECRET_KEY`         | empty                     |
    /// | `TRYON_POLL_INTERVAL_MS`   | `2000`                    |
    ///
    /// # Panics
    ///
    /// Panics on unparsable numbers, on `POLL_MAX_ATTEMPTS=0`, and when
    /// `REQUEST_TIMEOUT_SECS` does not outlast either backend's poll loop
    /// (see [`ServerConfig::check_poll_budget`]).
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_REQUEST_TIMEOUT_SECS.to_string())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let http_client_timeout_secs: u64 = std::env::var("HTTP_CLIENT_TIMEOUT_SECS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("HTTP_CLIENT_TIMEOUT_SECS must be a valid u64");

        let poll_max_attempts: u32 = std::env::var("POLL_MAX_ATTEMPTS")
            .unwrap_or_else(|_| DEFAULT_MAX_ATTEMPTS.to_string())
            .parse()
            .expect("POLL_MAX_ATTEMPTS must be a valid u32");
        assert!(poll_max_attempts > 0, "POLL_MAX_ATTEMPTS must be at least 1");

        let log_json = std::env::var("LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let sdjob = SdJobConfig {
            api_url: std::env::var("SDJOB_API_URL")
                .unwrap_or_else(|_| "http://localhost:30000".into()),
            poll_interval_ms: std::env::var("SDJOB_POLL_INTERVAL_MS")
                .unwrap_or_else(|_| DEFAULT_SDJOB_POLL_INTERVAL_MS.to_string())
                .parse()
                .expect("SDJOB_POLL_INTERVAL_MS must be a valid u64"),
        };

        let tryon = TryOnConfig {
            api_url: std::env::var("TRYON_API_URL")
                .unwrap_or_else(|_| "https://api.klingai.com".into()),
            access_key: std::env::var("TRYON_ACCESS_KEY").unwrap_or_default(),
            secret_key: std::env::var("TRYON_SECRET_KEY").unwrap_or_default(),
            poll_interval_ms: std::env::var("TRYON_POLL_INTERVAL_MS")
                .unwrap_or_else(|_| DEFAULT_TRYON_POLL_INTERVAL_MS.to_string())
                .parse()
                .expect("TRYON_POLL_INTERVAL_MS must be a valid u64"),
        };

        let config = Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            http_client_timeout_secs,
            poll_max_attempts,
            log_json,
            sdjob,
            tryon,
        };

        if let Err(msg) = config.check_poll_budget() {
            panic!("{msg}");
        }
        config
    }

    /// Ensure the request timeout is longer than `interval * max_attempts`
    /// for both backends.
    pub fn check_poll_budget(&self) -> Result<(), String> {
        let timeout_ms = self.request_timeout_secs.saturating_mul(1000);
        for (backend, interval_ms) in [
            ("SDJOB", self.sdjob.poll_interval_ms),
            ("TRYON", self.tryon.poll_interval_ms),
        ] {
            let poll_ms = interval_ms.saturating_mul(u64::from(self.poll_max_attempts));
            if timeout_ms <= poll_ms {
                return Err(format!(
                    "REQUEST_TIMEOUT_SECS ({}s) must exceed {backend}_POLL_INTERVAL_MS x \
                     POLL_MAX_ATTEMPTS ({}s)",
                    self.request_timeout_secs,
                    poll_ms.div_ceil(1000),
                ));
            }
        }
        Ok(())
    }

    pub fn sdjob_poll(&self) -> PollConfig {
        PollConfig::new(
            Duration::from_millis(self.sdjob.poll_interval_ms),
            self.poll_max_attempts,
        )
    }

    pub fn tryon_poll(&self) -> PollConfig {
        PollConfig::new(
            Duration::from_millis(self.tryon.poll_interval_ms),
            self.poll_max_attempts,
        )
    }
}
