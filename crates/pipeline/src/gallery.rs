//! History-backed gallery loading.
//!
//! Gallery failures never reach the job path: a failed history fetch is
//! logged and turned into an empty gallery carrying the error message.

use serde::Serialize;
use studio_core::gallery::{collect_gallery, GalleryItem, GALLERY_LIMIT};
use studio_remote::backend::JobBackend;

#[derive(Debug, Default, Serialize)]
pub struct Gallery {
    pub items: Vec<GalleryItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Fetch `backend`'s recent jobs and keep the first [`GALLERY_LIMIT`] images.
pub async fn load_gallery<B>(backend: &B) -> Gallery
where
    B: JobBackend + ?Sized,
{
    match backend.history().await {
        Ok(jobs) => {
            let items = collect_gallery(&jobs, GALLERY_LIMIT);
            tracing::debug!(
                backend = backend.name(),
                jobs = jobs.len(),
                items = items.len(),
                "Gallery loaded",
            );
            Gallery { items, error: None }
        }
        Err(e) => {
            tracing::warn!(backend = backend.name(), error = %e, "Failed to load gallery");
            Gallery {
                items: Vec::new(),
                error: Some(e.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use studio_core::gallery::HistoryJob;
    use studio_core::status::{JobHandle, JobStatus};
    use studio_remote::api::RemoteError;

    use super::*;

    struct HistoryOnly(Result<Vec<HistoryJob>, u16>);

    #[async_trait]
    impl JobBackend for HistoryOnly {
        type Request = ();

        fn name(&self) -> &'static str {
            "history-only"
        }

        async fn submit(&self, _request: &()) -> Result<JobHandle, RemoteError> {
            unreachable!("gallery never submits")
        }

        async fn query(&self, _job_id: &JobHandle) -> Result<JobStatus, RemoteError> {
            unreachable!("gallery never polls")
        }

        async fn history(&self) -> Result<Vec<HistoryJob>, RemoteError> {
            self.0.clone().map_err(|status| RemoteError::ApiError {
                status,
                body: "history unavailable".into(),
            })
        }
    }

    #[tokio::test]
    async fn keeps_first_ten_images() {
        let jobs = (0..15)
            .map(|i| HistoryJob {
                label: format!("p{i}"),
                image_urls: vec![format!("http://cdn/{i}.png")],
            })
            .collect();

        let gallery = load_gallery(&HistoryOnly(Ok(jobs))).await;

        assert!(gallery.error.is_none());
        assert_eq!(gallery.items.len(), 10);
        assert_eq!(gallery.items[9].url, "http://cdn/9.png");
        assert_eq!(gallery.items[9].label, "p9");
    }

    #[tokio::test]
    async fn history_failure_becomes_empty_gallery_with_message() {
        let gallery = load_gallery(&HistoryOnly(Err(502))).await;

        assert!(gallery.items.is_empty());
        assert!(gallery.error.unwrap().contains("502"));
    }

    #[test]
    fn error_field_is_omitted_when_absent() {
        let json = serde_json::to_value(Gallery::default()).unwrap();
        assert_eq!(json, serde_json::json!({ "items": [] }));
    }
}
