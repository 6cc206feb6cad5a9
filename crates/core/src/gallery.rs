//! Gallery extraction from job history.
//!
//! History endpoints return whole jobs, each with zero or more images.
//! The gallery flattens them into `(url, label)` pairs in response order
//! and keeps only the first [`GALLERY_LIMIT`].

use serde::Serialize;

/// Maximum number of images shown in the gallery.
pub const GALLERY_LIMIT: usize = 10;

/// One prior job as reported by a history endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryJob {
    /// Caption for every image of the job (the prompt, or empty).
    pub label: String,
    pub image_urls: Vec<String>,
}

/// A selectable gallery image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalleryItem {
    pub url: String,
    pub label: String,
}

/// Flatten `jobs` into at most `limit` gallery items, preserving order.
pub fn collect_gallery(jobs: &[HistoryJob], limit: usize) -> Vec<GalleryItem> {
    jobs.iter()
        .flat_map(|job| {
            job.image_urls.iter().map(move |url| GalleryItem {
                url: url.clone(),
                label: job.label.clone(),
            })
        })
        .take(limit)
        .collect()
}
