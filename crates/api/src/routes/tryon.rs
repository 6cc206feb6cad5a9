//! Route definitions for the `/tryon` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::tryon;
use crate::state::AppState;

/// Upper bound on one multipart upload (two photos plus the model name).
pub const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Routes mounted at `/tryon`.
///
/// ```text
/// POST   /jobs            -> run_job (multipart: model_name, human_image, cloth_image)
/// GET    /gallery         -> get_gallery
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/jobs",
            post(tryon::run_job).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/gallery", get(tryon::get_gallery))
}
