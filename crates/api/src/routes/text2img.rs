//! Route definitions for the `/text2img` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::text2img;
use crate::state::AppState;

/// Routes mounted at `/text2img`.
///
/// ```text
/// GET    /options         -> get_options
/// POST   /jobs            -> run_job
/// GET    /gallery         -> get_gallery
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/options", get(text2img::get_options))
        .route("/jobs", post(text2img::run_job))
        .route("/gallery", get(text2img::get_gallery))
}
