pub mod health;
pub mod text2img;
pub mod tryon;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /text2img/options                checkpoint + sampler catalogs (GET)
/// /text2img/jobs                   run a text-to-image job (POST, JSON)
/// /text2img/gallery                recent images (GET)
///
/// /tryon/jobs                      run a try-on job (POST, multipart)
/// /tryon/gallery                   recent images (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/text2img", text2img::router())
        .nest("/tryon", tryon::router())
}
