//! Handlers for the text-to-image job flow and its catalogs.

use axum::extract::State;
use axum::Json;
use studio_core::job::Text2ImgRequest;
use studio_pipeline::{load_gallery, load_text2img_options, Gallery, Text2ImgOptions};

use crate::error::AppResult;
use crate::handlers::JobReportResponse;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Catalogs
// ---------------------------------------------------------------------------

/// GET /api/v1/text2img/options
///
/// Always 200; a failed list comes back empty with an entry in `errors`.
pub async fn get_options(State(state): State<AppState>) -> Json<DataResponse<Text2ImgOptions>> {
    let options = load_text2img_options(&state.sdjob).await;
    Json(DataResponse { data: options })
}

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

/// POST /api/v1/text2img/jobs
///
/// Validate, submit, poll until terminal, then download and zip the
/// results. The request stays open for the whole job.
pub async fn run_job(
    State(state): State<AppState>,
    Json(input): Json<Text2ImgRequest>,
) -> AppResult<Json<DataResponse<JobReportResponse>>> {
    let cancel = state.shutdown.child_token();
    let report = studio_pipeline::run_job(
        state.sdjob.as_ref(),
        state.fetcher.as_ref(),
        &input,
        &state.sdjob_poll,
        &cancel,
    )
    .await?;

    Ok(Json(DataResponse {
        data: report.into(),
    }))
}

// ---------------------------------------------------------------------------
// Gallery
// ---------------------------------------------------------------------------

/// GET /api/v1/text2img/gallery
pub async fn get_gallery(State(state): State<AppState>) -> Json<DataResponse<Gallery>> {
    let gallery = load_gallery(state.sdjob.as_ref()).await;
    Json(DataResponse { data: gallery })
}
