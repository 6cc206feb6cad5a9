//! Handlers for the virtual try-on job flow.

use axum::extract::{Multipart, State};
use axum::Json;
use studio_core::job::{TryOnRequest, DEFAULT_TRYON_MODEL};
use studio_pipeline::{load_gallery, Gallery};

use crate::error::{AppError, AppResult};
use crate::handlers::JobReportResponse;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/tryon/jobs
///
/// Multipart fields: `model_name` (optional text), `human_image` and
/// `cloth_image` (file parts). Missing images fail validation before
/// anything is sent to the service.
pub async fn run_job(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<DataResponse<JobReportResponse>>> {
    let request = read_tryon_form(multipart).await?;
    tracing::debug!(?request, "Try-on form received");

    let cancel = state.shutdown.child_token();
    let report = studio_pipeline::run_job(
        state.tryon.as_ref(),
        state.fetcher.as_ref(),
        &request,
        &state.tryon_poll,
        &cancel,
    )
    .await?;

    Ok(Json(DataResponse {
        data: report.into(),
    }))
}

/// GET /api/v1/tryon/gallery
pub async fn get_gallery(State(state): State<AppState>) -> Json<DataResponse<Gallery>> {
    let gallery = load_gallery(state.tryon.as_ref()).await;
    Json(DataResponse { data: gallery })
}

async fn read_tryon_form(mut multipart: Multipart) -> AppResult<TryOnRequest> {
    let mut request = TryOnRequest::new(Vec::new(), Vec::new());

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "model_name" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                let text = text.trim();
                request.model_name = if text.is_empty() {
                    DEFAULT_TRYON_MODEL.to_string()
                } else {
                    text.to_string()
                };
            }
            "human_image" | "cloth_image" => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                if name == "human_image" {
                    request.human_image = data.to_vec();
                } else {
                    request.cloth_image = data.to_vec();
                }
            }
            other => {
                return Err(AppError::BadRequest(format!(
                    "Unexpected multipart field '{other}'"
                )));
            }
        }
    }

    Ok(request)
}
