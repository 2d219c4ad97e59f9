use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::generator::output;
use crate::models::{DownloadRequest, GenerateRequest, GenerateResponse};
use crate::AppState;

use super::ApiError;

/// Generate a configuration script from caller-supplied parameters
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let generated = state.generator.generate(&req).await.map_err(|e| {
        tracing::warn!(vendor = %req.vendor, "generation failed: {}", e);
        ApiError::from(e)
    })?;

    Ok(Json(GenerateResponse {
        success: true,
        config: generated.config,
        vendor: generated.vendor,
        hostname: generated.hostname,
        variables: generated.variables,
    }))
}

/// Persist a generated script and return it as a text attachment
pub async fn download(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DownloadRequest>,
) -> Result<Response, ApiError> {
    if req.config.is_empty() {
        return Err(ApiError::bad_request("config content is required"));
    }
    // Security: filename components must not escape the output directory
    if !output::is_safe_name(&req.hostname) || !output::is_safe_name(&req.vendor) {
        return Err(ApiError::bad_request("invalid hostname or vendor"));
    }

    let path = output::save_config(&state.config.output_dir, &req.hostname, &req.vendor, &req.config)
        .await
        .map_err(|e| {
            tracing::error!("failed to persist config: {}", e);
            ApiError::internal(e.to_string())
        })?;

    tracing::info!(path = %path.display(), "saved generated config");

    let filename = output::config_filename(&req.hostname, &req.vendor);
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        req.config,
    )
        .into_response())
}
