use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::models::VendorInfo;
use crate::AppState;

use super::ApiError;

/// List supported vendors
pub async fn list_vendors(State(state): State<Arc<AppState>>) -> Json<Vec<VendorInfo>> {
    let vendors = state
        .generator
        .registry()
        .all()
        .iter()
        .map(|p| VendorInfo {
            id: p.id.to_string(),
            name: p.display_name.to_string(),
        })
        .collect();
    Json(vendors)
}

#[derive(Debug, Deserialize)]
pub struct VendorConfigQuery {
    #[serde(default)]
    pub vendor: String,
}

/// Default values for one vendor (used to pre-fill the form)
pub async fn vendor_config(
    State(state): State<Arc<AppState>>,
    Query(query): Query<VendorConfigQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let profile = state
        .generator
        .registry()
        .lookup(&query.vendor)
        .ok_or_else(|| ApiError::bad_request(format!("unsupported vendor: {}", query.vendor)))?;

    Ok(Json(serde_json::json!({
        "success": true,
        "vendor": profile.id,
        "config": profile.defaults(),
    })))
}
