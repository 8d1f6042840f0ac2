use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Json as AxumJson},
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::AppState;

pub async fn list_ngos(State(state): State<AppState>) -> impl IntoResponse {
    match crate::db::list_ngos(&state.db).await {
        Ok(ngos) => AxumJson(serde_json::json!({ "ngos": ngos })).into_response(),
        Err(e) => {
            tracing::error!("NGO list failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Database Error").into_response()
        }
    }
}

#[derive(Deserialize)]
pub struct UpsertNgoRequest {
    pub id: Option<String>,
    pub name: String,
    pub wallet_address: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub is_verified: Option<bool>,
    pub impact_reports: Option<i64>,
}

pub async fn upsert_ngo(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(req): Json<UpsertNgoRequest>,
) -> impl IntoResponse {
    if req.name.trim().is_empty() || req.wallet_address.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, "Name and wallet address are required").into_response();
    }

    let id = req.id.unwrap_or_else(|| Uuid::new_v4().to_string());
    match crate::db::upsert_ngo(
        &state.db,
        &id,
        req.name.trim(),
        req.wallet_address.trim(),
        &req.category,
        &req.description,
        req.is_verified.unwrap_or(false),
        req.impact_reports.unwrap_or(0),
        Utc::now(),
    )
    .await
    {
        Ok(ngo) => (
            StatusCode::OK,
            AxumJson(serde_json::json!({ "status": "saved", "ngo": ngo })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("NGO upsert failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Database Error").into_response()
        }
    }
}
