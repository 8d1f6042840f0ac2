use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Json as AxumJson},
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::str::FromStr;

use crate::auth::AuthenticatedUser;
use crate::db::models::{DonationCategory, DonationType, HumanSubcategory};
use crate::gateway;
use crate::wizard::Wizard;
use crate::AppState;

/// Raw wizard field values as the donate page holds them. Everything is
/// re-run through the wizard's submission gate server-side, so a client
/// that skipped a step still cannot persist an inconsistent record.
#[derive(Deserialize)]
pub struct SubmitDonationRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pin_code: Option<String>,
    pub date_of_birth: String, // YYYY-MM-DD
    pub category: String,
    pub subcategory: Option<String>,
    pub donation_type: String,
    pub amount: Option<String>,
    pub donation_mode: Option<String>,
    pub delivery_address: Option<String>,
    pub other_details: Option<String>,
    pub ngo_id: Option<String>,
}

fn wizard_from_request(req: &SubmitDonationRequest) -> Result<Wizard, String> {
    let mut wizard = Wizard::new();
    wizard.name = req.name.clone();
    wizard.email = req.email.clone();
    wizard.phone = req.phone.clone().unwrap_or_default();
    wizard.address = req.address.clone().unwrap_or_default();
    wizard.city = req.city.clone().unwrap_or_default();
    wizard.state = req.state.clone().unwrap_or_default();
    wizard.pin_code = req.pin_code.clone().unwrap_or_default();
    wizard.date_of_birth = NaiveDate::parse_from_str(&req.date_of_birth, "%Y-%m-%d").ok();

    let category = DonationCategory::from_str(req.category.trim())?;
    wizard.select_category(category);
    if let Some(sub) = req.subcategory.as_deref().filter(|s| !s.trim().is_empty()) {
        wizard.select_subcategory(HumanSubcategory::from_str(sub.trim())?);
    }
    wizard.select_donation_type(DonationType::from_str(req.donation_type.trim())?);

    wizard.amount = req.amount.clone().unwrap_or_default();
    wizard.donation_mode = req.donation_mode.clone().unwrap_or_default();
    wizard.delivery_address = req.delivery_address.clone().unwrap_or_default();
    wizard.other_details = req.other_details.clone().unwrap_or_default();
    wizard.ngo_id = req.ngo_id.clone().filter(|s| !s.trim().is_empty());

    Ok(wizard)
}

pub async fn create_donation(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(req): Json<SubmitDonationRequest>,
) -> impl IntoResponse {
    let wizard = match wizard_from_request(&req) {
        Ok(w) => w,
        Err(e) => {
            tracing::warn!("Donation request rejected: {}", e);
            return (StatusCode::BAD_REQUEST, e).into_response();
        }
    };

    let submission = match wizard.finish() {
        Ok(s) => s,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    match gateway::submit_donation(&state.db, &user.id, &submission).await {
        Ok(donation) => (
            StatusCode::CREATED,
            AxumJson(serde_json::json!({ "status": "created", "donation": donation })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Donation submit failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Database Error").into_response()
        }
    }
}

pub async fn list_donations(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> impl IntoResponse {
    match crate::db::list_donations_for_user(&state.db, &user.id).await {
        Ok(donations) => {
            AxumJson(serde_json::json!({ "donations": donations })).into_response()
        }
        Err(e) => {
            tracing::error!("DB Query Error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Database Error").into_response()
        }
    }
}
