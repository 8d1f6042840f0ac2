//! Transaction tracker: resolve a `txid` to at most one donation and derive
//! the status view. The donate page link and the manual search box both land
//! on this one handler.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json as AxumJson},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::models::{
    Donation, DonationCategory, DonationStatus, DonationType, DonationWithNgo, HumanSubcategory,
};
use crate::AppState;

#[derive(Deserialize)]
pub struct TrackParams {
    pub txid: Option<String>,
}

/// Presentation state derived purely from the stored record, so repeated
/// lookups with no intervening write render identically.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TrackingView {
    pub transaction_id: String,
    pub status: DonationStatus,
    pub status_label: &'static str,
    pub explanation: String,
    pub category: DonationCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<HumanSubcategory>,
    pub donation_type: DonationType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ngo_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ngo_wallet_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_details: Option<String>,
    pub created_at: DateTime<Utc>,
}

fn status_label(status: DonationStatus) -> &'static str {
    match status {
        DonationStatus::Pending => "Pending",
        DonationStatus::Processing => "Processing",
        DonationStatus::Completed => "Completed",
    }
}

fn status_explanation(donation: &Donation) -> String {
    match donation.status {
        DonationStatus::Pending => {
            "Your donation is pending confirmation. The assigned NGO will pick it up shortly."
                .to_string()
        }
        DonationStatus::Processing => {
            "Your donation is being processed. Usage details will be available once completed."
                .to_string()
        }
        DonationStatus::Completed => match donation
            .impact_report
            .as_deref()
            .filter(|r| !r.trim().is_empty())
        {
            Some(report) => report.to_string(),
            None => "Your donation is complete. The NGO will publish an impact report soon."
                .to_string(),
        },
    }
}

pub fn tracking_view(result: &DonationWithNgo) -> TrackingView {
    let donation = &result.donation;
    TrackingView {
        transaction_id: donation.transaction_id.clone(),
        status: donation.status,
        status_label: status_label(donation.status),
        explanation: status_explanation(donation),
        category: donation.category,
        subcategory: donation.subcategory,
        donation_type: donation.donation_type,
        amount: donation.amount,
        ngo_name: result.ngo.as_ref().map(|n| n.name.clone()),
        ngo_wallet_address: result.ngo.as_ref().map(|n| n.wallet_address.clone()),
        delivery_address: donation
            .delivery_address
            .clone()
            .filter(|s| !s.trim().is_empty()),
        other_details: donation
            .other_details
            .clone()
            .filter(|s| !s.trim().is_empty()),
        created_at: donation.created_at,
    }
}

pub async fn track_donation(
    State(state): State<AppState>,
    Query(params): Query<TrackParams>,
) -> impl IntoResponse {
    let txid = params.txid.unwrap_or_default();
    let txid = txid.trim();
    if txid.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            AxumJson(serde_json::json!({ "error": "Missing transaction ID" })),
        )
            .into_response();
    }

    match crate::db::find_donation_by_transaction_id(&state.db, txid).await {
        Ok(Some(result)) => AxumJson(tracking_view(&result)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            AxumJson(serde_json::json!({
                "error": "No donation found with this transaction ID. Please check and try again."
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Tracker lookup failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Database Error").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::Ngo;

    fn donation(status: DonationStatus) -> Donation {
        Donation {
            id: "d-1".to_string(),
            user_id: "u-1".to_string(),
            transaction_id: "tx_0123456789abcdef0123456789abcdef".to_string(),
            status,
            category: DonationCategory::Children,
            subcategory: None,
            donation_type: DonationType::Money,
            amount: Some(500.0),
            donation_mode: None,
            delivery_address: None,
            other_details: None,
            ngo_id: None,
            impact_report: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn pending_and_processing_render_static_copy() {
        let pending = tracking_view(&DonationWithNgo {
            donation: donation(DonationStatus::Pending),
            ngo: None,
        });
        assert_eq!(pending.status_label, "Pending");
        assert!(pending.explanation.contains("pending confirmation"));

        let processing = tracking_view(&DonationWithNgo {
            donation: donation(DonationStatus::Processing),
            ngo: None,
        });
        assert!(processing.explanation.contains("being processed"));
    }

    #[test]
    fn completed_surfaces_impact_report_verbatim() {
        let mut d = donation(DonationStatus::Completed);
        d.impact_report = Some("Educational materials for 20 children".to_string());
        let view = tracking_view(&DonationWithNgo { donation: d, ngo: None });
        assert_eq!(view.explanation, "Educational materials for 20 children");
    }

    #[test]
    fn completed_without_report_renders_neutral_message() {
        let view = tracking_view(&DonationWithNgo {
            donation: donation(DonationStatus::Completed),
            ngo: None,
        });
        assert!(view.explanation.contains("impact report"));
    }

    #[test]
    fn optional_fields_are_omitted_not_errors() {
        let mut d = donation(DonationStatus::Pending);
        d.amount = None;
        d.other_details = Some("   ".to_string());
        let view = tracking_view(&DonationWithNgo { donation: d, ngo: None });
        assert_eq!(view.amount, None);
        assert_eq!(view.other_details, None);
        assert_eq!(view.ngo_name, None);
    }

    #[test]
    fn ngo_relation_surfaces_name_and_wallet() {
        let ngo = Ngo {
            id: "n-1".to_string(),
            name: "Child Hope Foundation".to_string(),
            wallet_address: "0x1a2b3c".to_string(),
            category: None,
            description: None,
            is_verified: true,
            impact_reports: 3,
            created_at: Utc::now(),
        };
        let view = tracking_view(&DonationWithNgo {
            donation: donation(DonationStatus::Pending),
            ngo: Some(ngo),
        });
        assert_eq!(view.ngo_name.as_deref(), Some("Child Hope Foundation"));
        assert_eq!(view.ngo_wallet_address.as_deref(), Some("0x1a2b3c"));
    }

    #[test]
    fn derivation_is_idempotent() {
        let result = DonationWithNgo {
            donation: donation(DonationStatus::Processing),
            ngo: None,
        };
        assert_eq!(tracking_view(&result), tracking_view(&result));
    }

    async fn state_with_pool() -> (tempfile::TempDir, AppState) {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("track-test.db");
        let pool = crate::db::init_pool_at(path.to_str().expect("utf8 path"))
            .await
            .expect("init pool");
        (
            dir,
            AppState {
                db: pool,
                index_template: String::new(),
            },
        )
    }

    async fn track(state: AppState, txid: Option<&str>) -> axum::response::Response {
        track_donation(
            State(state),
            Query(TrackParams {
                txid: txid.map(str::to_string),
            }),
        )
        .await
        .into_response()
    }

    async fn body_text(resp: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("body");
        String::from_utf8(bytes.to_vec()).expect("utf8 body")
    }

    #[tokio::test]
    async fn handler_rejects_missing_or_blank_txid_locally() {
        let (_dir, state) = state_with_pool().await;

        for txid in [None, Some(""), Some("   ")] {
            let resp = track(state.clone(), txid).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            let body = body_text(resp).await;
            assert!(body.contains("Missing transaction ID"));
        }
    }

    #[tokio::test]
    async fn handler_reports_unknown_txid_as_not_found() {
        let (_dir, state) = state_with_pool().await;

        let resp = track(state.clone(), Some("tx_doesnotexist")).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body = body_text(resp).await;
        assert!(body.contains("No donation found"));
    }

    #[tokio::test]
    async fn handler_returns_view_for_persisted_donation() {
        let (_dir, state) = state_with_pool().await;

        let mut wizard = crate::wizard::Wizard::new();
        wizard.name = "Asha".to_string();
        wizard.email = "a@x.com".to_string();
        wizard.date_of_birth = chrono::NaiveDate::from_ymd_opt(1991, 4, 2);
        wizard.select_category(DonationCategory::Children);
        wizard.select_donation_type(DonationType::Money);
        wizard.amount = "500".to_string();
        let submission = wizard.finish().expect("finish");
        let donation = crate::gateway::submit_donation(&state.db, "user-asha", &submission)
            .await
            .expect("submit");

        // Surrounding whitespace is trimmed before the lookup runs.
        let padded = format!("  {}  ", donation.transaction_id);
        let resp = track(state.clone(), Some(&padded)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_text(resp).await;
        assert!(body.contains(&donation.transaction_id));
        assert!(body.contains("pending confirmation"));
    }
}
