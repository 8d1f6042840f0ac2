//! Turns a validated wizard submission into exactly one durable write.

use chrono::Utc;
use uuid::Uuid;

use crate::db::models::{Donation, NewDonation};
use crate::db::{self, DbPool};
use crate::wizard::DonationSubmission;

/// Mint the shareable lookup key: `tx_` plus a random UUID with the
/// separators stripped. Uniqueness rests on the datastore's UNIQUE
/// constraint; no collision check is made here.
pub fn mint_transaction_id() -> String {
    format!("tx_{}", Uuid::new_v4().simple())
}

/// Persist one donation for the authenticated owner. The minted
/// transaction id is returned only inside the persisted row; on failure it
/// is dropped with the error, and a retry mints a fresh one.
pub async fn submit_donation(
    pool: &DbPool,
    user_id: &str,
    submission: &DonationSubmission,
) -> anyhow::Result<Donation> {
    let new = NewDonation {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        transaction_id: mint_transaction_id(),
        category: submission.category.category(),
        subcategory: submission.category.subcategory(),
        donation_type: submission.kind.donation_type(),
        amount: submission.kind.amount(),
        donation_mode: submission.kind.donation_mode().map(str::to_string),
        delivery_address: submission.kind.delivery_address().map(str::to_string),
        other_details: submission.kind.other_details().map(str::to_string),
        ngo_id: submission.ngo_id.clone(),
        created_at: Utc::now(),
    };

    db::insert_donation(pool, new).await
}
