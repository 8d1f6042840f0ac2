use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DonationStatus {
    Pending,
    Processing,
    Completed,
}

impl DonationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DonationStatus::Pending => "pending",
            DonationStatus::Processing => "processing",
            DonationStatus::Completed => "completed",
        }
    }
}

impl FromStr for DonationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(DonationStatus::Pending),
            "processing" => Ok(DonationStatus::Processing),
            "completed" => Ok(DonationStatus::Completed),
            other => Err(format!("unknown donation status: {}", other)),
        }
    }
}

impl fmt::Display for DonationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DonationCategory {
    Human,
    Animals,
    Children,
    Army,
    Research,
}

impl DonationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DonationCategory::Human => "human",
            DonationCategory::Animals => "animals",
            DonationCategory::Children => "children",
            DonationCategory::Army => "army",
            DonationCategory::Research => "research",
        }
    }
}

impl FromStr for DonationCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "human" => Ok(DonationCategory::Human),
            "animals" => Ok(DonationCategory::Animals),
            "children" => Ok(DonationCategory::Children),
            "army" => Ok(DonationCategory::Army),
            "research" => Ok(DonationCategory::Research),
            other => Err(format!("unknown donation category: {}", other)),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HumanSubcategory {
    Men,
    Women,
    Family,
    All,
}

impl HumanSubcategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            HumanSubcategory::Men => "men",
            HumanSubcategory::Women => "women",
            HumanSubcategory::Family => "family",
            HumanSubcategory::All => "all",
        }
    }
}

impl FromStr for HumanSubcategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "men" => Ok(HumanSubcategory::Men),
            "women" => Ok(HumanSubcategory::Women),
            "family" => Ok(HumanSubcategory::Family),
            "all" => Ok(HumanSubcategory::All),
            other => Err(format!("unknown human subcategory: {}", other)),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DonationType {
    Money,
    Food,
    Other,
}

impl DonationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DonationType::Money => "money",
            DonationType::Food => "food",
            DonationType::Other => "other",
        }
    }
}

impl FromStr for DonationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "money" => Ok(DonationType::Money),
            "food" => Ok(DonationType::Food),
            "other" => Ok(DonationType::Other),
            other => Err(format!("unknown donation type: {}", other)),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Donation {
    pub id: String,
    pub user_id: String,
    pub transaction_id: String,
    pub status: DonationStatus,
    pub category: DonationCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<HumanSubcategory>,
    pub donation_type: DonationType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub donation_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ngo_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact_report: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert shape for a donation. Fields for unselected wizard branches stay
/// `None` so the persisted row carries only what the donor actually chose.
#[derive(Debug, Clone)]
pub struct NewDonation {
    pub id: String,
    pub user_id: String,
    pub transaction_id: String,
    pub category: DonationCategory,
    pub subcategory: Option<HumanSubcategory>,
    pub donation_type: DonationType,
    pub amount: Option<f64>,
    pub donation_mode: Option<String>,
    pub delivery_address: Option<String>,
    pub other_details: Option<String>,
    pub ngo_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Ngo {
    pub id: String,
    pub name: String,
    pub wallet_address: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub is_verified: bool,
    pub impact_reports: i64,
    pub created_at: DateTime<Utc>,
}

/// Lookup result: a donation with its NGO relation resolved when present.
#[derive(Serialize, Debug, Clone)]
pub struct DonationWithNgo {
    #[serde(flatten)]
    pub donation: Donation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ngo: Option<Ngo>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
