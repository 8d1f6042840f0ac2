//! Five-step donation intake flow.
//!
//! `PersonalInfo → CategorySelect → [HumanSubcategorySelect] →
//! DonationTypeSelect → DetailsAndSubmit`. The subcategory step only exists
//! for the `human` category; every other category jumps straight to the
//! donation-type step. Fields stay sticky across back/forward navigation so
//! nothing is re-entered, and `finish` re-checks every gate before handing a
//! validated submission to the gateway.

use chrono::NaiveDate;
use thiserror::Error;

use crate::db::models::{DonationCategory, DonationType, HumanSubcategory};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WizardError {
    #[error("Please complete all required personal fields")]
    MissingPersonalInfo,
    #[error("Please make a selection to continue")]
    MissingSelection,
    #[error("Please enter a valid donation amount")]
    InvalidAmount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    PersonalInfo,
    CategorySelect,
    HumanSubcategorySelect,
    DonationTypeSelect,
    DetailsAndSubmit,
}

/// In-progress wizard state. All field values are plain editable text (the
/// money amount included) until `finish` parses and validates them.
#[derive(Debug, Clone, Default)]
pub struct Wizard {
    step: Step,

    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pin_code: String,
    pub date_of_birth: Option<NaiveDate>,

    pub category: Option<DonationCategory>,
    pub subcategory: Option<HumanSubcategory>,
    pub donation_type: Option<DonationType>,
    pub amount: String,
    pub donation_mode: String,
    pub delivery_address: String,
    pub other_details: String,
    pub ngo_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Step {
    #[default]
    PersonalInfo,
    CategorySelect,
    HumanSubcategorySelect,
    DonationTypeSelect,
    DetailsAndSubmit,
}

impl From<Step> for WizardStep {
    fn from(step: Step) -> Self {
        match step {
            Step::PersonalInfo => WizardStep::PersonalInfo,
            Step::CategorySelect => WizardStep::CategorySelect,
            Step::HumanSubcategorySelect => WizardStep::HumanSubcategorySelect,
            Step::DonationTypeSelect => WizardStep::DonationTypeSelect,
            Step::DetailsAndSubmit => WizardStep::DetailsAndSubmit,
        }
    }
}

impl Wizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> WizardStep {
        self.step.into()
    }

    /// Selecting a non-human category clears any subcategory left over from
    /// an earlier `human` pick, so stale sub-state can never reach submit.
    pub fn select_category(&mut self, category: DonationCategory) {
        self.category = Some(category);
        if category != DonationCategory::Human {
            self.subcategory = None;
        }
    }

    pub fn select_subcategory(&mut self, subcategory: HumanSubcategory) {
        self.subcategory = Some(subcategory);
    }

    pub fn select_donation_type(&mut self, donation_type: DonationType) {
        self.donation_type = Some(donation_type);
    }

    fn personal_info_complete(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.email.trim().is_empty()
            && self.date_of_birth.is_some()
    }

    /// Advance one step. The current step's gate must pass; on failure the
    /// wizard stays where it is and the caller surfaces the error.
    pub fn advance(&mut self) -> Result<WizardStep, WizardError> {
        let next = match self.step {
            Step::PersonalInfo => {
                if !self.personal_info_complete() {
                    return Err(WizardError::MissingPersonalInfo);
                }
                Step::CategorySelect
            }
            Step::CategorySelect => match self.category {
                Some(DonationCategory::Human) => Step::HumanSubcategorySelect,
                Some(_) => Step::DonationTypeSelect,
                None => return Err(WizardError::MissingSelection),
            },
            Step::HumanSubcategorySelect => {
                if self.subcategory.is_none() {
                    return Err(WizardError::MissingSelection);
                }
                Step::DonationTypeSelect
            }
            Step::DonationTypeSelect => {
                if self.donation_type.is_none() {
                    return Err(WizardError::MissingSelection);
                }
                Step::DetailsAndSubmit
            }
            Step::DetailsAndSubmit => return Err(WizardError::MissingSelection),
        };
        self.step = next;
        Ok(next.into())
    }

    /// Step back without clearing anything. A no-op on the first step.
    pub fn back(&mut self) -> WizardStep {
        self.step = match self.step {
            Step::PersonalInfo => Step::PersonalInfo,
            Step::CategorySelect => Step::PersonalInfo,
            Step::HumanSubcategorySelect => Step::CategorySelect,
            Step::DonationTypeSelect => {
                if self.category == Some(DonationCategory::Human) {
                    Step::HumanSubcategorySelect
                } else {
                    Step::CategorySelect
                }
            }
            Step::DetailsAndSubmit => Step::DonationTypeSelect,
        };
        self.step.into()
    }

    /// Final submission gate. Re-validates every earlier step, then builds
    /// the variant carrying only the fields the chosen branch needs.
    pub fn finish(&self) -> Result<DonationSubmission, WizardError> {
        if !self.personal_info_complete() {
            return Err(WizardError::MissingPersonalInfo);
        }

        let category = self.category.ok_or(WizardError::MissingSelection)?;
        let donation_type = self.donation_type.ok_or(WizardError::MissingSelection)?;

        let category = match category {
            DonationCategory::Human => {
                CategoryChoice::Human(self.subcategory.ok_or(WizardError::MissingSelection)?)
            }
            DonationCategory::Animals => CategoryChoice::Animals,
            DonationCategory::Children => CategoryChoice::Children,
            DonationCategory::Army => CategoryChoice::Army,
            DonationCategory::Research => CategoryChoice::Research,
        };

        let kind = match donation_type {
            DonationType::Money => {
                let amount = self
                    .amount
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|a| a.is_finite() && *a > 0.0)
                    .ok_or(WizardError::InvalidAmount)?;
                DonationKind::Money {
                    amount,
                    mode: non_empty(&self.donation_mode),
                }
            }
            DonationType::Food => DonationKind::Food {
                details: self.other_details.clone(),
                delivery_address: non_empty(&self.delivery_address),
            },
            DonationType::Other => DonationKind::Other {
                details: self.other_details.clone(),
                delivery_address: non_empty(&self.delivery_address),
            },
        };

        Ok(DonationSubmission {
            donor: DonorInfo {
                name: self.name.trim().to_string(),
                email: self.email.trim().to_string(),
                phone: non_empty(&self.phone),
                address: non_empty(&self.address),
                city: non_empty(&self.city),
                state: non_empty(&self.state),
                pin_code: non_empty(&self.pin_code),
                date_of_birth: self
                    .date_of_birth
                    .ok_or(WizardError::MissingPersonalInfo)?,
            },
            category,
            kind,
            ngo_id: self.ngo_id.clone(),
        })
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DonorInfo {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pin_code: Option<String>,
    pub date_of_birth: NaiveDate,
}

/// Category choice with the subcategory living only inside `Human`, so a
/// non-human donation cannot carry one by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryChoice {
    Human(HumanSubcategory),
    Animals,
    Children,
    Army,
    Research,
}

impl CategoryChoice {
    pub fn category(&self) -> DonationCategory {
        match self {
            CategoryChoice::Human(_) => DonationCategory::Human,
            CategoryChoice::Animals => DonationCategory::Animals,
            CategoryChoice::Children => DonationCategory::Children,
            CategoryChoice::Army => DonationCategory::Army,
            CategoryChoice::Research => DonationCategory::Research,
        }
    }

    pub fn subcategory(&self) -> Option<HumanSubcategory> {
        match self {
            CategoryChoice::Human(sub) => Some(*sub),
            _ => None,
        }
    }
}

/// Each donation kind carries only its own detail fields: an amount for
/// money, free-text details for food and other.
#[derive(Debug, Clone, PartialEq)]
pub enum DonationKind {
    Money {
        amount: f64,
        mode: Option<String>,
    },
    Food {
        details: String,
        delivery_address: Option<String>,
    },
    Other {
        details: String,
        delivery_address: Option<String>,
    },
}

impl DonationKind {
    pub fn donation_type(&self) -> DonationType {
        match self {
            DonationKind::Money { .. } => DonationType::Money,
            DonationKind::Food { .. } => DonationType::Food,
            DonationKind::Other { .. } => DonationType::Other,
        }
    }

    pub fn amount(&self) -> Option<f64> {
        match self {
            DonationKind::Money { amount, .. } => Some(*amount),
            _ => None,
        }
    }

    pub fn donation_mode(&self) -> Option<&str> {
        match self {
            DonationKind::Money { mode, .. } => mode.as_deref(),
            _ => None,
        }
    }

    pub fn other_details(&self) -> Option<&str> {
        match self {
            DonationKind::Money { .. } => None,
            DonationKind::Food { details, .. } | DonationKind::Other { details, .. } => {
                Some(details.as_str())
            }
        }
    }

    pub fn delivery_address(&self) -> Option<&str> {
        match self {
            DonationKind::Money { .. } => None,
            DonationKind::Food {
                delivery_address, ..
            }
            | DonationKind::Other {
                delivery_address, ..
            } => delivery_address.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DonationSubmission {
    pub donor: DonorInfo,
    pub category: CategoryChoice,
    pub kind: DonationKind,
    pub ngo_id: Option<String>,
}
