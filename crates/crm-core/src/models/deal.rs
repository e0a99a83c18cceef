use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::validation::{require_text, ValidationErrors};
use super::{null_as_default, ExtraFields};

/// Pipeline stage of a deal. The backend stores it as a lowercase string.
///
/// Stages this client does not know read as `Unknown`; it is never a valid
/// input stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum DealStage {
    #[default]
    New,
    Contacted,
    Qualified,
    Proposal,
    Won,
    Lost,
    #[serde(other)]
    Unknown,
}

impl DealStage {
    pub const ALL: [DealStage; 6] = [
        DealStage::New,
        DealStage::Contacted,
        DealStage::Qualified,
        DealStage::Proposal,
        DealStage::Won,
        DealStage::Lost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DealStage::New => "new",
            DealStage::Contacted => "contacted",
            DealStage::Qualified => "qualified",
            DealStage::Proposal => "proposal",
            DealStage::Won => "won",
            DealStage::Lost => "lost",
            DealStage::Unknown => "unknown",
        }
    }

    /// Won and lost deals are closed; everything else is still in the pipeline.
    pub fn is_closed(&self) -> bool {
        matches!(self, DealStage::Won | DealStage::Lost)
    }
}

impl fmt::Display for DealStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown deal stage '{0}' (expected one of: new, contacted, qualified, proposal, won, lost)")]
pub struct UnknownStage(pub String);

impl FromStr for DealStage {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        DealStage::ALL
            .into_iter()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownStage(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Deal {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub amount: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stage: DealStage,
    /// Win likelihood as a percentage.
    #[serde(default, deserialize_with = "null_as_default")]
    pub probability: i32,
    #[serde(default)]
    pub contact_id: Option<i64>,
    #[serde(default)]
    pub company_id: Option<i64>,
    #[serde(default)]
    pub hubspot_id: Option<String>,
    #[serde(default)]
    pub kommo_id: Option<String>,
    #[serde(default)]
    pub close_date: Option<NaiveDate>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
    #[serde(flatten)]
    #[cfg_attr(feature = "ts", ts(skip))]
    pub extra: ExtraFields,
}

impl Deal {
    /// Amount weighted by probability.
    pub fn weighted_amount(&self) -> f64 {
        self.amount * f64::from(self.probability.clamp(0, 100)) / 100.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct NewDeal {
    pub name: String,
    pub amount: f64,
    pub stage: DealStage,
    pub probability: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_date: Option<NaiveDate>,
}

impl NewDeal {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        require_text(&mut errors, "name", &self.name, "Deal name is required");
        check_amount(&mut errors, self.amount);
        check_probability(&mut errors, self.probability);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct DealPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<DealStage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_date: Option<NaiveDate>,
}

impl DealPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if let Some(ref name) = self.name {
            require_text(&mut errors, "name", name, "Deal name is required");
        }
        if let Some(amount) = self.amount {
            check_amount(&mut errors, amount);
        }
        if let Some(probability) = self.probability {
            check_probability(&mut errors, probability);
        }
        errors.into_result()
    }
}

fn check_amount(errors: &mut ValidationErrors, amount: f64) {
    if !amount.is_finite() || amount < 0.0 {
        errors.push("amount", "Amount must be a non-negative number");
    }
}

fn check_probability(errors: &mut ValidationErrors, probability: i32) {
    if !(0..=100).contains(&probability) {
        errors.push("probability", "Probability must be between 0 and 100");
    }
}
