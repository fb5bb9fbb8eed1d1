//! Giving models: funds, contributions and summaries

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::patch::double_option;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContributionMethod {
    Cash,
    BankTransfer,
    Eftpos,
    Other,
}

impl ContributionMethod {
    /// Human label used in audit summaries ("bank transfer")
    pub fn label(&self) -> &'static str {
        match self {
            ContributionMethod::Cash => "cash",
            ContributionMethod::BankTransfer => "bank transfer",
            ContributionMethod::Eftpos => "eftpos",
            ContributionMethod::Other => "other",
        }
    }
}

impl fmt::Display for ContributionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let wire = match self {
            ContributionMethod::Cash => "cash",
            ContributionMethod::BankTransfer => "bank-transfer",
            ContributionMethod::Eftpos => "eftpos",
            ContributionMethod::Other => "other",
        };
        f.write_str(wire)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fund {
    pub id: String,
    pub church_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contribution {
    pub id: String,
    pub church_id: String,
    pub member_id: String,
    pub amount: f64,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fund_id: Option<String>,
    pub method: ContributionMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFundRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFundRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecordContributionRequest {
    /// Giver; defaults to the caller
    pub member_id: Option<String>,
    #[validate(range(min = 0.01))]
    pub amount: f64,
    /// Defaults to today
    pub date: Option<NaiveDate>,
    pub fund_id: Option<String>,
    pub method: ContributionMethod,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContributionRequest {
    pub member_id: Option<String>,
    #[validate(range(min = 0.01))]
    pub amount: Option<f64>,
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "double_option")]
    pub fund_id: Option<Option<String>>,
    pub method: Option<ContributionMethod>,
    #[serde(default, deserialize_with = "double_option")]
    pub note: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionFilter {
    pub member_id: Option<String>,
    pub fund_id: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GivingTotals {
    pub overall: f64,
    pub month_to_date: f64,
    pub previous_month: f64,
    pub average_gift: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FundTotal {
    pub fund_id: Option<String>,
    pub name: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MonthlyTotal {
    /// `YYYY-MM`
    pub month: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GivingSummary {
    pub totals: GivingTotals,
    pub by_fund: Vec<FundTotal>,
    pub monthly: Vec<MonthlyTotal>,
}
