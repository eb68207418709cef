//! SiteBooking Model
//!
//! 每个会员最多一个有效订地记录。取消是单向终态（cancelled 置位 + 取消文书）。

use serde::{Deserialize, Serialize};

/// Booking nominee entry (stored as JSON in the nominees column)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BookingNominee {
    pub name: String,
    pub age: Option<String>,
    pub relationship: Option<String>,
}

/// SiteBooking entity (订地记录)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct SiteBooking {
    pub id: i64,
    pub seniority_no: String,
    pub name: String,
    /// Copied from the member record at creation
    pub mobile_number: String,
    /// Booking date (Unix millis)
    pub date: i64,
    pub project_name: Option<String>,
    pub site_dimension: Option<String>,
    /// Amount owed for the site; receipts are reconciled against this
    pub total_amount: f64,
    pub designation: Option<String>,
    /// JSON-encoded Vec<BookingNominee>
    pub nominees: String,
    pub status: String,
    pub cancelled: bool,
    /// Stored cancellation document reference (required to cancel)
    pub cancellation_pdf: Option<String>,
    pub cancelled_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl SiteBooking {
    /// Decode the nominees JSON column (empty list on malformed data)
    pub fn nominee_list(&self) -> Vec<BookingNominee> {
        serde_json::from_str(&self.nominees).unwrap_or_default()
    }
}

/// Create site booking payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteBookingCreate {
    pub seniority_no: String,
    pub name: String,
    /// "YYYY-MM-DD"
    pub date: String,
    pub project_name: Option<String>,
    pub site_dimension: Option<String>,
    pub total_amount: f64,
    pub designation: Option<String>,
    #[serde(default)]
    pub nominees: Vec<BookingNominee>,
}

/// Update site booking payload
///
/// seniority_no / name / project_name / site_dimension changes propagate to the
/// member record and all receipts of the old seniority number.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteBookingUpdate {
    pub seniority_no: Option<String>,
    pub name: Option<String>,
    pub date: Option<String>,
    pub project_name: Option<String>,
    pub site_dimension: Option<String>,
    pub total_amount: Option<f64>,
    pub designation: Option<String>,
    pub nominees: Option<Vec<BookingNominee>>,
}

/// Payment summary derived from receipts — recomputed on every read, never stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSummary {
    pub total_amount: f64,
    pub paid_amount: f64,
    /// May be negative when overpaid — intentionally not clamped
    pub remaining_amount: f64,
}
