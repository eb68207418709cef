//! Receipt Model
//!
//! 收据记录。`receipt_no` 按项目前缀独立编号（NCG-RCP-000001 / NCS-RCP-000001），
//! 数据库 UNIQUE 索引兜底。父订地取消时级联置 cancelled。

use serde::{Deserialize, Serialize};

/// Receipt entity (收据)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Receipt {
    pub id: i64,
    pub seniority_no: String,
    /// Project-scoped sequential number, unique across all receipts
    pub receipt_no: String,
    pub name: String,
    pub email: Option<String>,
    pub project_name: Option<String>,
    /// Payment date (Unix millis)
    pub date: i64,
    pub amount_paid: f64,
    pub booking_amount: f64,
    pub mobile_number: Option<String>,
    /// booking_amount + amount_paid, carried on the printed receipt
    pub total_received: f64,
    pub payment_mode: Option<String>,
    pub payment_type: Option<String>,
    pub transaction_id: Option<String>,
    pub site_dimension: Option<String>,
    pub created_by: String,
    pub bank: Option<String>,
    pub cancelled: bool,
    pub cancelled_at: Option<i64>,
    /// Stored PDF reference (work_dir uploads), null when no PDF was attached
    pub pdf_file: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create receipt payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReceiptCreate {
    pub seniority_no: String,
    /// Defaults to the registered member name when omitted
    pub name: Option<String>,
    pub email: Option<String>,
    /// Defaults to the booking's project when omitted
    pub project_name: Option<String>,
    /// "YYYY-MM-DD"
    pub date: String,
    pub amount_paid: f64,
    pub payment_mode: Option<String>,
    pub payment_type: Option<String>,
    pub transaction_id: Option<String>,
    pub site_dimension: Option<String>,
    pub created_by: Option<String>,
    pub bank: Option<String>,
    /// Caller-supplied number is honoured only when still unused
    pub receipt_no: Option<String>,
    /// Base64-encoded rendered receipt PDF (stored, attached to emails)
    pub pdf_base64: Option<String>,
}

/// Update receipt payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReceiptUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub project_name: Option<String>,
    pub date: Option<String>,
    pub amount_paid: Option<f64>,
    pub payment_mode: Option<String>,
    pub payment_type: Option<String>,
    pub transaction_id: Option<String>,
    pub site_dimension: Option<String>,
    pub bank: Option<String>,
}

/// One entered payment line on the receipt form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PaymentLine {
    pub name: String,
    pub checked: bool,
    pub amount: f64,
}

/// One "Booking Advance" amount row (up to three on the form)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdvanceRow {
    pub checked: bool,
    pub amount: f64,
}

/// Breakdown request: what the admin entered on the receipt form
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BreakdownRequest {
    pub seniority_no: String,
    pub items: Vec<PaymentLine>,
    #[serde(default)]
    pub advances: Vec<AdvanceRow>,
}

/// Adjusted breakdown to print: items/advances after the one-time
/// membership-fee reallocation, plus bookkeeping about the adjustment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakdownResponse {
    pub items: Vec<PaymentLine>,
    pub advances: Vec<AdvanceRow>,
    /// Sum of the raw entered amounts — unchanged by the adjustment
    pub total: f64,
    /// Whether the fee reallocation was attempted for this member
    pub adjustment_applied: bool,
    /// Portion of the fixed fee that could not be absorbed (0 when fully
    /// absorbed or when no adjustment applies)
    pub fee_shortfall: f64,
}
