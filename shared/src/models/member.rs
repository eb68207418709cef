//! Member Model
//!
//! 会员登记记录。`seniority_no` 全局唯一，是 Member / SiteBooking / Receipt
//! 三张表的业务关联键。会员只编辑，不删除。

use serde::{Deserialize, Serialize};

/// Member entity (会员)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Member {
    pub id: i64,
    /// Project-prefixed unique identifier, e.g. "NCG-042"
    pub seniority_no: String,
    pub name: String,
    pub aadhar_number: i64,
    pub application_no: i64,
    pub membership_type: String,
    /// Registration date (Unix millis)
    pub date: i64,
    /// Date of birth (Unix millis)
    pub dob: i64,
    pub membership_day: Option<String>,
    /// Fixed one-time membership fee recorded at registration
    pub membership_fees: f64,
    pub father: Option<String>,
    pub birthplace: Option<String>,
    pub mobile: String,
    pub alternate_mobile: Option<String>,
    pub email: Option<String>,
    pub alternate_email: Option<String>,
    pub permanent_address: Option<String>,
    pub correspondence_address: Option<String>,
    pub nominee_name: Option<String>,
    pub nominee_number: Option<String>,
    pub nominee_age: Option<String>,
    pub nominee_relationship: Option<String>,
    pub nominee_address: Option<String>,
    pub agree_terms_conditions: bool,
    pub agree_communication: bool,
    /// Stored document references (work_dir uploads), null when not provided
    pub image: Option<String>,
    pub pancard: Option<String>,
    pub aadharcard: Option<String>,
    pub application_doc: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Update member payload
///
/// 登记（创建）走 multipart 表单，不经 JSON；更新走这里。
/// 未知字段直接拒绝，杜绝随形 payload。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemberUpdate {
    pub name: Option<String>,
    pub aadhar_number: Option<i64>,
    pub application_no: Option<i64>,
    pub membership_type: Option<String>,
    pub date: Option<String>,
    pub dob: Option<String>,
    pub membership_day: Option<String>,
    pub membership_fees: Option<f64>,
    pub father: Option<String>,
    pub birthplace: Option<String>,
    pub mobile: Option<String>,
    pub alternate_mobile: Option<String>,
    pub email: Option<String>,
    pub alternate_email: Option<String>,
    pub permanent_address: Option<String>,
    pub correspondence_address: Option<String>,
    pub nominee_name: Option<String>,
    pub nominee_number: Option<String>,
    pub nominee_age: Option<String>,
    pub nominee_relationship: Option<String>,
    pub nominee_address: Option<String>,
    pub agree_terms_conditions: Option<bool>,
    pub agree_communication: Option<bool>,
}
