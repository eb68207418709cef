//! Member API Handlers
//!
//! 登记走 multipart（文本字段 + 四类 KYC 材料），更新走 JSON。
//! 会员不可删除，只能编辑。

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Extension, Multipart, Path, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::member::{self, MemberDocs, NewMember};
use crate::uploads;
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_email_format,
    validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResponse, AppResult, ok_with_message, time};
use shared::models::{Member, MemberUpdate};

/// 上传文件字段名（与登记表单一致）
const FILE_FIELDS: [&str; 4] = ["Image", "PanCard", "AadharCard", "ApplicationDoc"];

/// GET /api/members - 获取所有会员
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Member>>> {
    let members = member::find_all(&state.pool).await?;
    Ok(Json(members))
}

/// GET /api/members/{seniority_no} - 按 seniority number 获取会员
pub async fn get_by_seniority(
    State(state): State<ServerState>,
    Path(seniority_no): Path<String>,
) -> AppResult<Json<Member>> {
    let member = member::find_by_seniority(&state.pool, &seniority_no)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Member {seniority_no}")))?;
    Ok(Json(member))
}

fn required_field(fields: &HashMap<String, String>, key: &str) -> AppResult<String> {
    fields
        .get(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::validation(format!("{key} is required")))
}

fn optional_field(fields: &HashMap<String, String>, key: &str) -> Option<String> {
    fields
        .get(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required_i64(fields: &HashMap<String, String>, key: &str) -> AppResult<i64> {
    required_field(fields, key)?
        .parse()
        .map_err(|_| AppError::validation(format!("{key} must be a valid number")))
}

fn required_f64(fields: &HashMap<String, String>, key: &str) -> AppResult<f64> {
    required_field(fields, key)?
        .parse()
        .map_err(|_| AppError::validation(format!("{key} must be a valid number")))
}

fn bool_field(fields: &HashMap<String, String>, key: &str) -> bool {
    fields.get(key).map(|v| v == "true").unwrap_or(false)
}

/// POST /api/members - 登记新会员 (multipart)
///
/// 文本字段 + 可选的 Image / PanCard / AadharCard / ApplicationDoc 文件。
/// 空文件按未提供处理；seniority number 重复返回 409。
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> AppResult<Json<AppResponse<Member>>> {
    let mut fields: HashMap<String, String> = HashMap::new();
    let mut uploaded: HashMap<String, String> = HashMap::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if FILE_FIELDS.contains(&name.as_str()) {
            let original_name = field
                .file_name()
                .map(|s| s.to_string())
                .unwrap_or_else(|| format!("{name}.jpg"));
            let data = field.bytes().await?;
            if data.is_empty() {
                // 空 buffer 跳过，与未提供等价
                tracing::warn!(field = %name, "Skipping empty upload buffer");
                continue;
            }
            let stored = uploads::store_document(&state.config, "members", &original_name, &data)?;
            uploaded.insert(name, stored);
        } else {
            fields.insert(name, field.text().await?);
        }
    }

    let seniority_no = required_field(&fields, "seniority_no")?;
    validate_required_text(&seniority_no, "seniority_no", MAX_SHORT_TEXT_LEN)?;
    let name = required_field(&fields, "name")?;
    validate_required_text(&name, "name", MAX_NAME_LEN)?;
    let email = optional_field(&fields, "email");
    if let Some(ref e) = email {
        validate_email_format(e)?;
    }
    let permanent_address = optional_field(&fields, "permanent_address");
    validate_optional_text(&permanent_address, "permanent_address", MAX_ADDRESS_LEN)?;
    let correspondence_address = optional_field(&fields, "correspondence_address");
    validate_optional_text(&correspondence_address, "correspondence_address", MAX_ADDRESS_LEN)?;

    let data = NewMember {
        seniority_no: seniority_no.clone(),
        name,
        aadhar_number: required_i64(&fields, "aadhar_number")?,
        application_no: required_i64(&fields, "application_no")?,
        membership_type: required_field(&fields, "membership_type")?,
        date: time::date_to_millis(&required_field(&fields, "date")?)?,
        dob: time::date_to_millis(&required_field(&fields, "dob")?)?,
        membership_day: optional_field(&fields, "membership_day"),
        membership_fees: required_f64(&fields, "membership_fees")?,
        father: optional_field(&fields, "father"),
        birthplace: optional_field(&fields, "birthplace"),
        mobile: required_field(&fields, "mobile")?,
        alternate_mobile: optional_field(&fields, "alternate_mobile"),
        email,
        alternate_email: optional_field(&fields, "alternate_email"),
        permanent_address,
        correspondence_address,
        nominee_name: optional_field(&fields, "nominee_name"),
        nominee_number: optional_field(&fields, "nominee_number"),
        nominee_age: optional_field(&fields, "nominee_age"),
        nominee_relationship: optional_field(&fields, "nominee_relationship"),
        nominee_address: optional_field(&fields, "nominee_address"),
        agree_terms_conditions: bool_field(&fields, "agree_terms_conditions"),
        agree_communication: bool_field(&fields, "agree_communication"),
    };

    if member::find_by_seniority(&state.pool, &seniority_no)
        .await?
        .is_some()
    {
        return Err(AppError::conflict(format!(
            "A member with this seniority number ({seniority_no}) already exists"
        )));
    }

    let docs = MemberDocs {
        image: uploaded.remove("Image"),
        pancard: uploaded.remove("PanCard"),
        aadharcard: uploaded.remove("AadharCard"),
        application_doc: uploaded.remove("ApplicationDoc"),
    };

    let created = member::create(&state.pool, data, docs).await?;

    tracing::info!(
        seniority_no = %created.seniority_no,
        created_by = %current_user.username,
        "Member registered"
    );

    Ok(ok_with_message(created, "Member added successfully"))
}

/// PUT /api/members/{seniority_no} - 更新会员
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(seniority_no): Path<String>,
    Json(payload): Json<MemberUpdate>,
) -> AppResult<Json<Member>> {
    if let Some(ref e) = payload.email {
        validate_email_format(e)?;
    }
    validate_optional_text(&payload.permanent_address, "permanent_address", MAX_ADDRESS_LEN)?;
    validate_optional_text(
        &payload.correspondence_address,
        "correspondence_address",
        MAX_ADDRESS_LEN,
    )?;
    let date = payload
        .date
        .as_deref()
        .map(time::date_to_millis)
        .transpose()?;
    let dob = payload
        .dob
        .as_deref()
        .map(time::date_to_millis)
        .transpose()?;

    let updated = member::update(&state.pool, &seniority_no, &payload, date, dob).await?;

    tracing::info!(
        seniority_no = %seniority_no,
        updated_by = %current_user.username,
        "Member updated"
    );

    Ok(Json(updated))
}
