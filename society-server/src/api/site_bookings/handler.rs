//! SiteBooking API Handlers
//!
//! 创建前置校验：会员必须已登记，且同一 seniority number 不允许第二条订地。
//! 更新时共享字段（编号/姓名/项目/尺寸）同步到会员与全部收据。

use axum::{
    Json,
    extract::{Extension, Multipart, Path, State},
};

use crate::auth::CurrentUser;
use crate::billing;
use crate::core::ServerState;
use crate::db::repository::site_booking::{self, NewSiteBooking};
use crate::db::repository::{member, receipt};
use crate::uploads;
use crate::utils::validation::{MAX_NAME_LEN, validate_amount, validate_required_text};
use crate::utils::{AppError, AppResponse, AppResult, ok_with_message, time};
use shared::models::{PaymentSummary, SiteBooking, SiteBookingCreate, SiteBookingUpdate};

/// GET /api/site-bookings - 获取所有订地记录
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<SiteBooking>>> {
    let bookings = site_booking::find_all(&state.pool).await?;
    Ok(Json(bookings))
}

/// POST /api/site-bookings - 创建订地记录
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<SiteBookingCreate>,
) -> AppResult<Json<AppResponse<SiteBooking>>> {
    validate_required_text(&payload.seniority_no, "seniority_no", MAX_NAME_LEN)?;
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_amount(payload.total_amount, "total_amount")?;

    // 会员必须已登记
    let member_row = member::find_by_seniority(&state.pool, &payload.seniority_no)
        .await?
        .ok_or_else(|| {
            AppError::not_found(format!(
                "Member not found for seniority number {}",
                payload.seniority_no
            ))
        })?;

    // 重复订地检查
    if site_booking::exists_for_seniority(&state.pool, &payload.seniority_no).await? {
        return Err(AppError::conflict(format!(
            "Site booking already exists for seniority number {}. Duplicate site booking is not allowed.",
            payload.seniority_no
        )));
    }

    let nominees = serde_json::to_string(&payload.nominees)
        .map_err(|e| AppError::internal(format!("Failed to encode nominees: {e}")))?;

    let data = NewSiteBooking {
        seniority_no: payload.seniority_no.clone(),
        name: payload.name,
        // 手机号以会员登记为准
        mobile_number: member_row.mobile,
        date: time::date_to_millis(&payload.date)?,
        project_name: payload.project_name,
        site_dimension: payload.site_dimension,
        total_amount: payload.total_amount,
        designation: payload.designation,
        nominees,
    };

    let created = site_booking::create(&state.pool, data).await?;

    tracing::info!(
        seniority_no = %created.seniority_no,
        booking_id = created.id,
        created_by = %current_user.username,
        "Site booking created"
    );

    Ok(ok_with_message(created, "Created successfully"))
}

/// PUT /api/site-bookings/{id} - 更新订地记录并同步关联表
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<SiteBookingUpdate>,
) -> AppResult<Json<AppResponse<SiteBooking>>> {
    if let Some(amount) = payload.total_amount {
        validate_amount(amount, "total_amount")?;
    }

    // 先取原记录，propagation 需要旧的 seniority number
    let original = site_booking::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Site booking {id}")))?;
    let old_seniority_no = original.seniority_no.clone();

    let date = payload
        .date
        .as_deref()
        .map(time::date_to_millis)
        .transpose()?;
    let nominees_json = payload
        .nominees
        .as_ref()
        .map(|n| {
            serde_json::to_string(n)
                .map_err(|e| AppError::internal(format!("Failed to encode nominees: {e}")))
        })
        .transpose()?;

    let updated = site_booking::update(&state.pool, id, &payload, date, nominees_json).await?;

    // 共享字段同步到会员与收据
    member::apply_booking_propagation(
        &state.pool,
        &old_seniority_no,
        payload.seniority_no.as_deref(),
        payload.name.as_deref(),
    )
    .await?;
    receipt::apply_booking_propagation(
        &state.pool,
        &old_seniority_no,
        payload.seniority_no.as_deref(),
        payload.name.as_deref(),
        payload.project_name.as_deref(),
        payload.site_dimension.as_deref(),
    )
    .await?;

    tracing::info!(
        booking_id = id,
        updated_by = %current_user.username,
        "Site booking updated, changes applied to member and receipt records"
    );

    Ok(ok_with_message(
        updated,
        "Site booking updated successfully! Changes also applied to Member and Receipt records.",
    ))
}

/// POST /api/site-bookings/{id}/cancel - 取消订地 (multipart, 需取消文书 PDF)
///
/// 单向转移：置 cancelled + 存文书 + 级联取消该 seniority number 的全部收据。
pub async fn cancel(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> AppResult<Json<AppResponse<SiteBooking>>> {
    let booking = site_booking::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Site booking {id}")))?;

    if booking.cancelled {
        return Err(AppError::validation(
            "Site booking is already cancelled".to_string(),
        ));
    }

    // 取消文书是必填项
    let mut pdf_data: Option<Vec<u8>> = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("cancellationPdf") {
            pdf_data = Some(field.bytes().await?.to_vec());
            break;
        }
    }
    let pdf_data = pdf_data
        .filter(|d| !d.is_empty())
        .ok_or_else(|| AppError::validation("Cancellation PDF is required".to_string()))?;

    let stored = uploads::store_pdf(
        &state.config,
        "cancellations",
        &format!("Cancellation_{id}"),
        &pdf_data,
    )?;

    let cancelled = site_booking::cancel(&state.pool, id, &stored).await?;

    tracing::info!(
        booking_id = id,
        seniority_no = %cancelled.seniority_no,
        cancelled_by = %current_user.username,
        "Site booking cancelled, receipts cascaded"
    );

    Ok(ok_with_message(cancelled, "Site booking cancelled successfully"))
}

/// GET /api/site-bookings/payment-summary/{seniority_no} - 付款汇总
///
/// 实时从收据聚合计算，不落库。
pub async fn payment_summary(
    State(state): State<ServerState>,
    Path(seniority_no): Path<String>,
) -> AppResult<Json<PaymentSummary>> {
    let booking = site_booking::find_by_seniority(&state.pool, &seniority_no)
        .await?
        .ok_or_else(|| {
            AppError::not_found(format!(
                "Site booking not found for seniority number {seniority_no}"
            ))
        })?;

    let receipts = receipt::find_by_seniority(&state.pool, &seniority_no).await?;
    Ok(Json(billing::summarize(booking.total_amount, &receipts)))
}
