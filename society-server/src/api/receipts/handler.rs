//! Receipt API Handlers
//!
//! 创建流程：校验（缺编号 400 → 查无会员/订地 404）→ 编号生成 →
//! 存 PDF → 入库（UNIQUE 撞号返回 409）→ 响应后由 outbox 异步发信。
//! 任何写入都发生在全部校验通过之后。

use axum::{
    Json,
    extract::{Extension, Path, State},
    http::header,
    response::IntoResponse,
};
use base64::Engine;

use crate::auth::CurrentUser;
use crate::billing;
use crate::core::ServerState;
use crate::db::repository::receipt::{self, NewReceipt};
use crate::db::repository::{member, outbox, site_booking};
use crate::uploads;
use crate::utils::validation::{validate_amount, validate_email_format};
use crate::utils::{AppError, AppResponse, AppResult, ok_with_message, time};
use shared::models::{
    BreakdownRequest, BreakdownResponse, Member, Receipt, ReceiptCreate, ReceiptUpdate,
    SiteBooking,
};

/// GET /api/receipts - 获取所有收据（新建在前）
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Receipt>>> {
    let receipts = receipt::find_all(&state.pool).await?;
    Ok(Json(receipts))
}

/// GET /api/receipts/{id} - 获取单条收据
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Receipt>> {
    let row = receipt::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Receipt {id}")))?;
    Ok(Json(row))
}

/// 选定最终收据编号：来单编号仅在未被占用时生效，否则重新生成
async fn resolve_receipt_no(
    state: &ServerState,
    requested: Option<&str>,
    project_name: &str,
) -> AppResult<String> {
    if let Some(requested) = requested.map(str::trim).filter(|s| !s.is_empty()) {
        if !receipt::receipt_no_exists(&state.pool, requested).await? {
            return Ok(requested.to_string());
        }
        tracing::warn!(
            receipt_no = %requested,
            project = %project_name,
            "Requested receipt number already exists, auto-generating a new one"
        );
    }
    Ok(billing::generate_receipt_number(&state.pool, project_name).await?)
}

/// 存储随单提交的 base64 PDF；失败只告警，不阻塞收据创建
fn store_receipt_pdf(state: &ServerState, payload: &ReceiptCreate, receipt_no: &str) -> Option<String> {
    let encoded = payload.pdf_base64.as_deref()?;
    let bytes = match base64::engine::general_purpose::STANDARD.decode(encoded) {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(error = %e, "Receipt PDF base64 decode failed, storing without PDF");
            return None;
        }
    };
    match uploads::store_pdf(
        &state.config,
        "receipts",
        &format!("Receipt_{}", uploads::sanitize_filename(receipt_no)),
        &bytes,
    ) {
        Ok(stored) => Some(stored),
        Err(e) => {
            tracing::warn!(error = %e, "Receipt PDF store failed, storing without PDF");
            None
        }
    }
}

/// 金额格式化（印度分组习惯在前端处理，这里保留两位内的整洁输出）
fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{:.0}", amount)
    } else {
        format!("{:.2}", amount)
    }
}

fn customer_message(row: &Receipt) -> String {
    format!(
        "Dear {name},\n\n\
         Thank you for your payment.\n\n\
         Seniority Number : {seniority}\n\
         Amount Paid      : Rs.{amount}\n\
         Payment Mode     : {mode}\n\
         Transaction ID   : {txn}\n\n\
         ---\n\n\
         Your payment receipt is attached to this email. For any questions please contact our support team.\n\n\
         Best Regards,\n\
         Navanagara House Building Co-operative Society",
        name = row.name,
        seniority = row.seniority_no,
        amount = format_amount(row.amount_paid),
        mode = row.payment_mode.as_deref().unwrap_or("N/A"),
        txn = row.transaction_id.as_deref().unwrap_or("N/A"),
    )
}

fn company_message(row: &Receipt) -> String {
    format!(
        "New Receipt Generated\n\n\
         Member Name      : {name}\n\
         Seniority Number : {seniority}\n\
         Customer Email   : {email}\n\
         Mobile           : {mobile}\n\n\
         ---\n\n\
         Amount Paid      : Rs.{amount}\n\
         Total Received   : Rs.{total}\n\
         Payment Mode     : {mode}\n\
         Payment Type     : {ptype}\n\
         Transaction ID   : {txn}\n\
         Project          : {project}\n\n\
         ---\n\n\
         PDF receipt is attached.\n\
         Navanagara Admin System",
        name = row.name,
        seniority = row.seniority_no,
        email = row.email.as_deref().unwrap_or("Not provided"),
        mobile = row.mobile_number.as_deref().unwrap_or("Not provided"),
        amount = format_amount(row.amount_paid),
        total = format_amount(row.total_received),
        mode = row.payment_mode.as_deref().unwrap_or("N/A"),
        ptype = row.payment_type.as_deref().unwrap_or("N/A"),
        txn = row.transaction_id.as_deref().unwrap_or("N/A"),
        project = row.project_name.as_deref().unwrap_or("N/A"),
    )
}

/// 收据入库后补发邮件：客户一封（有邮箱时）、公司留档一封（有配置时）。
/// 只入 outbox 并交给 worker，请求线程不等待投递。
async fn enqueue_receipt_emails(state: &ServerState, row: &Receipt) {
    let mut queued = 0;

    if let Some(email) = row.email.as_deref().filter(|e| !e.trim().is_empty()) {
        match outbox::enqueue(
            &state.pool,
            email.trim(),
            &format!("Payment Receipt - {}", row.receipt_no),
            &customer_message(row),
            row.pdf_file.as_deref(),
        )
        .await
        {
            Ok(entry) => {
                state.mailer.enqueue(entry.id);
                queued += 1;
            }
            Err(e) => tracing::error!(error = ?e, "Failed to enqueue customer email"),
        }
    } else {
        tracing::warn!(receipt_no = %row.receipt_no, "No customer email provided");
    }

    if let Some(company) = state.config.smtp.company_email.as_deref() {
        match outbox::enqueue(
            &state.pool,
            company,
            &format!("[COMPANY COPY] New Receipt - {}", row.receipt_no),
            &company_message(row),
            row.pdf_file.as_deref(),
        )
        .await
        {
            Ok(entry) => {
                state.mailer.enqueue(entry.id);
                queued += 1;
            }
            Err(e) => tracing::error!(error = ?e, "Failed to enqueue company email"),
        }
    } else {
        tracing::warn!("COMPANY_EMAIL not configured, skipping company copy");
    }

    tracing::info!(receipt_no = %row.receipt_no, queued, "Receipt emails queued");
}

/// POST /api/receipts - 创建收据
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<ReceiptCreate>,
) -> AppResult<Json<AppResponse<Receipt>>> {
    // 1. Seniority number 必填
    let seniority_no = payload.seniority_no.trim().to_string();
    if seniority_no.is_empty() {
        return Err(AppError::validation("Seniority number is required"));
    }
    validate_amount(payload.amount_paid, "amount_paid")?;
    if let Some(ref e) = payload.email {
        validate_email_format(e)?;
    }

    // 2. 会员必须已登记
    let member_row: Member = member::find_by_seniority(&state.pool, &seniority_no)
        .await?
        .ok_or_else(|| {
            AppError::not_found(format!(
                "Member not found with seniority number: {seniority_no}. \
                 Please ensure the member is registered first."
            ))
        })?;

    // 3. 必须已有订地记录
    let booking: SiteBooking = site_booking::find_by_seniority(&state.pool, &seniority_no)
        .await?
        .ok_or_else(|| {
            AppError::not_found(format!(
                "Site booking not found for seniority number: {seniority_no}. \
                 Please create a site booking first."
            ))
        })?;

    // 校验通过，开始组装（此前无任何写入）
    let project_name = payload
        .project_name
        .clone()
        .or_else(|| booking.project_name.clone())
        .unwrap_or_default();

    let receipt_no =
        resolve_receipt_no(&state, payload.receipt_no.as_deref(), &project_name).await?;
    tracing::info!(receipt_no = %receipt_no, project = %project_name, "Using receipt number");

    let pdf_file = store_receipt_pdf(&state, &payload, &receipt_no);

    let amount_paid = payload.amount_paid;
    let data = NewReceipt {
        seniority_no: seniority_no.clone(),
        receipt_no,
        name: payload.name.unwrap_or_else(|| member_row.name.clone()),
        email: payload.email,
        project_name: (!project_name.is_empty()).then_some(project_name),
        date: time::date_to_millis(&payload.date)?,
        amount_paid,
        booking_amount: 0.0,
        mobile_number: Some(member_row.mobile.clone()),
        total_received: amount_paid,
        payment_mode: payload.payment_mode,
        payment_type: payload.payment_type,
        transaction_id: payload.transaction_id,
        site_dimension: payload
            .site_dimension
            .or_else(|| booking.site_dimension.clone()),
        created_by: payload.created_by.unwrap_or_else(|| "Admin".to_string()),
        bank: payload.bank,
        pdf_file,
    };

    // UNIQUE 索引兜底：撞号（含重试耗尽的候选）在这里变成 409
    let created = receipt::create(&state.pool, data).await.map_err(|e| {
        if matches!(e, crate::db::repository::RepoError::Duplicate(_)) {
            AppError::conflict(
                "A receipt with this receipt number already exists. Please use a different receipt number."
                    .to_string(),
            )
        } else {
            AppError::from(e)
        }
    })?;

    tracing::info!(
        receipt_no = %created.receipt_no,
        seniority_no = %created.seniority_no,
        created_by = %current_user.username,
        "Receipt created"
    );

    // 响应立即返回，邮件走 outbox 异步投递
    enqueue_receipt_emails(&state, &created).await;

    Ok(ok_with_message(
        created,
        "Receipt created successfully! Emails are being sent...",
    ))
}

/// PUT /api/receipts/{id} - 更新收据
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ReceiptUpdate>,
) -> AppResult<Json<AppResponse<Receipt>>> {
    if let Some(amount) = payload.amount_paid {
        validate_amount(amount, "amount_paid")?;
    }
    let date = payload
        .date
        .as_deref()
        .map(time::date_to_millis)
        .transpose()?;

    let updated = receipt::update(&state.pool, id, &payload, date).await?;
    Ok(ok_with_message(updated, "Receipt updated successfully"))
}

/// GET /api/receipts/{id}/download - 下载收据 PDF
pub async fn download(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let row = receipt::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Receipt {id}")))?;

    let rel = row
        .pdf_file
        .as_deref()
        .ok_or_else(|| AppError::not_found("PDF not available for this receipt".to_string()))?;

    let path = uploads::resolve(&state.config, rel)?;
    let bytes = std::fs::read(&path)
        .map_err(|e| AppError::internal(format!("Failed to read stored PDF: {e}")))?;

    let filename = format!("Receipt_{}.pdf", uploads::sanitize_filename(&row.receipt_no));
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    ))
}

/// POST /api/receipts/breakdown - 计算打印明细（会费摊销）
///
/// 给 PDF 渲染端用：传入录入行，返回调整后的明细与未吸收差额。
pub async fn breakdown(
    State(state): State<ServerState>,
    Json(payload): Json<BreakdownRequest>,
) -> AppResult<Json<BreakdownResponse>> {
    let seniority_no = payload.seniority_no.trim();
    if seniority_no.is_empty() {
        return Err(AppError::validation("Seniority number is required"));
    }
    // 表单最多三行 Booking Advance
    if payload.advances.len() > 3 {
        return Err(AppError::validation(
            "At most three Booking Advance rows are allowed",
        ));
    }

    member::find_by_seniority(&state.pool, seniority_no)
        .await?
        .ok_or_else(|| {
            AppError::not_found(format!(
                "Member not found with seniority number: {seniority_no}"
            ))
        })?;

    let has_prior_receipt = receipt::exists_for_seniority(&state.pool, seniority_no).await?;

    let total = billing::fee_adjustment::raw_total(&payload.items, &payload.advances);
    let adjusted = billing::adjust_breakdown(has_prior_receipt, &payload.items, &payload.advances);

    if adjusted.applied && adjusted.fee_shortfall > 0.0 {
        // 录入金额不足以摊满会费：明细不注入，打印件缺会费分项
        tracing::warn!(
            seniority_no = %seniority_no,
            shortfall = adjusted.fee_shortfall,
            "Membership fee not fully absorbed, breakdown printed without fee itemization"
        );
    }

    Ok(Json(BreakdownResponse {
        items: adjusted.items,
        advances: adjusted.advances,
        total,
        adjustment_applied: adjusted.applied,
        fee_shortfall: adjusted.fee_shortfall,
    }))
}
