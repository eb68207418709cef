//! Member Portal Handlers
//!
//! 会员令牌只能读自己的数据：seniority number 取自令牌，不收路径参数。

use axum::{Json, extract::{Extension, State}};
use serde::Serialize;

use crate::auth::CurrentUser;
use crate::billing;
use crate::core::ServerState;
use crate::db::repository::{member, receipt, site_booking};
use crate::utils::{AppError, AppResult};
use shared::models::{Member, PaymentSummary, Receipt, SiteBooking};

/// 会员首页数据：登记信息 + 订地 + 有效收据 + 实时付款汇总
#[derive(Debug, Serialize)]
pub struct PortalDashboard {
    pub member: Member,
    pub booking: Option<SiteBooking>,
    /// 只含未取消的收据
    pub receipts: Vec<Receipt>,
    pub summary: Option<PaymentSummary>,
}

/// GET /api/portal/dashboard
pub async fn dashboard(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<PortalDashboard>> {
    // 会员令牌的 username 即 seniority number
    let seniority_no = current_user.username.as_str();

    let member_row = member::find_by_seniority(&state.pool, seniority_no)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Member {seniority_no}")))?;

    let booking = site_booking::find_by_seniority(&state.pool, seniority_no).await?;
    let receipts = receipt::find_by_seniority(&state.pool, seniority_no).await?;

    let summary = booking
        .as_ref()
        .map(|b| billing::summarize(b.total_amount, &receipts));

    Ok(Json(PortalDashboard {
        member: member_row,
        booking,
        receipts: receipts.into_iter().filter(|r| !r.cancelled).collect(),
        summary,
    }))
}
