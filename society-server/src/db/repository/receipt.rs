//! Receipt Repository
//!
//! receipt_no 带 UNIQUE 索引：编号生成器撞号重试耗尽后，
//! 插入时的唯一约束是最后一道防线（上抛 Duplicate）。

use super::{RepoError, RepoResult};
use shared::models::{Receipt, ReceiptUpdate};
use sqlx::SqlitePool;

const RECEIPT_SELECT: &str = "SELECT id, seniority_no, receipt_no, name, email, project_name, \
    date, amount_paid, booking_amount, mobile_number, total_received, payment_mode, payment_type, \
    transaction_id, site_dimension, created_by, bank, cancelled, cancelled_at, pdf_file, \
    created_at, updated_at FROM receipt";

/// New receipt fields, date already converted to millis
#[derive(Debug, Clone)]
pub struct NewReceipt {
    pub seniority_no: String,
    pub receipt_no: String,
    pub name: String,
    pub email: Option<String>,
    pub project_name: Option<String>,
    pub date: i64,
    pub amount_paid: f64,
    pub booking_amount: f64,
    pub mobile_number: Option<String>,
    pub total_received: f64,
    pub payment_mode: Option<String>,
    pub payment_type: Option<String>,
    pub transaction_id: Option<String>,
    pub site_dimension: Option<String>,
    pub created_by: String,
    pub bank: Option<String>,
    pub pdf_file: Option<String>,
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Receipt>> {
    let sql = format!("{RECEIPT_SELECT} ORDER BY created_at DESC");
    let rows = sqlx::query_as::<_, Receipt>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Receipt>> {
    let sql = format!("{RECEIPT_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Receipt>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_seniority(pool: &SqlitePool, seniority_no: &str) -> RepoResult<Vec<Receipt>> {
    let sql = format!("{RECEIPT_SELECT} WHERE seniority_no = ? ORDER BY created_at ASC");
    let rows = sqlx::query_as::<_, Receipt>(&sql)
        .bind(seniority_no)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// 该会员是否已有任何收据（首付判定用，含已取消的收据）
pub async fn exists_for_seniority(pool: &SqlitePool, seniority_no: &str) -> RepoResult<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM receipt WHERE seniority_no = ?")
        .bind(seniority_no)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

/// 指定编号是否已被占用
pub async fn receipt_no_exists(pool: &SqlitePool, receipt_no: &str) -> RepoResult<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM receipt WHERE receipt_no = ?")
        .bind(receipt_no)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

/// 统计某项目前缀下已有的收据数量（编号生成的计数基准）
pub async fn count_with_prefix(pool: &SqlitePool, prefix: &str) -> RepoResult<i64> {
    // LIKE pattern: prefix itself contains no wildcard characters
    let pattern = format!("{prefix}%");
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM receipt WHERE receipt_no LIKE ?")
        .bind(pattern)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn create(pool: &SqlitePool, data: NewReceipt) -> RepoResult<Receipt> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO receipt (id, seniority_no, receipt_no, name, email, project_name, date, \
         amount_paid, booking_amount, mobile_number, total_received, payment_mode, payment_type, \
         transaction_id, site_dimension, created_by, bank, pdf_file, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?19)",
    )
    .bind(id)
    .bind(&data.seniority_no)
    .bind(&data.receipt_no)
    .bind(&data.name)
    .bind(&data.email)
    .bind(&data.project_name)
    .bind(data.date)
    .bind(data.amount_paid)
    .bind(data.booking_amount)
    .bind(&data.mobile_number)
    .bind(data.total_received)
    .bind(&data.payment_mode)
    .bind(&data.payment_type)
    .bind(&data.transaction_id)
    .bind(&data.site_dimension)
    .bind(&data.created_by)
    .bind(&data.bank)
    .bind(&data.pdf_file)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create receipt".into()))
}

/// 更新收据（COALESCE 保留未提交字段）
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: &ReceiptUpdate,
    date: Option<i64>,
) -> RepoResult<Receipt> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE receipt SET name = COALESCE(?1, name), email = COALESCE(?2, email), \
         project_name = COALESCE(?3, project_name), date = COALESCE(?4, date), \
         amount_paid = COALESCE(?5, amount_paid), payment_mode = COALESCE(?6, payment_mode), \
         payment_type = COALESCE(?7, payment_type), transaction_id = COALESCE(?8, transaction_id), \
         site_dimension = COALESCE(?9, site_dimension), bank = COALESCE(?10, bank), updated_at = ?11 \
         WHERE id = ?12",
    )
    .bind(&data.name)
    .bind(&data.email)
    .bind(&data.project_name)
    .bind(date)
    .bind(data.amount_paid)
    .bind(&data.payment_mode)
    .bind(&data.payment_type)
    .bind(&data.transaction_id)
    .bind(&data.site_dimension)
    .bind(&data.bank)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Receipt {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Receipt {id} not found")))
}

/// 订地记录字段变更时同步收据（propagation from SiteBooking updates）
pub async fn apply_booking_propagation(
    pool: &SqlitePool,
    old_seniority_no: &str,
    new_seniority_no: Option<&str>,
    new_name: Option<&str>,
    new_project_name: Option<&str>,
    new_site_dimension: Option<&str>,
) -> RepoResult<()> {
    if new_seniority_no.is_none()
        && new_name.is_none()
        && new_project_name.is_none()
        && new_site_dimension.is_none()
    {
        return Ok(());
    }
    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE receipt SET seniority_no = COALESCE(?1, seniority_no), name = COALESCE(?2, name), \
         project_name = COALESCE(?3, project_name), site_dimension = COALESCE(?4, site_dimension), \
         updated_at = ?5 WHERE seniority_no = ?6",
    )
    .bind(new_seniority_no)
    .bind(new_name)
    .bind(new_project_name)
    .bind(new_site_dimension)
    .bind(now)
    .bind(old_seniority_no)
    .execute(pool)
    .await?;
    Ok(())
}
