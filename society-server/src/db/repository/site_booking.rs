//! SiteBooking Repository
//!
//! 一个会员最多一条订地记录；取消走事务：置位 + 级联收据。

use super::{RepoError, RepoResult};
use shared::models::{SiteBooking, SiteBookingUpdate};
use sqlx::SqlitePool;

const BOOKING_SELECT: &str = "SELECT id, seniority_no, name, mobile_number, date, project_name, \
    site_dimension, total_amount, designation, nominees, status, cancelled, cancellation_pdf, \
    cancelled_at, created_at, updated_at FROM site_booking";

/// New booking fields, date already converted to millis, nominees JSON-encoded
#[derive(Debug, Clone)]
pub struct NewSiteBooking {
    pub seniority_no: String,
    pub name: String,
    pub mobile_number: String,
    pub date: i64,
    pub project_name: Option<String>,
    pub site_dimension: Option<String>,
    pub total_amount: f64,
    pub designation: Option<String>,
    pub nominees: String,
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<SiteBooking>> {
    let sql = format!("{BOOKING_SELECT} ORDER BY created_at DESC");
    let rows = sqlx::query_as::<_, SiteBooking>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<SiteBooking>> {
    let sql = format!("{BOOKING_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, SiteBooking>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_seniority(
    pool: &SqlitePool,
    seniority_no: &str,
) -> RepoResult<Option<SiteBooking>> {
    let sql = format!("{BOOKING_SELECT} WHERE seniority_no = ? ORDER BY created_at DESC LIMIT 1");
    let row = sqlx::query_as::<_, SiteBooking>(&sql)
        .bind(seniority_no)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// 同一 seniority number 是否已有订地记录（重复创建检查）
pub async fn exists_for_seniority(pool: &SqlitePool, seniority_no: &str) -> RepoResult<bool> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM site_booking WHERE seniority_no = ?")
            .bind(seniority_no)
            .fetch_one(pool)
            .await?;
    Ok(count > 0)
}

pub async fn create(pool: &SqlitePool, data: NewSiteBooking) -> RepoResult<SiteBooking> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO site_booking (id, seniority_no, name, mobile_number, date, project_name, \
         site_dimension, total_amount, designation, nominees, status, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 'active', ?11, ?11)",
    )
    .bind(id)
    .bind(&data.seniority_no)
    .bind(&data.name)
    .bind(&data.mobile_number)
    .bind(data.date)
    .bind(&data.project_name)
    .bind(&data.site_dimension)
    .bind(data.total_amount)
    .bind(&data.designation)
    .bind(&data.nominees)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create site booking".into()))
}

/// 更新订地记录（COALESCE 保留未提交字段）
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: &SiteBookingUpdate,
    date: Option<i64>,
    nominees_json: Option<String>,
) -> RepoResult<SiteBooking> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE site_booking SET seniority_no = COALESCE(?1, seniority_no), name = COALESCE(?2, name), \
         date = COALESCE(?3, date), project_name = COALESCE(?4, project_name), \
         site_dimension = COALESCE(?5, site_dimension), total_amount = COALESCE(?6, total_amount), \
         designation = COALESCE(?7, designation), nominees = COALESCE(?8, nominees), updated_at = ?9 \
         WHERE id = ?10",
    )
    .bind(&data.seniority_no)
    .bind(&data.name)
    .bind(date)
    .bind(&data.project_name)
    .bind(&data.site_dimension)
    .bind(data.total_amount)
    .bind(&data.designation)
    .bind(nominees_json)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Site booking {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Site booking {id} not found")))
}

/// 取消订地：单向状态转移，附取消文书，级联置位该 seniority number 下的全部收据。
///
/// 事务保证订地与收据的 cancelled 标记一致落盘。
pub async fn cancel(pool: &SqlitePool, id: i64, cancellation_pdf: &str) -> RepoResult<SiteBooking> {
    let booking = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Site booking {id} not found")))?;

    if booking.cancelled {
        return Err(RepoError::Validation(
            "Site booking is already cancelled".into(),
        ));
    }

    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    sqlx::query(
        "UPDATE site_booking SET cancelled = 1, status = 'cancelled', cancellation_pdf = ?1, \
         cancelled_at = ?2, updated_at = ?2 WHERE id = ?3",
    )
    .bind(cancellation_pdf)
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "UPDATE receipt SET cancelled = 1, cancelled_at = ?1, updated_at = ?1 WHERE seniority_no = ?2",
    )
    .bind(now)
    .bind(&booking.seniority_no)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Site booking {id} not found")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::receipt::{self, NewReceipt};

    async fn test_pool() -> (tempfile::TempDir, SqlitePool) {
        let dir = tempfile::tempdir().expect("tempdir");
        let db_path = dir.path().join("test.db");
        let db = DbService::new(&db_path.to_string_lossy())
            .await
            .expect("db init");
        (dir, db.pool)
    }

    fn booking(seniority_no: &str) -> NewSiteBooking {
        NewSiteBooking {
            seniority_no: seniority_no.to_string(),
            name: "Test Member".to_string(),
            mobile_number: "9876543210".to_string(),
            date: shared::util::now_millis(),
            project_name: Some("New City".to_string()),
            site_dimension: Some("30x40".to_string()),
            total_amount: 500_000.0,
            designation: None,
            nominees: "[]".to_string(),
        }
    }

    fn paid_receipt(seniority_no: &str, receipt_no: &str, amount: f64) -> NewReceipt {
        NewReceipt {
            seniority_no: seniority_no.to_string(),
            receipt_no: receipt_no.to_string(),
            name: "Test Member".to_string(),
            email: None,
            project_name: Some("New City".to_string()),
            date: shared::util::now_millis(),
            amount_paid: amount,
            booking_amount: 0.0,
            mobile_number: None,
            total_received: amount,
            payment_mode: Some("Cash".to_string()),
            payment_type: None,
            transaction_id: None,
            site_dimension: None,
            created_by: "Admin".to_string(),
            bank: None,
            pdf_file: None,
        }
    }

    #[tokio::test]
    async fn cancel_cascades_to_receipts() {
        let (_dir, pool) = test_pool().await;
        let created = create(&pool, booking("NCG-010")).await.unwrap();
        receipt::create(&pool, paid_receipt("NCG-010", "NCG-RCP-000001", 150_000.0))
            .await
            .unwrap();
        receipt::create(&pool, paid_receipt("NCG-010", "NCG-RCP-000002", 100_000.0))
            .await
            .unwrap();

        let cancelled = cancel(&pool, created.id, "cancellations/Cancellation_1.pdf")
            .await
            .unwrap();
        assert!(cancelled.cancelled);
        assert_eq!(cancelled.status, "cancelled");
        assert!(cancelled.cancelled_at.is_some());

        let receipts = receipt::find_by_seniority(&pool, "NCG-010").await.unwrap();
        assert_eq!(receipts.len(), 2);
        assert!(receipts.iter().all(|r| r.cancelled));
    }

    #[tokio::test]
    async fn cancel_is_terminal() {
        let (_dir, pool) = test_pool().await;
        let created = create(&pool, booking("NCG-011")).await.unwrap();
        cancel(&pool, created.id, "cancellations/a.pdf").await.unwrap();

        let err = cancel(&pool, created.id, "cancellations/b.pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }

    #[tokio::test]
    async fn duplicate_booking_guard_sees_existing_rows() {
        let (_dir, pool) = test_pool().await;
        assert!(!exists_for_seniority(&pool, "NCG-012").await.unwrap());
        create(&pool, booking("NCG-012")).await.unwrap();
        assert!(exists_for_seniority(&pool, "NCG-012").await.unwrap());
    }
}
