//! 收据编号生成
//!
//! 每个项目一条独立序列：`NCG-RCP-000001`、`NCS-RCP-000001`。
//! 计数 + 存在性检查的重试是尽力而为 — check 与 insert 之间没有锁，
//! 真正的唯一性由 receipt 表的 UNIQUE 索引兜底。

use sqlx::SqlitePool;

use crate::db::repository::{RepoResult, receipt};

/// 项目名 → 编号前缀代码
const PROJECT_CODES: [(&str, &str); 2] = [("New City", "NCG"), ("New City 1", "NCS")];

/// 未登记项目的兜底代码
const FALLBACK_CODE: &str = "RCP";

/// 撞号重试上限；耗尽后返回最后一个候选编号，由唯一索引拒绝
const MAX_ATTEMPTS: i64 = 100;

/// 项目名映射到前缀代码
pub fn project_code(project_name: &str) -> &'static str {
    PROJECT_CODES
        .iter()
        .find(|(name, _)| *name == project_name)
        .map(|(_, code)| *code)
        .unwrap_or(FALLBACK_CODE)
}

/// 项目完整前缀，如 "NCG-RCP-"
pub fn receipt_prefix(project_name: &str) -> String {
    format!("{}-RCP-", project_code(project_name))
}

/// 生成项目内顺延的收据编号
///
/// 算法：统计该前缀下已有收据数，候选 = 前缀 + 六位零填充 (count+1)；
/// 候选已存在时逐一加一重试，最多 [`MAX_ATTEMPTS`] 次。
/// 只读：在调用方持久化收据之前不产生任何写入。
pub async fn generate_receipt_number(pool: &SqlitePool, project_name: &str) -> RepoResult<String> {
    let prefix = receipt_prefix(project_name);
    let count = receipt::count_with_prefix(pool, &prefix).await?;

    let mut attempts: i64 = 0;
    let mut candidate;
    loop {
        candidate = format!("{prefix}{:06}", count + 1 + attempts);
        if !receipt::receipt_no_exists(pool, &candidate).await? {
            break;
        }
        attempts += 1;
        if attempts >= MAX_ATTEMPTS {
            // 重试耗尽：候选仍可能重复，插入时由 UNIQUE 索引拒绝
            tracing::warn!(
                candidate = %candidate,
                attempts = MAX_ATTEMPTS,
                "Receipt number retries exhausted, returning possibly-duplicate candidate"
            );
            break;
        }
    }

    Ok(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::receipt::NewReceipt;

    fn new_receipt(seniority_no: &str, receipt_no: &str, project: &str) -> NewReceipt {
        NewReceipt {
            seniority_no: seniority_no.to_string(),
            receipt_no: receipt_no.to_string(),
            name: "Test Member".to_string(),
            email: None,
            project_name: Some(project.to_string()),
            date: shared::util::now_millis(),
            amount_paid: 1000.0,
            booking_amount: 0.0,
            mobile_number: None,
            total_received: 1000.0,
            payment_mode: Some("Cash".to_string()),
            payment_type: None,
            transaction_id: None,
            site_dimension: None,
            created_by: "Admin".to_string(),
            bank: None,
            pdf_file: None,
        }
    }

    async fn test_pool() -> (tempfile::TempDir, sqlx::SqlitePool) {
        let dir = tempfile::tempdir().expect("tempdir");
        let db_path = dir.path().join("test.db");
        let db = DbService::new(&db_path.to_string_lossy())
            .await
            .expect("db init");
        (dir, db.pool)
    }

    #[test]
    fn known_projects_map_to_their_codes() {
        assert_eq!(project_code("New City"), "NCG");
        assert_eq!(project_code("New City 1"), "NCS");
        assert_eq!(project_code("Somewhere Else"), "RCP");
        assert_eq!(receipt_prefix("New City"), "NCG-RCP-");
    }

    #[tokio::test]
    async fn first_number_of_a_project_is_000001() {
        let (_dir, pool) = test_pool().await;
        let no = generate_receipt_number(&pool, "New City").await.unwrap();
        assert_eq!(no, "NCG-RCP-000001");
    }

    #[tokio::test]
    async fn sequences_are_independent_per_project() {
        let (_dir, pool) = test_pool().await;

        let first = generate_receipt_number(&pool, "New City").await.unwrap();
        receipt::create(&pool, new_receipt("NCG-001", &first, "New City"))
            .await
            .unwrap();

        // NCS counter is untouched by NCG receipts
        let other = generate_receipt_number(&pool, "New City 1").await.unwrap();
        assert_eq!(other, "NCS-RCP-000001");

        let second = generate_receipt_number(&pool, "New City").await.unwrap();
        assert_eq!(second, "NCG-RCP-000002");
    }

    #[tokio::test]
    async fn numeric_suffix_strictly_increases_within_a_project() {
        let (_dir, pool) = test_pool().await;
        let mut last = 0i64;
        for i in 0..5 {
            let no = generate_receipt_number(&pool, "New City").await.unwrap();
            let suffix: i64 = no.trim_start_matches("NCG-RCP-").parse().unwrap();
            assert!(suffix > last, "suffix {suffix} not above {last}");
            last = suffix;
            receipt::create(&pool, new_receipt(&format!("NCG-{i:03}"), &no, "New City"))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn collision_with_existing_number_is_skipped() {
        let (_dir, pool) = test_pool().await;

        // Simulate a manually issued number occupying the next slot
        receipt::create(&pool, new_receipt("NCG-001", "NCG-RCP-000001", "New City"))
            .await
            .unwrap();
        receipt::create(&pool, new_receipt("NCG-002", "NCG-RCP-000003", "New City"))
            .await
            .unwrap();

        // count = 2, candidate 000003 already exists, retry lands on 000004
        let no = generate_receipt_number(&pool, "New City").await.unwrap();
        assert_eq!(no, "NCG-RCP-000004");
    }

    #[tokio::test]
    async fn duplicate_number_is_rejected_by_unique_index() {
        let (_dir, pool) = test_pool().await;
        receipt::create(&pool, new_receipt("NCG-001", "NCG-RCP-000001", "New City"))
            .await
            .unwrap();

        let err = receipt::create(&pool, new_receipt("NCG-002", "NCG-RCP-000001", "New City"))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::db::repository::RepoError::Duplicate(_)));
    }
}
