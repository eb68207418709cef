//! 付款汇总
//!
//! 订地总额 vs 收据累计实收。纯函数，每次读取时重算，不落库。

use shared::models::{PaymentSummary, Receipt};

/// 汇总某个 seniority number 的付款情况
///
/// 已取消的收据不计入实收；多付时 remaining 为负，不做钳制。
pub fn summarize(total_amount: f64, receipts: &[Receipt]) -> PaymentSummary {
    let paid_amount: f64 = receipts
        .iter()
        .filter(|r| !r.cancelled)
        .map(|r| r.amount_paid)
        .sum();

    PaymentSummary {
        total_amount,
        paid_amount,
        remaining_amount: total_amount - paid_amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt(amount_paid: f64, cancelled: bool) -> Receipt {
        Receipt {
            id: shared::util::snowflake_id(),
            seniority_no: "NCG-001".to_string(),
            receipt_no: format!("NCG-RCP-{:06}", (amount_paid as i64) % 999_999),
            name: "Test Member".to_string(),
            email: None,
            project_name: Some("New City".to_string()),
            date: 0,
            amount_paid,
            booking_amount: 0.0,
            mobile_number: None,
            total_received: amount_paid,
            payment_mode: Some("Cash".to_string()),
            payment_type: None,
            transaction_id: None,
            site_dimension: None,
            created_by: "Admin".to_string(),
            bank: None,
            cancelled,
            cancelled_at: cancelled.then(shared::util::now_millis),
            pdf_file: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn cancelled_receipts_are_excluded() {
        let receipts = vec![
            receipt(150_000.0, false),
            receipt(100_000.0, false),
            receipt(50_000.0, true),
        ];
        let summary = summarize(500_000.0, &receipts);

        assert_eq!(summary.total_amount, 500_000.0);
        assert_eq!(summary.paid_amount, 250_000.0);
        assert_eq!(summary.remaining_amount, 250_000.0);
    }

    #[test]
    fn recomputation_is_idempotent() {
        let receipts = vec![receipt(1_000.0, false), receipt(2_000.0, false)];
        let first = summarize(10_000.0, &receipts);
        let second = summarize(10_000.0, &receipts);
        assert_eq!(first, second);
    }

    #[test]
    fn overpayment_goes_negative_unclamped() {
        let receipts = vec![receipt(7_000.0, false)];
        let summary = summarize(5_000.0, &receipts);
        assert_eq!(summary.remaining_amount, -2_000.0);
    }

    #[test]
    fn no_receipts_means_full_amount_remaining() {
        let summary = summarize(5_000.0, &[]);
        assert_eq!(summary.paid_amount, 0.0);
        assert_eq!(summary.remaining_amount, 5_000.0);
    }

    #[test]
    fn cancelling_a_receipt_changes_the_next_computation() {
        let mut receipts = vec![receipt(3_000.0, false), receipt(2_000.0, false)];
        assert_eq!(summarize(10_000.0, &receipts).paid_amount, 5_000.0);

        receipts[1].cancelled = true;
        assert_eq!(summarize(10_000.0, &receipts).paid_amount, 3_000.0);
    }
}
