//! 时间工具函数
//!
//! 所有日期→时间戳转换统一在 API handler 层完成，
//! repository 层只接收 `i64` Unix millis。

use chrono::NaiveDate;

use super::{AppError, AppResult};

/// 解析日期字符串 (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// 日期字符串 (YYYY-MM-DD) → Unix millis (UTC 当日零点)
pub fn date_to_millis(date: &str) -> AppResult<i64> {
    let parsed = parse_date(date)?;
    let naive = parsed
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| AppError::internal("Invalid midnight timestamp".to_string()))?;
    Ok(naive.and_utc().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_dates() {
        assert!(parse_date("2025-03-14").is_ok());
        assert!(parse_date("14-03-2025").is_err());
        assert!(parse_date("2025-13-40").is_err());
    }

    #[test]
    fn date_to_millis_is_utc_midnight() {
        // 1970-01-02 00:00:00 UTC
        assert_eq!(date_to_millis("1970-01-02").unwrap(), 86_400_000);
    }
}
