//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! SQLite TEXT has no built-in length enforcement, so limits live here.

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: member, admin, nominee, bank, etc.
pub const MAX_NAME_LEN: usize = 200;

/// Short identifiers: seniority number, mobile, transaction id, etc.
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Addresses and notes
pub const MAX_ADDRESS_LEN: usize = 500;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

// ── Validation helpers (CRUD handlers) ──────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Validate that an amount is a finite, non-negative number.
pub fn validate_amount(value: f64, field: &str) -> Result<(), AppError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::validation(format!(
            "{field} must be a non-negative amount"
        )));
    }
    Ok(())
}

/// 简单的邮箱格式检查（非空 + 单个 @ + 点分域名）
pub fn validate_email_format(email: &str) -> Result<(), AppError> {
    let valid = email.len() <= MAX_EMAIL_LEN
        && email.split('@').count() == 2
        && email
            .split('@')
            .nth(1)
            .is_some_and(|domain| domain.contains('.') && !domain.starts_with('.'))
        && !email.starts_with('@')
        && !email.contains(char::is_whitespace);
    if !valid {
        return Err(AppError::validation(format!(
            "Invalid email address: {email}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_rejects_empty_and_oversized() {
        assert!(validate_required_text("  ", "name", MAX_NAME_LEN).is_err());
        assert!(validate_required_text(&"x".repeat(300), "name", MAX_NAME_LEN).is_err());
        assert!(validate_required_text("Navanagara", "name", MAX_NAME_LEN).is_ok());
    }

    #[test]
    fn email_format_checks() {
        assert!(validate_email_format("member@example.com").is_ok());
        assert!(validate_email_format("no-at-sign").is_err());
        assert!(validate_email_format("two@@ats.com").is_err());
        assert!(validate_email_format("spaced @mail.com").is_err());
    }

    #[test]
    fn amount_rejects_negative_and_nan() {
        assert!(validate_amount(-1.0, "amount").is_err());
        assert!(validate_amount(f64::NAN, "amount").is_err());
        assert!(validate_amount(0.0, "amount").is_ok());
        assert!(validate_amount(2500.0, "amount").is_ok());
    }
}
