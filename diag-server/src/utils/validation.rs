//! Input validation helpers
//!
//! Centralized text length constants and validation functions. SQLite TEXT
//! has no built-in length enforcement, so every handler checks here first.
//! Failures carry the offending field name in `details`.

use chrono::NaiveDate;
use shared::error::{AppError, ErrorCode};
use validator::{ValidateEmail, ValidateUrl};

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: lab, test, package, category, person
pub const MAX_NAME_LEN: usize = 200;

/// Notes and descriptions
pub const MAX_NOTE_LEN: usize = 500;

/// Short identifiers: phone, test code, slug, time slot, blood group
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Passwords (before hashing)
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 128;

/// Report and logo URLs
pub const MAX_URL_LEN: usize = 2048;

pub const MAX_ADDRESS_LEN: usize = 500;

/// Accreditations / service areas per lab
pub const MAX_LIST_ITEMS: usize = 50;

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::invalid_field(field, format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::invalid_field(
            field,
            format!("{field} is too long ({} chars, max {max_len})", value.len()),
        ));
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
        return Err(AppError::invalid_field(
            field,
            format!("{field} is too long ({} chars, max {max_len})", v.len()),
        ));
    }
    Ok(())
}

/// Validate a list of short strings (accreditations, service areas)
pub fn validate_text_list(values: &[String], field: &str) -> Result<(), AppError> {
    if values.len() > MAX_LIST_ITEMS {
        return Err(AppError::invalid_field(
            field,
            format!("{field} has too many entries (max {MAX_LIST_ITEMS})"),
        ));
    }
    for v in values {
        validate_required_text(v, field, MAX_NAME_LEN)?;
    }
    Ok(())
}

/// Trimmed, lower-cased email
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_email(value: &str, field: &str) -> Result<(), AppError> {
    validate_required_text(value, field, MAX_EMAIL_LEN)?;
    if !value.to_owned().validate_email() {
        return Err(AppError::invalid_field(field, format!("{field} must be a valid email")));
    }
    Ok(())
}

pub fn validate_optional_email(value: &Option<String>, field: &str) -> Result<(), AppError> {
    match value {
        Some(v) if !v.is_empty() => validate_email(v, field),
        _ => Ok(()),
    }
}

pub fn validate_url(value: &str, field: &str) -> Result<(), AppError> {
    validate_required_text(value, field, MAX_URL_LEN)?;
    if !value.to_owned().validate_url() {
        return Err(AppError::invalid_field(field, format!("{field} must be a valid URL")));
    }
    Ok(())
}

pub fn validate_optional_url(value: &Option<String>, field: &str) -> Result<(), AppError> {
    match value {
        Some(v) if !v.is_empty() => validate_url(v, field),
        _ => Ok(()),
    }
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::new(ErrorCode::PasswordTooShort).with_detail("field", "password"));
    }
    if password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::invalid_field(
            "password",
            format!("password is too long (max {MAX_PASSWORD_LEN})"),
        ));
    }
    Ok(())
}

pub fn validate_slug(value: &str, field: &str) -> Result<(), AppError> {
    validate_required_text(value, field, MAX_SHORT_TEXT_LEN)?;
    if !shared::util::is_valid_slug(value) {
        return Err(AppError::invalid_field(
            field,
            format!("{field} must be lowercase letters, digits and single hyphens"),
        ));
    }
    Ok(())
}

/// Prices are finite and non-negative
pub fn validate_price(value: f64, field: &str) -> Result<(), AppError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("{field} must be a non-negative amount"),
        )
        .with_detail("field", field));
    }
    Ok(())
}

pub fn validate_rating(value: f64) -> Result<(), AppError> {
    if !value.is_finite() || !(0.0..=5.0).contains(&value) {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            "rating must be between 0 and 5",
        )
        .with_detail("field", "rating"));
    }
    Ok(())
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(value: &str, field: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::invalid_field(field, format!("{field} must be a date (YYYY-MM-DD)")))
}

/// Booking dates may be today or later
pub fn validate_scheduled_date(value: &str, today: NaiveDate) -> Result<NaiveDate, AppError> {
    let date = parse_date(value, "scheduled_date")?;
    if date < today {
        return Err(
            AppError::new(ErrorCode::ScheduledDateInPast).with_detail("field", "scheduled_date")
        );
    }
    Ok(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("Popular Diagnostic", "name", MAX_NAME_LEN).is_ok());
        let err = validate_required_text("   ", "name", MAX_NAME_LEN).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.details.unwrap().get("field").unwrap(), "name");
        assert!(validate_required_text(&"x".repeat(201), "name", MAX_NAME_LEN).is_err());
    }

    #[test]
    fn test_optional_text() {
        assert!(validate_optional_text(&None, "notes", MAX_NOTE_LEN).is_ok());
        assert!(validate_optional_text(&Some("x".repeat(501)), "notes", MAX_NOTE_LEN).is_err());
    }

    #[test]
    fn test_email() {
        assert!(validate_email("lab@example.com", "email").is_ok());
        assert!(validate_email("not-an-email", "email").is_err());
        assert!(validate_optional_email(&Some(String::new()), "contact_email").is_ok());
        assert_eq!(normalize_email("  Pat@Example.COM "), "pat@example.com");
    }

    #[test]
    fn test_url() {
        assert!(validate_url("https://files.example.com/r/1.pdf", "file_url").is_ok());
        let err = validate_url("report.pdf", "file_url").unwrap_err();
        assert_eq!(err.details.unwrap().get("field").unwrap(), "file_url");
    }

    #[test]
    fn test_password() {
        assert_eq!(
            validate_password("short").unwrap_err().code,
            ErrorCode::PasswordTooShort
        );
        assert!(validate_password("long-enough").is_ok());
    }

    #[test]
    fn test_price_and_rating() {
        assert!(validate_price(0.0, "price").is_ok());
        assert!(validate_price(-1.0, "price").is_err());
        assert!(validate_price(f64::NAN, "price").is_err());
        assert!(validate_rating(4.8).is_ok());
        assert!(validate_rating(5.1).is_err());
    }

    #[test]
    fn test_scheduled_date() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        assert!(validate_scheduled_date("2026-03-10", today).is_ok());
        assert!(validate_scheduled_date("2026-04-01", today).is_ok());
        assert_eq!(
            validate_scheduled_date("2026-03-09", today).unwrap_err().code,
            ErrorCode::ScheduledDateInPast
        );
        assert_eq!(
            validate_scheduled_date("10/03/2026", today).unwrap_err().code,
            ErrorCode::ValidationFailed
        );
    }

    #[test]
    fn test_slug() {
        assert!(validate_slug("ibn-sina", "slug").is_ok());
        assert!(validate_slug("Ibn Sina", "slug").is_err());
    }
}
