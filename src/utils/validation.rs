//! Input validation utilities

use once_cell::sync::Lazy;
use regex::Regex;

/// US employer identification number, with or without the dash
static EIN_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{2}-?\d{7}$").unwrap());

/// Loose phone number: digits plus common separators
static PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9][0-9 ().-]{5,18}[0-9]$").unwrap());

static USERNAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9_.@+-]*$").unwrap());

/// Validate an employer identification number
pub fn validate_ein(ein: &str) -> bool {
    EIN_REGEX.is_match(ein.trim())
}

/// Validate a phone number
pub fn validate_phone(phone: &str) -> bool {
    let phone = phone.trim();
    phone.len() <= 20 && PHONE_REGEX.is_match(phone)
}

/// Validate a login name
pub fn validate_username(name: &str) -> bool {
    !name.is_empty() && name.len() <= 150 && USERNAME_REGEX.is_match(name)
}

/// Reduce an uploaded file name to a safe, flat name
///
/// Path separators and anything outside `[A-Za-z0-9._-]` become `_`, leading
/// dots are dropped so the result can never be hidden or escape its directory.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or("");
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    let mut cleaned: String = cleaned.chars().take(100).collect();
    if cleaned.is_empty() {
        cleaned = "upload".to_string();
    }
    cleaned
}

/// Validate phone numbers in `validator` derives
pub fn phone_validator(phone: &str) -> Result<(), validator::ValidationError> {
    if validate_phone(phone) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("phone"))
    }
}

/// Validate EINs in `validator` derives
pub fn ein_validator(ein: &str) -> Result<(), validator::ValidationError> {
    if validate_ein(ein) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("ein"))
    }
}
