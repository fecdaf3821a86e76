use crate::utils::error::{InclusionError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: impl ToString, reason: impl Into<String>) -> InclusionError {
    InclusionError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// 只接受 http/https，來源頁面一定是網頁
pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    let url = Url::parse(url_str).map_err(|e| invalid(field_name, url_str, format!("Invalid URL: {}", e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(invalid(field_name, url_str, format!("Unsupported URL scheme: {}", scheme))),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() || path.contains('\0') {
        return Err(invalid(field_name, path, "Data directory must be a non-empty path"));
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field_name, value, "Value cannot be empty or whitespace-only"));
    }
    Ok(())
}

/// 語言代碼必須是兩個 ASCII 字母（例如 NL、FR）
pub fn validate_lang_code(field_name: &str, value: &str) -> Result<()> {
    if value.len() != 2 || !value.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(invalid(field_name, value, "Language code must be two ASCII letters"));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(invalid(field_name, value, format!("Value must be between {} and {}", min, max)));
    }
    Ok(())
}
