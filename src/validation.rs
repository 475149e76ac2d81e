//! Request field validation rules.

use crate::error::AppError;
use regex::Regex;

/// Constraints on one string field of a request body.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldRule {
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<&'static str>,
    /// Whitespace-only values count as missing.
    pub trim_blank: bool,
    /// Values that are well-formed but taken by the router.
    pub reserved: &'static [&'static str],
    /// Message returned instead of the generated one when any check fails.
    pub message: Option<&'static str>,
}

pub const GALLERY_NAME: FieldRule = FieldRule {
    required: true,
    min_length: Some(1),
    max_length: Some(200),
    pattern: None,
    trim_blank: true,
    reserved: &[],
    message: None,
};

pub const GALLERY_SLUG: FieldRule = FieldRule {
    required: true,
    min_length: Some(1),
    max_length: Some(200),
    pattern: Some(r"^[a-z0-9-]+$"),
    trim_blank: true,
    // `GET /api/galleries/reorder` never reaches the slug lookup
    reserved: &["reorder"],
    message: None,
};

pub const NEW_PASSWORD: FieldRule = FieldRule {
    required: true,
    min_length: Some(6),
    max_length: None,
    pattern: None,
    trim_blank: false,
    reserved: &[],
    message: Some("Password must be at least 6 characters"),
};

pub struct RequestValidator;

impl RequestValidator {
    /// Validate one field. Empty strings count as missing for required fields, and so do
    /// whitespace-only ones when the rule trims; lengths are counted in characters.
    pub fn validate(field: &str, value: Option<&str>, rule: &FieldRule) -> Result<(), AppError> {
        let fail = |generated: String| AppError::Validation(rule.message.map(String::from).unwrap_or(generated));
        let blank = |v: &str| if rule.trim_blank { v.trim().is_empty() } else { v.is_empty() };
        let value = match value {
            Some(v) if !blank(v) => v,
            _ if rule.required => return Err(fail(format!("{} is required", field))),
            _ => return Ok(()),
        };
        let len = value.chars().count();
        if let Some(min) = rule.min_length {
            if len < min {
                return Err(fail(format!("{} must be at least {} characters", field, min)));
            }
        }
        if let Some(max) = rule.max_length {
            if len > max {
                return Err(fail(format!("{} must be at most {} characters", field, max)));
            }
        }
        if let Some(pattern) = rule.pattern {
            let re = Regex::new(pattern).map_err(|_| AppError::Internal(format!("invalid pattern for {}", field)))?;
            if !re.is_match(value) {
                return Err(fail(format!("{} does not match required pattern", field)));
            }
        }
        if rule.reserved.contains(&value) {
            return Err(fail(format!("{} '{}' is reserved", field, value)));
        }
        Ok(())
    }

    /// Validate a field only when the request carries it (partial updates).
    pub fn validate_present(field: &str, value: Option<&str>, rule: &FieldRule) -> Result<(), AppError> {
        match value {
            Some(v) => Self::validate(field, Some(v), rule),
            None => Ok(()),
        }
    }
}
