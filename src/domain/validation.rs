use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Required { field: &'static str },
    TooLong { field: &'static str, max: usize, actual: usize },
    OutOfRange { field: &'static str, detail: String },
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Required { field } => field,
            ValidationError::TooLong { field, .. } => field,
            ValidationError::OutOfRange { field, .. } => field,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Required { field } => write!(f, "{} is required", field),
            ValidationError::TooLong { field, max, actual } => write!(
                f,
                "{} must be at most {} characters (got {})",
                field, max, actual
            ),
            ValidationError::OutOfRange { field, detail } => write!(f, "{} {}", field, detail),
        }
    }
}

impl Error for ValidationError {}

pub fn required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required { field });
    }
    Ok(())
}

pub fn max_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong { field, max, actual });
    }
    Ok(())
}

pub fn optional_max_len(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<(), ValidationError> {
    match value {
        Some(value) => max_len(field, value, max),
        None => Ok(()),
    }
}

/// Required and bounded, the common shape for short text fields.
pub fn required_max_len(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ValidationError> {
    required(field, value)?;
    max_len(field, value, max)
}

pub fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_blank_values() {
        assert!(required("city", "Seattle").is_ok());
        let err = required("city", "   ").expect_err("blank should fail");
        assert_eq!(err, ValidationError::Required { field: "city" });
        assert_eq!(err.to_string(), "city is required");
    }

    #[test]
    fn max_len_counts_characters_not_bytes() {
        assert!(max_len("state", "WA", 2).is_ok());
        assert!(max_len("contact_name", "Peña", 4).is_ok());
        let err = max_len("state", "WAS", 2).expect_err("three chars should fail");
        assert_eq!(err.field(), "state");
        assert!(err.to_string().contains("at most 2"));
    }

    #[test]
    fn optional_max_len_skips_missing_values() {
        assert!(optional_max_len("note", None, 1).is_ok());
        assert!(optional_max_len("note", Some("ab"), 1).is_err());
    }

    #[test]
    fn non_empty_trims_and_drops_blanks() {
        assert_eq!(non_empty("  98122 "), Some("98122".to_string()));
        assert_eq!(non_empty("   "), None);
    }
}
