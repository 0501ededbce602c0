//! Validation helpers for DTOs.

use validator::ValidationError;

/// Rejects empty and whitespace-only strings.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Chrono Trigger").is_ok());
        assert!(validate_not_blank(" x ").is_ok());
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank(" \t\n").is_err());
    }
}
