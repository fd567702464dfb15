//! Validation utilities for the Inventory Management System
//!
//! Field-level rules live on the input types as `validator` derives; the
//! functions here are the custom rules those derives call, plus helpers for
//! turning a failed validation into a single field message.

use std::borrow::Cow;

use rust_decimal::Decimal;
use validator::{ValidationError, ValidationErrors};

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// Validate a product price is not negative
pub fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if *price < Decimal::ZERO {
        return Err(error("price", "Price cannot be negative"));
    }
    Ok(())
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.len() < 8 {
        return Err(error("password", "Password must be at least 8 characters"));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(error("password", "Password must contain a digit"));
    }
    Ok(())
}

/// Validate a display name is not blank after trimming
pub fn validate_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Name cannot be blank");
    }
    Ok(())
}

/// Pick one field error to report, in field-name order so the choice is stable
pub fn first_error(errors: &ValidationErrors) -> (String, String) {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    fields
        .into_iter()
        .find_map(|(field, errs)| {
            errs.first().map(|e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {}", field));
                (field.to_string(), message)
            })
        })
        .unwrap_or_else(|| ("input".to_string(), "Invalid input".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CategoryInput;
    use validator::Validate;

    #[test]
    fn test_validate_price() {
        assert!(validate_price(&Decimal::ZERO).is_ok());
        assert!(validate_price(&Decimal::new(1999, 2)).is_ok());
        assert!(validate_price(&Decimal::new(-1, 2)).is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("secret123").is_ok());
        assert!(validate_password("short1").is_err());
        assert!(validate_password("nodigitshere").is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Tools").is_ok());
        assert!(validate_name("   ").is_err());
    }

    #[test]
    fn test_first_error_reports_field_and_message() {
        let input = CategoryInput {
            name: String::new(),
        };
        let errors = input.validate().unwrap_err();
        let (field, message) = first_error(&errors);
        assert_eq!(field, "name");
        assert_eq!(message, "Category name must be 1-100 characters");
    }
}
