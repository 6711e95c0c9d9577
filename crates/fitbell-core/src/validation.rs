//! # Validation Module
//!
//! Presence checks, the only validation fitbell performs.
//!
//! ## Where Checks Run
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Points                                  │
//! │                                                                         │
//! │  Widget form submit                                                    │
//! │  └── every required field non-blank, else stay on the form             │
//! │                                                                         │
//! │  Size chart add                                                        │
//! │  └── category's key fields non-blank                                   │
//! │                                                                         │
//! │  Merchant onboarding                                                   │
//! │  └── email and business name non-blank, slug derivable                 │
//! │                                                                         │
//! │  Config save                                                           │
//! │  └── colors set, option ids present and unique                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Colors are not parsed: any non-blank string is accepted.

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Fails with `Required` when `value` is empty or whitespace.
///
/// ## Example
/// ```rust
/// use fitbell_core::validation::validate_required;
///
/// assert!(validate_required("size", "M").is_ok());
/// assert!(validate_required("size", "   ").is_err());
/// ```
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(())
}

/// Checks each `(field, value)` pair in order and reports the first blank one.
pub fn validate_all_present<'a, I>(pairs: I) -> ValidationResult<()>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    pairs
        .into_iter()
        .try_for_each(|(field, value)| validate_required(field, value))
}

/// Validates merchant onboarding input.
///
/// The business name must produce a non-empty slug, otherwise the merchant
/// would have no public link.
pub fn validate_onboarding(email: &str, business_name: &str) -> ValidationResult<()> {
    validate_required("email", email)?;
    validate_required("businessName", business_name)?;

    if crate::merchant::slugify(business_name).is_empty() {
        return Err(ValidationError::required("businessSlug"));
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
