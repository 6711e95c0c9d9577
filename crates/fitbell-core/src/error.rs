//! # Error Types
//!
//! Domain-specific error types for fitbell-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  fitbell-core errors (this file)                                       │
//! │  ├── CoreError        - Merchant-side failures (auth, unknown option)  │
//! │  ├── ValidationError  - Presence checks                                │
//! │  └── WidgetError      - Rejected shopper actions (state unchanged)     │
//! │                                                                         │
//! │  fitbell-db errors (separate crate)                                    │
//! │  └── DbError          - Storage failures                               │
//! │                                                                         │
//! │  Flow: ValidationError → WidgetError / CoreError → DbError → caller    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! An unresolved slug is deliberately absent here: the resolver degrades to
//! the default configuration instead of failing.

use thiserror::Error;

use crate::widget::WidgetStep;

// =============================================================================
// Core Error
// =============================================================================

/// Merchant-side errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A mutation was attempted without a bound merchant identity.
    ///
    /// ## When This Occurs
    /// - Saving a configuration from an anonymous session
    /// - Adding or removing size entries while signed out
    ///
    /// Surfaced to the caller, never retried.
    #[error("No merchant is signed in")]
    NotAuthenticated,

    /// Help option id does not exist in the configuration.
    #[error("Help option not found: {0}")]
    OptionNotFound(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Widget action rejected.
    #[error("Widget error: {0}")]
    Widget(#[from] WidgetError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Presence and range check failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Duplicate identifier inside one collection.
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// Numeric setting outside its accepted range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: u64, max: u64 },

    /// Entry shape does not belong to the requested size category.
    #[error("entry for {found} cannot be stored under {expected}")]
    CategoryMismatch { expected: String, found: String },
}

impl ValidationError {
    /// Creates a Required error for the given field name.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }
}

// =============================================================================
// Widget Error
// =============================================================================

/// Shopper actions the widget refuses.
///
/// Every variant means the session is left exactly as it was and no event
/// is emitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WidgetError {
    /// Option is disabled or absent from the configuration.
    #[error("Help option {option_id} is not available")]
    OptionUnavailable { option_id: String },

    /// A required form field is empty.
    #[error("Form is incomplete: {0}")]
    ValidationFailed(#[from] ValidationError),

    /// Action has no transition from the current step.
    #[error("{action} is not possible at step {step:?}")]
    InvalidAction { step: WidgetStep, action: String },

    /// Field does not belong to the form currently shown.
    #[error("{field} is not part of the current form")]
    FieldNotInForm { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CoreError::NotAuthenticated.to_string(),
            "No merchant is signed in"
        );

        let err = WidgetError::OptionUnavailable {
            option_id: "2".to_string(),
        };
        assert_eq!(err.to_string(), "Help option 2 is not available");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::required("needed_size");
        assert_eq!(err.to_string(), "needed_size is required");
    }

    #[test]
    fn test_validation_converts_to_widget_and_core_error() {
        let widget_err: WidgetError = ValidationError::required("region").into();
        assert!(matches!(widget_err, WidgetError::ValidationFailed(_)));

        let core_err: CoreError = widget_err.into();
        assert!(matches!(core_err, CoreError::Widget(_)));
    }
}
