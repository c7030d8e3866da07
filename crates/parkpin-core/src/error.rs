//! # Error Types
//!
//! Domain-specific error types for parkpin-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  parkpin-core errors (this file)                                        │
//! │  ├── CoreError        - Domain rule violations                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  parkpin-db errors (separate crate)                                     │
//! │  └── DbError          - Local cache failures                           │
//! │                                                                         │
//! │  parkpin-sync errors (separate crate)                                   │
//! │  └── SyncError        - Remote store / transport failures              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → SessionError → Frontend           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (pin id, field name, etc.)
//! 3. Errors are enum variants, never String
//! 4. Network degradation is NOT an error here: the session keeps working
//!    offline, so only genuine caller mistakes surface as `CoreError`

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
///
/// These errors represent invalid commands against the parking state.
/// Everything that can be absorbed silently (missing GPS fix, offline
/// network) is handled as a no-op upstream and never reaches this type.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A history entry id that is not in the log.
    ///
    /// ## When This Occurs
    /// - The UI restores from a stale history row after the log rolled over
    /// - A caller passes an id from a different device's log
    #[error("History entry not found: {0}")]
    HistoryEntryNotFound(String),

    /// A photo was attached while no car is pinned.
    ///
    /// ## When This Occurs
    /// - The camera flow races a clear: the photo resolves after the pin
    ///   is already gone
    #[error("No active parking pin")]
    NoActiveParking,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before state transitions run.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// A coordinate component is outside its valid range.
    #[error("{field} out of range: {value}")]
    OutOfRange { field: String, value: f64 },

    /// A coordinate component is NaN or infinite.
    #[error("{field} is not a finite number")]
    NotFinite { field: String },
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
        let err = CoreError::HistoryEntryNotFound("abc-123".to_string());
        assert_eq!(err.to_string(), "History entry not found: abc-123");

        let err = CoreError::NoActiveParking;
        assert_eq!(err.to_string(), "No active parking pin");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "label".to_string(),
        };
        assert_eq!(err.to_string(), "label is required");

        let err = ValidationError::OutOfRange {
            field: "latitude".to_string(),
            value: 91.5,
        };
        assert_eq!(err.to_string(), "latitude out of range: 91.5");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "label".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
