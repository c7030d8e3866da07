//! # Validation Module
//!
//! Input validation utilities for ParkPin.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend                                                     │
//! │  ├── Basic format checks (empty label, length)                         │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Session Command (Rust)                                       │
//! │  └── THIS MODULE: label and coordinate rules                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Sensor intake                                                │
//! │  └── Position samples are range-checked before they are stored;        │
//! │      out-of-range or non-finite samples are dropped, not errors        │
//! │                                                                         │
//! │  A bad GPS sample must never poison the cached state.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use parkpin_core::geo::Coordinates;
//! use parkpin_core::validation::{validate_coordinates, validate_label};
//!
//! validate_label("Office garage").unwrap();
//! validate_coordinates(Coordinates::new(37.77, -122.41)).unwrap();
//! ```

use crate::error::ValidationError;
use crate::geo::Coordinates;
use crate::MAX_LABEL_LENGTH;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Label Validator
// =============================================================================

/// Validates a saved-location label.
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most [`MAX_LABEL_LENGTH`] characters
///
/// ## Example
/// ```rust
/// use parkpin_core::validation::validate_label;
///
/// assert!(validate_label("Office garage").is_ok());
/// assert!(validate_label("   ").is_err());
/// assert!(validate_label("A".repeat(100).as_str()).is_err());
/// ```
pub fn validate_label(label: &str) -> ValidationResult<()> {
    let label = label.trim();

    if label.is_empty() {
        return Err(ValidationError::Required {
            field: "label".to_string(),
        });
    }

    if label.chars().count() > MAX_LABEL_LENGTH {
        return Err(ValidationError::TooLong {
            field: "label".to_string(),
            max: MAX_LABEL_LENGTH,
        });
    }

    Ok(())
}

// =============================================================================
// Coordinate Validator
// =============================================================================

/// Validates a position sample.
///
/// ## Rules
/// - Latitude in [-90, 90], longitude in [-180, 180]
/// - Both components finite (GPS stacks have been seen emitting NaN)
///
/// ## Example
/// ```rust
/// use parkpin_core::geo::Coordinates;
/// use parkpin_core::validation::validate_coordinates;
///
/// assert!(validate_coordinates(Coordinates::new(37.77, -122.41)).is_ok());
/// assert!(validate_coordinates(Coordinates::new(91.0, 0.0)).is_err());
/// ```
pub fn validate_coordinates(position: Coordinates) -> ValidationResult<()> {
    validate_component("latitude", position.lat, 90.0)?;
    validate_component("longitude", position.lng, 180.0)?;
    Ok(())
}

fn validate_component(field: &str, value: f64, bound: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.to_string(),
        });
    }

    if value < -bound || value > bound {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            value,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_labels() {
        assert!(validate_label("Home").is_ok());
        assert!(validate_label("  padded  ").is_ok());
        assert!(validate_label(&"x".repeat(MAX_LABEL_LENGTH)).is_ok());
    }

    #[test]
    fn test_empty_label_is_required_error() {
        let err = validate_label("   ").unwrap_err();
        assert!(matches!(err, ValidationError::Required { .. }));
    }

    #[test]
    fn test_overlong_label_is_rejected() {
        let err = validate_label(&"x".repeat(MAX_LABEL_LENGTH + 1)).unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { max, .. } if max == MAX_LABEL_LENGTH));
    }

    #[test]
    fn test_coordinate_bounds() {
        assert!(validate_coordinates(Coordinates::new(90.0, 180.0)).is_ok());
        assert!(validate_coordinates(Coordinates::new(-90.0, -180.0)).is_ok());
        assert!(validate_coordinates(Coordinates::new(90.0001, 0.0)).is_err());
        assert!(validate_coordinates(Coordinates::new(0.0, -180.5)).is_err());
    }

    #[test]
    fn test_non_finite_coordinates_are_rejected() {
        assert!(validate_coordinates(Coordinates::new(f64::NAN, 0.0)).is_err());
        assert!(validate_coordinates(Coordinates::new(0.0, f64::INFINITY)).is_err());
    }
}
