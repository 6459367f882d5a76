//! # Error Types
//!
//! Domain-specific error types for cabfare-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  cabfare-core errors (this file)                                       │
//! │  ├── CoreError        - What the fare engine reports                   │
//! │  └── ValidationError  - Which field of a TripRequest is malformed      │
//! │                                                                         │
//! │  cabfare-notify errors (separate crate)                                │
//! │  └── NotifyError      - Push delivery failures                         │
//! │                                                                         │
//! │  cabfare-cli errors (binary)                                           │
//! │  └── ConfigError      - Unreadable / invalid rate files                │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError::InvalidRequest → caller            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include the offending field and value in the message
//! 3. Errors are enum variants, never String
//! 4. Pricing is pure: nothing here is retryable

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Errors reported by the fare engine and its helpers.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The trip request is malformed or out of range.
    ///
    /// ## When This Occurs
    /// - Negative or non-finite distance
    /// - Required field missing for the chosen service (distance, days, hours)
    /// - Unknown service type / vehicle category when parsed from text
    ///
    /// ## User Workflow
    /// ```text
    /// Booking form submits { service_type: "one_way" } without distance
    ///      │
    ///      ▼
    /// validate_trip() → ValidationError::Required { field: "distance_km" }
    ///      │
    ///      ▼
    /// CoreError::InvalidRequest
    ///      │
    ///      ▼
    /// UI shows: "distance_km is required"
    /// ```
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] ValidationError),

    /// A vehicle model name matched none of the keyword sets.
    ///
    /// Only the strict classifier reports this. The default classifier
    /// resolves unmatched names to the standard tier instead.
    #[error("Unknown vehicle category for model '{name}'")]
    UnknownCategory { name: String },

    /// The configured rate table breaks one of its own invariants.
    #[error("Invalid rate table: {reason}")]
    InvalidRateTable { reason: String },
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These describe exactly which field of a request was rejected.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing for the chosen service.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Value is NaN or infinite.
    #[error("{field} must be a finite number")]
    NotFinite { field: String },

    /// Invalid format (e.g., unparseable JSON).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in the allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
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
        let err = CoreError::UnknownCategory {
            name: "Hovercraft".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unknown vehicle category for model 'Hovercraft'"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "distance_km".to_string(),
        };
        assert_eq!(err.to_string(), "distance_km is required");

        let err = ValidationError::Negative {
            field: "distance_km".to_string(),
        };
        assert_eq!(err.to_string(), "distance_km must not be negative");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "duration_days".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::InvalidRequest(_)));
        assert_eq!(
            core_err.to_string(),
            "Invalid request: duration_days is required"
        );
    }
}
