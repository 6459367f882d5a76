//! # Validation Module
//!
//! Turns a flat `TripRequest` into a typed `Trip`.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Booking form (TypeScript)                                    │
//! │  ├── Field presence, numeric inputs                                    │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Deserialization (serde)                                      │
//! │  ├── Unknown service type / category / plan → InvalidFormat            │
//! │  └── Negative day or hour counts can't fit a u32                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: THIS MODULE                                                  │
//! │  ├── Required fields per service                                       │
//! │  ├── Finite, non-negative, bounded distance                            │
//! │  └── Positive, bounded durations                                       │
//! │                                                                         │
//! │  Output: Trip, the only thing the engine prices                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use cabfare_core::types::{Trip, TripRequest};
//! use cabfare_core::validation::validate_trip;
//! use cabfare_core::vehicle::VehicleCategory;
//!
//! let req = TripRequest::one_way(345.0, VehicleCategory::Sedan, true);
//! assert!(matches!(validate_trip(&req), Ok(Trip::OneWay { .. })));
//!
//! let mut missing = req.clone();
//! missing.distance_km = None;
//! assert!(validate_trip(&missing).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Distance, ServiceType, Trip, TripRequest};
use crate::{MAX_AMOUNT, MAX_DISTANCE_KM, MAX_LOCAL_HOURS, MAX_TRIP_DAYS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Trip Validator
// =============================================================================

/// Validates a request and builds the typed trip for its service.
///
/// ## Required Fields
/// | Service            | Required                                        |
/// |--------------------|-------------------------------------------------|
/// | one_way            | distance_km, vehicle_category                   |
/// | round_trip         | distance_km, duration_days, vehicle_category    |
/// | local_hourly       | duration_hours, vehicle_category                |
/// | acting_driver      | acting_driver_plan, duration_days               |
/// | vehicle_relocation | distance_km, vehicle_category, relocation_method|
///
/// Fields that don't apply to the service are ignored.
pub fn validate_trip(req: &TripRequest) -> ValidationResult<Trip> {
    let trip = match req.service_type {
        ServiceType::OneWay => Trip::OneWay {
            distance: validate_distance_km(req.distance_km)?,
            category: require(req.vehicle_category, "vehicle_category")?,
            crosses_state_border: req.crosses_state_border,
        },

        ServiceType::RoundTrip => Trip::RoundTrip {
            distance: validate_distance_km(req.distance_km)?,
            days: validate_days(req.duration_days)?,
            category: require(req.vehicle_category, "vehicle_category")?,
            crosses_state_border: req.crosses_state_border,
            allowance_override: validate_allowance_override(req.driver_allowance_override)?,
        },

        ServiceType::LocalHourly => Trip::LocalHourly {
            hours: validate_hours(req.duration_hours)?,
            category: require(req.vehicle_category, "vehicle_category")?,
        },

        ServiceType::ActingDriver => Trip::ActingDriver {
            plan: require(req.acting_driver_plan, "acting_driver_plan")?,
            days: validate_days(req.duration_days)?,
            includes_food: req.includes_food,
            includes_stay: req.includes_stay,
        },

        ServiceType::VehicleRelocation => Trip::Relocation {
            distance: validate_distance_km(req.distance_km)?,
            category: require(req.vehicle_category, "vehicle_category")?,
            method: require(req.relocation_method, "relocation_method")?,
        },
    };

    Ok(trip)
}

// =============================================================================
// Field Validators
// =============================================================================

fn require<T>(value: Option<T>, field: &str) -> ValidationResult<T> {
    value.ok_or_else(|| ValidationError::Required {
        field: field.to_string(),
    })
}

/// Validates a trip distance.
///
/// ## Rules
/// - Required
/// - Finite and non-negative (zero is allowed)
/// - At most MAX_DISTANCE_KM
///
/// ## Example
/// ```rust
/// use cabfare_core::validation::validate_distance_km;
///
/// assert_eq!(validate_distance_km(Some(100.0)).unwrap().metres(), 100_000);
/// assert!(validate_distance_km(Some(0.0)).is_ok());
/// assert!(validate_distance_km(None).is_err());
/// assert!(validate_distance_km(Some(-5.0)).is_err());
/// assert!(validate_distance_km(Some(f64::NAN)).is_err());
/// ```
pub fn validate_distance_km(km: Option<f64>) -> ValidationResult<Distance> {
    let km = require(km, "distance_km")?;
    let distance = Distance::from_km(km)?;

    if !distance.within_km(MAX_DISTANCE_KM) {
        return Err(ValidationError::OutOfRange {
            field: "distance_km".to_string(),
            min: 0,
            max: MAX_DISTANCE_KM as i64,
        });
    }

    Ok(distance)
}

/// Validates a day count.
///
/// ## Rules
/// - Required
/// - Must be positive (a zero-day booking has nothing to price)
/// - At most MAX_TRIP_DAYS
pub fn validate_days(days: Option<u32>) -> ValidationResult<u32> {
    let days = require(days, "duration_days")?;

    if days == 0 {
        return Err(ValidationError::MustBePositive {
            field: "duration_days".to_string(),
        });
    }

    if days > MAX_TRIP_DAYS {
        return Err(ValidationError::OutOfRange {
            field: "duration_days".to_string(),
            min: 1,
            max: MAX_TRIP_DAYS as i64,
        });
    }

    Ok(days)
}

/// Validates an hour count for a local package.
///
/// ## Rules
/// - Required
/// - Must be positive
/// - At most MAX_LOCAL_HOURS
pub fn validate_hours(hours: Option<u32>) -> ValidationResult<u32> {
    let hours = require(hours, "duration_hours")?;

    if hours == 0 {
        return Err(ValidationError::MustBePositive {
            field: "duration_hours".to_string(),
        });
    }

    if hours > MAX_LOCAL_HOURS {
        return Err(ValidationError::OutOfRange {
            field: "duration_hours".to_string(),
            min: 1,
            max: MAX_LOCAL_HOURS as i64,
        });
    }

    Ok(hours)
}

/// Validates a manual driver allowance. Zero is a legitimate value; the
/// ceiling is MAX_AMOUNT, in rupees.
pub fn validate_allowance_override(value: Option<Money>) -> ValidationResult<Option<Money>> {
    match value {
        Some(amount) if amount.is_negative() => Err(ValidationError::Negative {
            field: "driver_allowance_override".to_string(),
        }),
        Some(amount) if amount > MAX_AMOUNT => Err(ValidationError::OutOfRange {
            field: "driver_allowance_override".to_string(),
            min: 0,
            max: MAX_AMOUNT.rupees(),
        }),
        other => Ok(other),
    }
}

/// Validates a free-text vehicle model name before classification.
///
/// Returns the trimmed name.
pub fn validate_model_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "vehicle_model".to_string(),
        });
    }

    Ok(name.to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================
