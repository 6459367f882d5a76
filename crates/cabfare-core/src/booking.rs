//! # Booking Form State
//!
//! Models the outstation booking form and its driver allowance field.
//!
//! ## Allowance Field
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Allowance Field States                               │
//! │                                                                         │
//! │  Form Action              Auto { derived }          Manual { value }    │
//! │  ───────────              ────────────────          ────────────────    │
//! │                                                                         │
//! │  select_vehicle() ──────► derived recomputed        untouched           │
//! │  set_days() ────────────► derived recomputed        untouched           │
//! │  override_allowance(v) ─► becomes Manual { v }      value = v           │
//! │  reset_allowance() ─────► recomputed                becomes Auto        │
//! │                                                                         │
//! │  "User typed 0" is Manual { 0 }, never confused with "untouched".       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust
//! use cabfare_core::booking::{AllowanceField, BookingForm};
//! use cabfare_core::money::Money;
//! use cabfare_core::rates::RateTable;
//!
//! let rates = RateTable::default();
//! let mut form = BookingForm::new(&rates);
//! form.select_vehicle("Toyota Innova").unwrap();
//! form.set_days(3).unwrap();
//! assert_eq!(form.allowance().value(), Money::from_rupees(1800));
//!
//! form.override_allowance(Money::from_rupees(1000)).unwrap();
//! form.set_days(5).unwrap();
//! assert_eq!(
//!     *form.allowance(),
//!     AllowanceField::Manual { value: Money::from_rupees(1000) }
//! );
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::engine::{auto_driver_allowance, compute_fare};
use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::rates::RateTable;
use crate::types::{FareBreakdown, TripRequest};
use crate::validation::{
    validate_allowance_override, validate_days, validate_distance_km, validate_model_name,
    ValidationResult,
};
use crate::vehicle::{classify_model_name, ModelMatch, VehicleCategory};

// =============================================================================
// Allowance Field
// =============================================================================

/// The driver allowance input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AllowanceField {
    /// Filled in from the vehicle's tier and the trip length.
    Auto { derived: Money },
    /// Typed by the user. Never recomputed.
    Manual { value: Money },
}

impl AllowanceField {
    /// The amount currently shown in the field.
    pub const fn value(&self) -> Money {
        match self {
            AllowanceField::Auto { derived } => *derived,
            AllowanceField::Manual { value } => *value,
        }
    }

    pub const fn is_manual(&self) -> bool {
        matches!(self, AllowanceField::Manual { .. })
    }

    /// The value to send as `driver_allowance_override`, if any.
    pub const fn override_value(&self) -> Option<Money> {
        match self {
            AllowanceField::Auto { .. } => None,
            AllowanceField::Manual { value } => Some(*value),
        }
    }
}

// =============================================================================
// Booking Form
// =============================================================================

/// Round-trip booking form state.
///
/// ## Invariants
/// - `days` is always between 1 and MAX_TRIP_DAYS
/// - While the allowance is `Auto`, `derived` matches the current vehicle
///   and day count
#[derive(Debug, Clone)]
pub struct BookingForm<'a> {
    rates: &'a RateTable,
    vehicle_model: Option<String>,
    model_match: ModelMatch,
    days: u32,
    distance_km: Option<f64>,
    crosses_state_border: bool,
    allowance: AllowanceField,
}

/// Serializable view of the form, for the frontend.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct BookingSnapshot {
    pub vehicle_model: Option<String>,
    pub vehicle_category: VehicleCategory,
    /// False when the model name matched no keyword and the default tier is in use.
    pub category_matched: bool,
    pub days: u32,
    pub distance_km: Option<f64>,
    pub crosses_state_border: bool,
    pub allowance: AllowanceField,
}

impl<'a> BookingForm<'a> {
    /// An empty form: no vehicle yet (default tier), one day.
    pub fn new(rates: &'a RateTable) -> Self {
        let mut form = BookingForm {
            rates,
            vehicle_model: None,
            model_match: ModelMatch::Unmatched,
            days: 1,
            distance_km: None,
            crosses_state_border: false,
            allowance: AllowanceField::Auto {
                derived: Money::zero(),
            },
        };
        form.recompute_allowance();
        form
    }

    /// Selects a vehicle by its dropdown label.
    ///
    /// Returns the classification so the caller can flag a default-tier match.
    pub fn select_vehicle(&mut self, model_name: &str) -> ValidationResult<ModelMatch> {
        let name = validate_model_name(model_name)?;
        self.model_match = classify_model_name(&name);
        self.vehicle_model = Some(name);
        self.recompute_allowance();
        Ok(self.model_match)
    }

    /// Selects a structured category directly.
    pub fn select_category(&mut self, category: VehicleCategory) {
        self.model_match = ModelMatch::Matched(category);
        self.vehicle_model = None;
        self.recompute_allowance();
    }

    pub fn set_days(&mut self, days: u32) -> ValidationResult<()> {
        self.days = validate_days(Some(days))?;
        self.recompute_allowance();
        Ok(())
    }

    pub fn set_distance_km(&mut self, km: f64) -> ValidationResult<()> {
        validate_distance_km(Some(km))?;
        self.distance_km = Some(km);
        Ok(())
    }

    pub fn set_crosses_state_border(&mut self, crosses: bool) {
        self.crosses_state_border = crosses;
    }

    /// Switches the allowance to a manual value. Zero is allowed.
    pub fn override_allowance(&mut self, value: Money) -> ValidationResult<()> {
        validate_allowance_override(Some(value))?;
        self.allowance = AllowanceField::Manual { value };
        Ok(())
    }

    /// Returns the allowance to auto mode and recomputes it.
    pub fn reset_allowance(&mut self) {
        self.allowance = AllowanceField::Auto {
            derived: self.derived_allowance(),
        };
    }

    pub fn allowance(&self) -> &AllowanceField {
        &self.allowance
    }

    pub fn category(&self) -> VehicleCategory {
        self.model_match.resolve()
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    pub fn snapshot(&self) -> BookingSnapshot {
        BookingSnapshot {
            vehicle_model: self.vehicle_model.clone(),
            vehicle_category: self.category(),
            category_matched: self.model_match.is_matched(),
            days: self.days,
            distance_km: self.distance_km,
            crosses_state_border: self.crosses_state_border,
            allowance: self.allowance,
        }
    }

    /// Builds the round-trip request the form describes.
    pub fn to_request(&self) -> ValidationResult<TripRequest> {
        let distance_km = self.distance_km.ok_or_else(|| ValidationError::Required {
            field: "distance_km".to_string(),
        })?;

        let mut request = TripRequest::round_trip(
            distance_km,
            self.days,
            self.category(),
            self.crosses_state_border,
        );
        request.driver_allowance_override = self.allowance.override_value();
        Ok(request)
    }

    /// Prices the form's trip.
    pub fn quote(&self) -> CoreResult<FareBreakdown> {
        let request = self.to_request()?;
        compute_fare(self.rates, &request)
    }

    fn derived_allowance(&self) -> Money {
        auto_driver_allowance(self.rates, self.category(), self.days)
    }

    fn recompute_allowance(&mut self) {
        if let AllowanceField::Auto { .. } = self.allowance {
            self.reset_allowance();
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
