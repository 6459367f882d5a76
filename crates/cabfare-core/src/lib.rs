//! # cabfare-core: Pure Fare Rules for Cabfare
//!
//! This crate turns a trip request into a priced fare breakdown. It contains
//! all pricing logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cabfare Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Booking form (TypeScript, via ts-rs)               │   │
//! │  │    Vehicle ──► Days ──► Allowance ──► Quote                     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON                                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ cabfare-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐         │   │
//! │  │   │  types   │ │  rates   │ │  engine  │ │ booking  │         │   │
//! │  │   │ Request  │ │RateTable │ │ formulas │ │ Auto/    │         │   │
//! │  │   │ Breakdown│ │          │ │          │ │ Manual   │         │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘         │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO FILES • NO NETWORK • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │   cabfare-cli (rate files, verification report, push sender)    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Trip requests, validated trips, fare breakdowns
//! - [`money`] - Money type in integer paise
//! - [`vehicle`] - Vehicle categories, allowance tiers, model-name classifier
//! - [`rates`] - The rate table
//! - [`validation`] - Request validation
//! - [`engine`] - Fare formulas per service
//! - [`booking`] - Booking form state with the auto/manual allowance field
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use cabfare_core::{compute_fare, ActingDriverPlan, RateTable, TripRequest};
//!
//! let rates = RateTable::default();
//! let req = TripRequest::acting_driver(ActingDriverPlan::Outstation, 2, false, false);
//!
//! let fare = compute_fare(&rates, &req).unwrap();
//! assert_eq!(fare.total.rupees(), 4700);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod booking;
pub mod engine;
pub mod error;
pub mod money;
pub mod rates;
pub mod types;
pub mod validation;
pub mod vehicle;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use booking::{AllowanceField, BookingForm};
pub use engine::compute_fare;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use rates::RateTable;
pub use types::*;
pub use vehicle::{classify_model_name, AllowanceTier, ModelMatch, VehicleCategory};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Longest trip, in days, the form accepts for round trips and acting drivers.
pub const MAX_TRIP_DAYS: u32 = 90;

/// Longest local-hourly booking, in hours.
pub const MAX_LOCAL_HOURS: u32 = 24;

/// Longest distance, in km, any service accepts.
pub const MAX_DISTANCE_KM: u32 = 10_000;

/// Largest single amount a rate table or a manual allowance may hold
/// (₹1 crore). Together with the limits above, no fare can overflow.
pub const MAX_AMOUNT: Money = Money::from_rupees(10_000_000);
