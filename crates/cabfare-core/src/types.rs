//! # Domain Types
//!
//! Core domain types used throughout Cabfare.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  TripRequest    │   │      Trip       │   │  FareBreakdown  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  flat, serde    │──►│  validated enum │──►│  lines: Vec<..> │       │
//! │  │  (from form)    │   │  one per service│   │  total: Money   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   Distance      │   │  ServiceType    │   │   ChargeKind    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  metres (u64)   │   │  OneWay         │   │  BaseFare       │       │
//! │  │  ceil toll      │   │  RoundTrip ...  │   │  TollEstimate.. │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Parse, Then Price
//! `TripRequest` mirrors what the booking form submits: every field that
//! only some services need is optional. `validation::validate_trip` turns it
//! into a `Trip`, where each variant carries exactly the data its formula
//! uses, so the engine never has to re-check for missing fields.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::vehicle::VehicleCategory;

// =============================================================================
// Distance
// =============================================================================

/// A non-negative trip distance, stored in whole metres.
///
/// ## Why Metres?
/// Toll blocks round up at exact 100 km boundaries. With integer metres,
/// "100 km is one block, 100.001 km is two" is an exact comparison instead
/// of a floating-point guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Distance(u64);

impl Distance {
    /// Creates a distance from kilometres as entered in the booking form.
    ///
    /// ## Rules
    /// - Must be finite
    /// - Must not be negative
    ///
    /// ## Example
    /// ```rust
    /// use cabfare_core::types::Distance;
    ///
    /// assert_eq!(Distance::from_km(1.5).unwrap().metres(), 1500);
    /// assert!(Distance::from_km(-1.0).is_err());
    /// assert!(Distance::from_km(f64::NAN).is_err());
    /// ```
    pub fn from_km(km: f64) -> Result<Self, ValidationError> {
        if !km.is_finite() {
            return Err(ValidationError::NotFinite {
                field: "distance_km".to_string(),
            });
        }

        if km < 0.0 {
            return Err(ValidationError::Negative {
                field: "distance_km".to_string(),
            });
        }

        Ok(Distance((km * 1000.0).round() as u64))
    }

    /// Creates a distance from whole metres.
    #[inline]
    pub const fn from_metres(metres: u64) -> Self {
        Distance(metres)
    }

    /// Returns the distance in metres.
    #[inline]
    pub const fn metres(&self) -> u64 {
        self.0
    }

    /// Returns the distance in kilometres (for display only).
    #[inline]
    pub fn km(&self) -> f64 {
        self.0 as f64 / 1000.0
    }

    /// Number of toll blocks of `block_km` kilometres, rounded up.
    ///
    /// A partial block still incurs a full block.
    ///
    /// ## Example
    /// ```rust
    /// use cabfare_core::types::Distance;
    ///
    /// assert_eq!(Distance::from_km(0.0).unwrap().blocks_of(100), 0);
    /// assert_eq!(Distance::from_km(100.0).unwrap().blocks_of(100), 1);
    /// assert_eq!(Distance::from_km(101.0).unwrap().blocks_of(100), 2);
    /// assert_eq!(Distance::from_km(345.0).unwrap().blocks_of(100), 4);
    /// ```
    pub fn blocks_of(&self, block_km: u32) -> u32 {
        let block_metres = block_km as u64 * 1000;
        if block_metres == 0 {
            return 0;
        }
        self.0.div_ceil(block_metres) as u32
    }

    /// True when this distance is at most `km` kilometres (inclusive).
    #[inline]
    pub fn within_km(&self, km: u32) -> bool {
        self.0 <= km as u64 * 1000
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 1000 == 0 {
            write!(f, "{} km", self.0 / 1000)
        } else {
            write!(f, "{:.1} km", self.km())
        }
    }
}

// =============================================================================
// Service Type
// =============================================================================

/// Which rule set prices the trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    /// Point-to-point drop, billed per km.
    OneWay,
    /// Outstation round trip, billed per km with a daily minimum plus driver allowance.
    RoundTrip,
    /// In-city package billed by hours.
    LocalHourly,
    /// Driver only; the customer supplies the vehicle.
    ActingDriver,
    /// Moving the customer's vehicle to another city.
    VehicleRelocation,
}

impl ServiceType {
    /// All service types, in menu order.
    pub const ALL: [ServiceType; 5] = [
        ServiceType::OneWay,
        ServiceType::RoundTrip,
        ServiceType::LocalHourly,
        ServiceType::ActingDriver,
        ServiceType::VehicleRelocation,
    ];

    /// Stable snake_case identifier (matches the serde representation).
    pub const fn as_str(&self) -> &'static str {
        match self {
            ServiceType::OneWay => "one_way",
            ServiceType::RoundTrip => "round_trip",
            ServiceType::LocalHourly => "local_hourly",
            ServiceType::ActingDriver => "acting_driver",
            ServiceType::VehicleRelocation => "vehicle_relocation",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = CoreError;

    /// Parses a service type. Never guesses: unknown input is an error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "one_way" | "oneway" | "drop" => Ok(ServiceType::OneWay),
            "round_trip" | "roundtrip" | "outstation" => Ok(ServiceType::RoundTrip),
            "local_hourly" | "local" | "hourly" => Ok(ServiceType::LocalHourly),
            "acting_driver" | "driver" => Ok(ServiceType::ActingDriver),
            "vehicle_relocation" | "relocation" => Ok(ServiceType::VehicleRelocation),
            _ => Err(ValidationError::NotAllowed {
                field: "service_type".to_string(),
                allowed: ServiceType::ALL.iter().map(|s| s.as_str().to_string()).collect(),
            }
            .into()),
        }
    }
}

// =============================================================================
// Service Options
// =============================================================================

/// Acting-driver plans. Each has its own per-day rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ActingDriverPlan {
    /// In-city, up to 8 hours a day.
    Local8Hours,
    /// In-city, up to 12 hours a day.
    Local12Hours,
    /// Out of town; food, stay and the driver's trip home are billed.
    Outstation,
}

impl ActingDriverPlan {
    pub const fn is_outstation(&self) -> bool {
        matches!(self, ActingDriverPlan::Outstation)
    }
}

impl FromStr for ActingDriverPlan {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "local_8_hours" | "local8" | "local_8h" => Ok(ActingDriverPlan::Local8Hours),
            "local_12_hours" | "local12" | "local_12h" => Ok(ActingDriverPlan::Local12Hours),
            "outstation" => Ok(ActingDriverPlan::Outstation),
            _ => Err(ValidationError::NotAllowed {
                field: "acting_driver_plan".to_string(),
                allowed: vec![
                    "local_8_hours".to_string(),
                    "local_12_hours".to_string(),
                    "outstation".to_string(),
                ],
            }
            .into()),
        }
    }
}

/// How a relocated vehicle travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RelocationMethod {
    /// Loaded on a car carrier truck; priced by distance bracket.
    Carrier,
    /// Driven by one of our drivers; priced by fuel, tolls and fees.
    SelfDrive,
}

impl FromStr for RelocationMethod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "carrier" | "truck" => Ok(RelocationMethod::Carrier),
            "self_drive" | "selfdrive" | "driven" => Ok(RelocationMethod::SelfDrive),
            _ => Err(ValidationError::NotAllowed {
                field: "relocation_method".to_string(),
                allowed: vec!["carrier".to_string(), "self_drive".to_string()],
            }
            .into()),
        }
    }
}

/// Local-hourly packages, smallest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum LocalPackage {
    FourHours,
    EightHours,
    TwelveHours,
}

impl LocalPackage {
    /// Packages in ascending size.
    pub const ALL: [LocalPackage; 3] = [
        LocalPackage::FourHours,
        LocalPackage::EightHours,
        LocalPackage::TwelveHours,
    ];

    /// Hours included in the package.
    pub const fn hours(&self) -> u32 {
        match self {
            LocalPackage::FourHours => 4,
            LocalPackage::EightHours => 8,
            LocalPackage::TwelveHours => 12,
        }
    }

    /// Picks the smallest package covering `hours`.
    ///
    /// Returns the package and the hours left over beyond the largest one.
    ///
    /// ## Example
    /// ```rust
    /// use cabfare_core::types::LocalPackage;
    ///
    /// assert_eq!(LocalPackage::covering(5), (LocalPackage::EightHours, 0));
    /// assert_eq!(LocalPackage::covering(8), (LocalPackage::EightHours, 0));
    /// assert_eq!(LocalPackage::covering(14), (LocalPackage::TwelveHours, 2));
    /// ```
    pub fn covering(hours: u32) -> (LocalPackage, u32) {
        for package in LocalPackage::ALL {
            if hours <= package.hours() {
                return (package, 0);
            }
        }
        let largest = LocalPackage::TwelveHours;
        (largest, hours - largest.hours())
    }

    pub const fn label(&self) -> &'static str {
        match self {
            LocalPackage::FourHours => "4 hour package",
            LocalPackage::EightHours => "8 hour package",
            LocalPackage::TwelveHours => "12 hour package",
        }
    }
}

// =============================================================================
// Trip Request
// =============================================================================

/// A trip as submitted by the booking form or a verification scenario.
///
/// Only `service_type` is always required; which other fields are required
/// depends on the service (see `validation::validate_trip`). Fields that
/// don't apply to the chosen service are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TripRequest {
    pub service_type: ServiceType,

    /// Kilometres. Required for one-way, round-trip and relocation.
    #[serde(default)]
    pub distance_km: Option<f64>,

    /// Required for round-trip and acting-driver.
    #[serde(default)]
    pub duration_days: Option<u32>,

    /// Required for local-hourly.
    #[serde(default)]
    pub duration_hours: Option<u32>,

    /// Required for every service except acting-driver.
    #[serde(default)]
    pub vehicle_category: Option<VehicleCategory>,

    /// Adds the interstate permit fee (one-way, round-trip).
    #[serde(default)]
    pub crosses_state_border: bool,

    /// Customer provides the driver's meals (acting-driver outstation).
    #[serde(default)]
    pub includes_food: bool,

    /// Customer provides the driver's lodging (acting-driver outstation).
    #[serde(default)]
    pub includes_stay: bool,

    /// Required for acting-driver.
    #[serde(default)]
    pub acting_driver_plan: Option<ActingDriverPlan>,

    /// Required for vehicle relocation.
    #[serde(default)]
    pub relocation_method: Option<RelocationMethod>,

    /// Total driver allowance the user typed in, replacing the auto value
    /// (round-trip only).
    #[serde(default)]
    pub driver_allowance_override: Option<Money>,
}

impl TripRequest {
    /// Creates a request with only the service type set.
    pub fn new(service_type: ServiceType) -> Self {
        TripRequest {
            service_type,
            distance_km: None,
            duration_days: None,
            duration_hours: None,
            vehicle_category: None,
            crosses_state_border: false,
            includes_food: false,
            includes_stay: false,
            acting_driver_plan: None,
            relocation_method: None,
            driver_allowance_override: None,
        }
    }

    /// One-way drop.
    pub fn one_way(distance_km: f64, category: VehicleCategory, crosses_state_border: bool) -> Self {
        TripRequest {
            distance_km: Some(distance_km),
            vehicle_category: Some(category),
            crosses_state_border,
            ..TripRequest::new(ServiceType::OneWay)
        }
    }

    /// Outstation round trip.
    pub fn round_trip(
        distance_km: f64,
        days: u32,
        category: VehicleCategory,
        crosses_state_border: bool,
    ) -> Self {
        TripRequest {
            distance_km: Some(distance_km),
            duration_days: Some(days),
            vehicle_category: Some(category),
            crosses_state_border,
            ..TripRequest::new(ServiceType::RoundTrip)
        }
    }

    /// Local package by hours.
    pub fn local_hourly(hours: u32, category: VehicleCategory) -> Self {
        TripRequest {
            duration_hours: Some(hours),
            vehicle_category: Some(category),
            ..TripRequest::new(ServiceType::LocalHourly)
        }
    }

    /// Acting driver for a number of days.
    pub fn acting_driver(
        plan: ActingDriverPlan,
        days: u32,
        includes_food: bool,
        includes_stay: bool,
    ) -> Self {
        TripRequest {
            duration_days: Some(days),
            acting_driver_plan: Some(plan),
            includes_food,
            includes_stay,
            ..TripRequest::new(ServiceType::ActingDriver)
        }
    }

    /// Vehicle relocation.
    pub fn relocation(distance_km: f64, category: VehicleCategory, method: RelocationMethod) -> Self {
        TripRequest {
            distance_km: Some(distance_km),
            vehicle_category: Some(category),
            relocation_method: Some(method),
            ..TripRequest::new(ServiceType::VehicleRelocation)
        }
    }

    /// Parses a request from booking-form JSON.
    ///
    /// Serde failures (unknown service type, negative days, wrong types)
    /// are reported as `InvalidRequest`, never passed through raw.
    ///
    /// ## Example
    /// ```rust
    /// use cabfare_core::types::{ServiceType, TripRequest};
    ///
    /// let req = TripRequest::from_json(
    ///     r#"{"service_type":"one_way","distance_km":345,"vehicle_category":"sedan"}"#,
    /// ).unwrap();
    /// assert_eq!(req.service_type, ServiceType::OneWay);
    ///
    /// assert!(TripRequest::from_json(r#"{"service_type":"teleport"}"#).is_err());
    /// ```
    pub fn from_json(json: &str) -> CoreResult<Self> {
        serde_json::from_str(json).map_err(|e| {
            ValidationError::InvalidFormat {
                field: "trip request".to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}

// =============================================================================
// Trip (validated)
// =============================================================================

/// A validated trip. Each variant holds exactly what its formula needs.
#[derive(Debug, Clone, PartialEq)]
pub enum Trip {
    OneWay {
        distance: Distance,
        category: VehicleCategory,
        crosses_state_border: bool,
    },
    RoundTrip {
        distance: Distance,
        days: u32,
        category: VehicleCategory,
        crosses_state_border: bool,
        allowance_override: Option<Money>,
    },
    LocalHourly {
        hours: u32,
        category: VehicleCategory,
    },
    ActingDriver {
        plan: ActingDriverPlan,
        days: u32,
        includes_food: bool,
        includes_stay: bool,
    },
    Relocation {
        distance: Distance,
        category: VehicleCategory,
        method: RelocationMethod,
    },
}

impl Trip {
    pub fn service_type(&self) -> ServiceType {
        match self {
            Trip::OneWay { .. } => ServiceType::OneWay,
            Trip::RoundTrip { .. } => ServiceType::RoundTrip,
            Trip::LocalHourly { .. } => ServiceType::LocalHourly,
            Trip::ActingDriver { .. } => ServiceType::ActingDriver,
            Trip::Relocation { .. } => ServiceType::VehicleRelocation,
        }
    }
}

// =============================================================================
// Fare Breakdown
// =============================================================================

/// What a charge line is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ChargeKind {
    BaseFare,
    TollEstimate,
    PermitCharge,
    DriverAllowance,
    PackageFare,
    ExtraHours,
    FoodAllowance,
    StayAllowance,
    ReturnCharge,
    CarrierFare,
    DriverFee,
    FuelCharge,
}

impl ChargeKind {
    /// Human-readable label for receipts and reports.
    pub const fn label(&self) -> &'static str {
        match self {
            ChargeKind::BaseFare => "Base fare",
            ChargeKind::TollEstimate => "Toll estimate",
            ChargeKind::PermitCharge => "State permit",
            ChargeKind::DriverAllowance => "Driver allowance",
            ChargeKind::PackageFare => "Package fare",
            ChargeKind::ExtraHours => "Extra hours",
            ChargeKind::FoodAllowance => "Food allowance",
            ChargeKind::StayAllowance => "Stay allowance",
            ChargeKind::ReturnCharge => "Return charge",
            ChargeKind::CarrierFare => "Carrier fare",
            ChargeKind::DriverFee => "Driver fee",
            ChargeKind::FuelCharge => "Fuel charge",
        }
    }
}

/// One named line of a fare.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct ChargeLine {
    pub kind: ChargeKind,
    /// Label with the quantity spelled out, e.g. "Toll estimate (4 × ₹250.00)".
    pub description: String,
    pub amount: Money,
}

/// The priced result of a trip.
///
/// ## Invariants
/// - `total` equals the sum of `lines`
/// - No line is negative
///
/// Both hold by construction: the only constructor is `from_lines`, and the
/// type is not deserializable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct FareBreakdown {
    pub service_type: ServiceType,
    pub lines: Vec<ChargeLine>,
    pub total: Money,
}

impl FareBreakdown {
    /// Builds a breakdown, summing the total from the lines.
    pub fn from_lines(service_type: ServiceType, lines: Vec<ChargeLine>) -> CoreResult<Self> {
        if let Some(line) = lines.iter().find(|l| l.amount.is_negative()) {
            return Err(CoreError::InvalidRateTable {
                reason: format!("{} priced negative ({})", line.kind.label(), line.amount),
            });
        }

        let total = lines
            .iter()
            .try_fold(Money::zero(), |sum, l| sum.checked_add(l.amount))
            .ok_or_else(|| CoreError::InvalidRateTable {
                reason: "fare total is too large to price".to_string(),
            })?;
        Ok(FareBreakdown {
            service_type,
            lines,
            total,
        })
    }

    /// Sum of every line of the given kind (zero when absent).
    pub fn amount_of(&self, kind: ChargeKind) -> Money {
        self.lines
            .iter()
            .filter(|l| l.kind == kind)
            .map(|l| l.amount)
            .sum()
    }

    /// True when a line of the given kind is present.
    pub fn has(&self, kind: ChargeKind) -> bool {
        self.lines.iter().any(|l| l.kind == kind)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_rounds_to_metres() {
        assert_eq!(Distance::from_km(12.3456).unwrap().metres(), 12_346);
        assert_eq!(Distance::from_km(0.0).unwrap().metres(), 0);
    }

    #[test]
    fn test_distance_rejects_bad_input() {
        assert!(matches!(
            Distance::from_km(-0.5),
            Err(ValidationError::Negative { .. })
        ));
        assert!(matches!(
            Distance::from_km(f64::INFINITY),
            Err(ValidationError::NotFinite { .. })
        ));
    }

    #[test]
    fn test_toll_block_boundaries() {
        assert_eq!(Distance::from_km(99.9).unwrap().blocks_of(100), 1);
        assert_eq!(Distance::from_km(100.0).unwrap().blocks_of(100), 1);
        assert_eq!(Distance::from_km(100.001).unwrap().blocks_of(100), 2);
        assert_eq!(Distance::from_km(200.0).unwrap().blocks_of(100), 2);
        assert_eq!(Distance::from_km(50.0).unwrap().blocks_of(0), 0);
    }

    #[test]
    fn test_within_km_is_inclusive() {
        assert!(Distance::from_km(500.0).unwrap().within_km(500));
        assert!(!Distance::from_km(500.001).unwrap().within_km(500));
    }

    #[test]
    fn test_distance_display() {
        assert_eq!(Distance::from_km(345.0).unwrap().to_string(), "345 km");
        assert_eq!(Distance::from_km(12.3).unwrap().to_string(), "12.3 km");
    }

    #[test]
    fn test_service_type_parsing() {
        assert_eq!("one-way".parse::<ServiceType>().unwrap(), ServiceType::OneWay);
        assert_eq!("Outstation".parse::<ServiceType>().unwrap(), ServiceType::RoundTrip);
        assert_eq!(
            "relocation".parse::<ServiceType>().unwrap(),
            ServiceType::VehicleRelocation
        );
        assert!(matches!(
            "".parse::<ServiceType>(),
            Err(CoreError::InvalidRequest(_))
        ));
        assert!("helicopter".parse::<ServiceType>().is_err());
    }

    #[test]
    fn test_local_package_covering() {
        assert_eq!(LocalPackage::covering(1), (LocalPackage::FourHours, 0));
        assert_eq!(LocalPackage::covering(4), (LocalPackage::FourHours, 0));
        assert_eq!(LocalPackage::covering(9), (LocalPackage::TwelveHours, 0));
        assert_eq!(LocalPackage::covering(16), (LocalPackage::TwelveHours, 4));
    }

    #[test]
    fn test_trip_request_json_defaults() {
        let req = TripRequest::from_json(
            r#"{"service_type":"acting_driver","duration_days":2,"acting_driver_plan":"outstation"}"#,
        )
        .unwrap();
        assert_eq!(req.service_type, ServiceType::ActingDriver);
        assert_eq!(req.duration_days, Some(2));
        assert!(!req.includes_food);
        assert!(!req.includes_stay);
        assert_eq!(req.vehicle_category, None);
    }

    #[test]
    fn test_trip_request_json_rejects_negative_days() {
        let err = TripRequest::from_json(
            r#"{"service_type":"acting_driver","duration_days":-2}"#,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::InvalidRequest(_)));
    }

    #[test]
    fn test_breakdown_total_is_sum_of_lines() {
        let lines = vec![
            ChargeLine {
                kind: ChargeKind::BaseFare,
                description: "Base fare".to_string(),
                amount: Money::from_rupees(4830),
            },
            ChargeLine {
                kind: ChargeKind::TollEstimate,
                description: "Toll estimate".to_string(),
                amount: Money::from_rupees(1000),
            },
        ];
        let fare = FareBreakdown::from_lines(ServiceType::OneWay, lines).unwrap();
        assert_eq!(fare.total, Money::from_rupees(5830));
        assert_eq!(fare.amount_of(ChargeKind::TollEstimate), Money::from_rupees(1000));
        assert_eq!(fare.amount_of(ChargeKind::PermitCharge), Money::zero());
        assert!(!fare.has(ChargeKind::PermitCharge));
    }

    #[test]
    fn test_breakdown_rejects_negative_line() {
        let lines = vec![ChargeLine {
            kind: ChargeKind::BaseFare,
            description: "Base fare".to_string(),
            amount: Money::from_rupees(-1),
        }];
        assert!(matches!(
            FareBreakdown::from_lines(ServiceType::OneWay, lines),
            Err(CoreError::InvalidRateTable { .. })
        ));
    }

    #[test]
    fn test_breakdown_total_overflow_is_an_error() {
        let big = |kind| ChargeLine {
            kind,
            description: "Huge".to_string(),
            amount: Money::from_paise(i64::MAX / 2 + 1),
        };
        let lines = vec![big(ChargeKind::BaseFare), big(ChargeKind::TollEstimate)];
        assert!(matches!(
            FareBreakdown::from_lines(ServiceType::OneWay, lines),
            Err(CoreError::InvalidRateTable { .. })
        ));
    }

    #[test]
    fn test_breakdown_serializes_for_the_form() {
        let fare = FareBreakdown::from_lines(ServiceType::LocalHourly, vec![]).unwrap();
        let json = serde_json::to_value(&fare).unwrap();
        assert_eq!(json["service_type"], "local_hourly");
        assert_eq!(json["total"], 0);
    }
}
