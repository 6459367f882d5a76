//! # Fare Engine
//!
//! Prices a trip request against a rate table.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  compute_fare(&RateTable, &TripRequest)                                 │
//! │       │                                                                 │
//! │       ├── RateTable::validate()     bad table → InvalidRateTable        │
//! │       ├── validate_trip()           bad input → InvalidRequest          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  price_trip(&RateTable, &Trip)                                          │
//! │       │                                                                 │
//! │       ├── OneWay        base + toll + permit                            │
//! │       ├── RoundTrip     base(≥ daily minimum) + toll + permit + allowance│
//! │       ├── LocalHourly   package + extra hours                           │
//! │       ├── ActingDriver  per-day + (outstation: food, stay, return)      │
//! │       └── Relocation    carrier tier | driver + fuel + toll + return    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  FareBreakdown::from_lines()        total = Σ lines, none negative      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here is deterministic: same table and request, same fare.
//!
//! ## Example
//! ```rust
//! use cabfare_core::engine::compute_fare;
//! use cabfare_core::rates::RateTable;
//! use cabfare_core::types::{ChargeKind, TripRequest};
//! use cabfare_core::vehicle::VehicleCategory;
//!
//! let rates = RateTable::default();
//! let req = TripRequest::one_way(345.0, VehicleCategory::Sedan, true);
//!
//! let fare = compute_fare(&rates, &req).unwrap();
//! assert_eq!(fare.amount_of(ChargeKind::BaseFare).rupees(), 4830);
//! assert_eq!(fare.amount_of(ChargeKind::TollEstimate).rupees(), 1000);
//! assert_eq!(fare.amount_of(ChargeKind::PermitCharge).rupees(), 800);
//! assert_eq!(fare.total.rupees(), 6630);
//! ```

use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::rates::RateTable;
use crate::types::{
    ActingDriverPlan, ChargeKind, ChargeLine, Distance, FareBreakdown, LocalPackage,
    RelocationMethod, Trip, TripRequest,
};
use crate::validation::validate_trip;
use crate::vehicle::VehicleCategory;

// =============================================================================
// Entry Points
// =============================================================================

/// Validates the table and the request, then prices the trip.
pub fn compute_fare(rates: &RateTable, request: &TripRequest) -> CoreResult<FareBreakdown> {
    rates.validate()?;
    let trip = validate_trip(request)?;
    let fare = price_trip(rates, &trip)?;

    debug!(
        service = %fare.service_type,
        lines = fare.lines.len(),
        total = %fare.total,
        "Priced trip"
    );

    Ok(fare)
}

/// Prices an already validated trip. The table is assumed valid.
pub fn price_trip(rates: &RateTable, trip: &Trip) -> CoreResult<FareBreakdown> {
    let lines = match *trip {
        Trip::OneWay {
            distance,
            category,
            crosses_state_border,
        } => one_way_lines(rates, distance, category, crosses_state_border)?,

        Trip::RoundTrip {
            distance,
            days,
            category,
            crosses_state_border,
            allowance_override,
        } => round_trip_lines(
            rates,
            distance,
            days,
            category,
            crosses_state_border,
            allowance_override,
        )?,

        Trip::LocalHourly { hours, category } => local_hourly_lines(rates, hours, category)?,

        Trip::ActingDriver {
            plan,
            days,
            includes_food,
            includes_stay,
        } => acting_driver_lines(rates, plan, days, includes_food, includes_stay)?,

        Trip::Relocation {
            distance,
            category,
            method: RelocationMethod::Carrier,
        } => carrier_lines(rates, distance, category),

        Trip::Relocation {
            distance,
            category,
            method: RelocationMethod::SelfDrive,
        } => self_drive_lines(rates, distance, category)?,
    };

    FareBreakdown::from_lines(trip.service_type(), lines)
}

// =============================================================================
// Shared Rules
// =============================================================================

/// Toll blocks for a distance; a started block counts in full.
pub fn toll_blocks(rates: &RateTable, distance: Distance) -> u32 {
    distance.blocks_of(rates.distance.toll_block_km)
}

/// Driver allowance the booking form fills in when the user hasn't typed one.
///
/// Saturates instead of overflowing; a table that large fails validation
/// before it is ever priced.
pub fn auto_driver_allowance(rates: &RateTable, category: VehicleCategory, days: u32) -> Money {
    rates
        .allowance_per_day(category)
        .checked_mul(days)
        .unwrap_or(Money::from_paise(i64::MAX))
}

/// Carrier price for a distance: the tier whose inclusive limit first covers it.
pub fn carrier_price(rates: &RateTable, distance: Distance, category: VehicleCategory) -> Money {
    let tier = rates.relocation.carrier_tier(distance);
    rates.relocation.carrier.get(category)[tier]
}

fn line(kind: ChargeKind, description: String, amount: Money) -> ChargeLine {
    ChargeLine {
        kind,
        description,
        amount,
    }
}

fn overflow(kind: ChargeKind) -> CoreError {
    CoreError::InvalidRateTable {
        reason: format!("{} is too large to price", kind.label()),
    }
}

fn toll_line(rates: &RateTable, distance: Distance) -> CoreResult<ChargeLine> {
    let blocks = toll_blocks(rates, distance);
    let amount = rates
        .distance
        .toll_block_rate
        .checked_mul(blocks)
        .ok_or_else(|| overflow(ChargeKind::TollEstimate))?;
    Ok(line(
        ChargeKind::TollEstimate,
        format!(
            "{} ({} × {} per {} km)",
            ChargeKind::TollEstimate.label(),
            blocks,
            rates.distance.toll_block_rate,
            rates.distance.toll_block_km
        ),
        amount,
    ))
}

fn permit_line(rates: &RateTable) -> ChargeLine {
    line(
        ChargeKind::PermitCharge,
        ChargeKind::PermitCharge.label().to_string(),
        rates.distance.permit_fee,
    )
}

fn per_km_line(kind: ChargeKind, rate: Money, distance: Distance) -> CoreResult<ChargeLine> {
    let amount = rate.checked_per_km(distance).ok_or_else(|| overflow(kind))?;
    Ok(line(
        kind,
        format!("{} ({} × {}/km)", kind.label(), distance, rate),
        amount,
    ))
}

fn per_day_line(kind: ChargeKind, rate: Money, days: u32) -> CoreResult<ChargeLine> {
    let amount = rate.checked_mul(days).ok_or_else(|| overflow(kind))?;
    Ok(line(
        kind,
        format!("{} ({} × {} day{})", kind.label(), rate, days, if days == 1 { "" } else { "s" }),
        amount,
    ))
}

// =============================================================================
// Service Formulas
// =============================================================================

fn one_way_lines(
    rates: &RateTable,
    distance: Distance,
    category: VehicleCategory,
    crosses_state_border: bool,
) -> CoreResult<Vec<ChargeLine>> {
    let mut lines = vec![
        per_km_line(ChargeKind::BaseFare, rates.distance.per_km.get(category), distance)?,
        toll_line(rates, distance)?,
    ];
    if crosses_state_border {
        lines.push(permit_line(rates));
    }
    Ok(lines)
}

/// Round trips bill at least the daily minimum. Tolls follow the actual
/// route, not the billed minimum.
fn round_trip_lines(
    rates: &RateTable,
    distance: Distance,
    days: u32,
    category: VehicleCategory,
    crosses_state_border: bool,
    allowance_override: Option<Money>,
) -> CoreResult<Vec<ChargeLine>> {
    let minimum =
        Distance::from_metres(rates.distance.round_trip_min_km_per_day as u64 * 1000 * days as u64);
    let chargeable = distance.max(minimum);

    let mut lines = vec![
        per_km_line(ChargeKind::BaseFare, rates.distance.per_km.get(category), chargeable)?,
        toll_line(rates, distance)?,
    ];
    if crosses_state_border {
        lines.push(permit_line(rates));
    }

    lines.push(match allowance_override {
        Some(amount) => line(
            ChargeKind::DriverAllowance,
            format!("{} (manual)", ChargeKind::DriverAllowance.label()),
            amount,
        ),
        None => per_day_line(
            ChargeKind::DriverAllowance,
            rates.allowance_per_day(category),
            days,
        )?,
    });

    Ok(lines)
}

fn local_hourly_lines(
    rates: &RateTable,
    hours: u32,
    category: VehicleCategory,
) -> CoreResult<Vec<ChargeLine>> {
    let (package, extra) = LocalPackage::covering(hours);

    let mut lines = vec![line(
        ChargeKind::PackageFare,
        format!("{} ({})", package.label(), category),
        rates.local.package(package, category),
    )];

    if extra > 0 {
        let rate = rates.local.extra_hour.get(category);
        let amount = rate
            .checked_mul(extra)
            .ok_or_else(|| overflow(ChargeKind::ExtraHours))?;
        lines.push(line(
            ChargeKind::ExtraHours,
            format!("{} ({} × {})", ChargeKind::ExtraHours.label(), extra, rate),
            amount,
        ));
    }

    Ok(lines)
}

fn acting_driver_lines(
    rates: &RateTable,
    plan: ActingDriverPlan,
    days: u32,
    includes_food: bool,
    includes_stay: bool,
) -> CoreResult<Vec<ChargeLine>> {
    let driver = &rates.acting_driver;
    let mut lines = vec![per_day_line(
        ChargeKind::DriverFee,
        driver.per_day(plan),
        days,
    )?];

    if plan.is_outstation() {
        if !includes_food {
            lines.push(per_day_line(
                ChargeKind::FoodAllowance,
                driver.food_per_day,
                days,
            )?);
        }
        if !includes_stay {
            lines.push(per_day_line(
                ChargeKind::StayAllowance,
                driver.stay_per_day,
                days,
            )?);
        }
        lines.push(line(
            ChargeKind::ReturnCharge,
            ChargeKind::ReturnCharge.label().to_string(),
            driver.return_charge,
        ));
    }

    Ok(lines)
}

fn carrier_lines(rates: &RateTable, distance: Distance, category: VehicleCategory) -> Vec<ChargeLine> {
    let limits = &rates.relocation.bracket_limits_km;
    let tier = rates.relocation.carrier_tier(distance);
    let bracket = match limits.get(tier) {
        Some(limit) => format!("up to {} km", limit),
        None => format!("over {} km", limits[limits.len() - 1]),
    };

    vec![line(
        ChargeKind::CarrierFare,
        format!(
            "{} ({}, tier {}, {})",
            ChargeKind::CarrierFare.label(),
            category,
            tier + 1,
            bracket
        ),
        carrier_price(rates, distance, category),
    )]
}

fn self_drive_lines(
    rates: &RateTable,
    distance: Distance,
    category: VehicleCategory,
) -> CoreResult<Vec<ChargeLine>> {
    let self_drive = &rates.relocation.self_drive;
    Ok(vec![
        line(
            ChargeKind::DriverFee,
            format!("{} ({})", ChargeKind::DriverFee.label(), category),
            self_drive.driver_fee.get(category),
        ),
        per_km_line(ChargeKind::FuelCharge, self_drive.fuel_per_km.get(category), distance)?,
        toll_line(rates, distance)?,
        line(
            ChargeKind::ReturnCharge,
            ChargeKind::ReturnCharge.label().to_string(),
            self_drive.return_fee,
        ),
    ])
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::AllowanceRates;
    use crate::types::ServiceType;

    fn rates() -> RateTable {
        RateTable::default()
    }

    #[test]
    fn test_one_way_example() {
        let req = TripRequest::one_way(345.0, VehicleCategory::Sedan, true);
        let fare = compute_fare(&rates(), &req).unwrap();

        assert_eq!(fare.service_type, ServiceType::OneWay);
        assert_eq!(toll_blocks(&rates(), Distance::from_km(345.0).unwrap()), 4);
        assert_eq!(fare.amount_of(ChargeKind::BaseFare), Money::from_rupees(4830));
        assert_eq!(fare.amount_of(ChargeKind::TollEstimate), Money::from_rupees(1000));
        assert_eq!(fare.amount_of(ChargeKind::PermitCharge), Money::from_rupees(800));
        assert_eq!(fare.total, Money::from_rupees(6630));
    }

    #[test]
    fn test_one_way_without_border_has_no_permit() {
        let req = TripRequest::one_way(345.0, VehicleCategory::Sedan, false);
        let fare = compute_fare(&rates(), &req).unwrap();

        assert!(!fare.has(ChargeKind::PermitCharge));
        assert_eq!(fare.total, Money::from_rupees(5830));
    }

    #[test]
    fn test_zero_distance_has_no_toll() {
        let req = TripRequest::one_way(0.0, VehicleCategory::Hatchback, false);
        let fare = compute_fare(&rates(), &req).unwrap();
        assert_eq!(fare.total, Money::zero());
    }

    #[test]
    fn test_acting_driver_outstation_example() {
        let req = TripRequest::acting_driver(ActingDriverPlan::Outstation, 2, false, false);
        let fare = compute_fare(&rates(), &req).unwrap();

        assert_eq!(fare.amount_of(ChargeKind::DriverFee), Money::from_rupees(2400));
        assert_eq!(fare.amount_of(ChargeKind::FoodAllowance), Money::from_rupees(800));
        assert_eq!(fare.amount_of(ChargeKind::StayAllowance), Money::from_rupees(1000));
        assert_eq!(fare.amount_of(ChargeKind::ReturnCharge), Money::from_rupees(500));
        assert_eq!(fare.total, Money::from_rupees(4700));
    }

    #[test]
    fn test_acting_driver_local_has_no_surcharges() {
        let req = TripRequest::acting_driver(ActingDriverPlan::Local12Hours, 3, false, false);
        let fare = compute_fare(&rates(), &req).unwrap();

        assert_eq!(fare.lines.len(), 1);
        assert_eq!(fare.total, Money::from_rupees(3000));
    }

    #[test]
    fn test_acting_driver_outstation_with_food_and_stay() {
        let req = TripRequest::acting_driver(ActingDriverPlan::Outstation, 2, true, true);
        let fare = compute_fare(&rates(), &req).unwrap();

        assert!(!fare.has(ChargeKind::FoodAllowance));
        assert!(!fare.has(ChargeKind::StayAllowance));
        assert_eq!(fare.total, Money::from_rupees(2900));
    }

    #[test]
    fn test_carrier_example_second_tier() {
        let req = TripRequest::relocation(1000.0, VehicleCategory::Sedan, RelocationMethod::Carrier);
        let fare = compute_fare(&rates(), &req).unwrap();

        assert_eq!(fare.total, Money::from_rupees(8000));
        assert_eq!(fare.lines[0].kind, ChargeKind::CarrierFare);
        assert!(fare.lines[0].description.contains("tier 2"));
    }

    #[test]
    fn test_carrier_over_last_bracket() {
        let req = TripRequest::relocation(2200.0, VehicleCategory::Bus, RelocationMethod::Carrier);
        let fare = compute_fare(&rates(), &req).unwrap();

        assert_eq!(fare.total, Money::from_rupees(42000));
        assert!(fare.lines[0].description.contains("over 1500 km"));
    }

    #[test]
    fn test_self_drive_relocation() {
        // 1500 + 320×7 + 4×250 + 1000
        let req =
            TripRequest::relocation(320.0, VehicleCategory::Sedan, RelocationMethod::SelfDrive);
        let fare = compute_fare(&rates(), &req).unwrap();

        assert_eq!(fare.amount_of(ChargeKind::DriverFee), Money::from_rupees(1500));
        assert_eq!(fare.amount_of(ChargeKind::FuelCharge), Money::from_rupees(2240));
        assert_eq!(fare.amount_of(ChargeKind::TollEstimate), Money::from_rupees(1000));
        assert_eq!(fare.amount_of(ChargeKind::ReturnCharge), Money::from_rupees(1000));
        assert_eq!(fare.total, Money::from_rupees(5740));
    }

    #[test]
    fn test_round_trip_applies_daily_minimum() {
        // 300 km over 2 days bills 500 km; tolls follow the real 300 km
        let req = TripRequest::round_trip(300.0, 2, VehicleCategory::Suv, false);
        let fare = compute_fare(&rates(), &req).unwrap();

        assert_eq!(fare.amount_of(ChargeKind::BaseFare), Money::from_rupees(9000));
        assert_eq!(fare.amount_of(ChargeKind::TollEstimate), Money::from_rupees(750));
        assert_eq!(fare.amount_of(ChargeKind::DriverAllowance), Money::from_rupees(1200));
        assert_eq!(fare.total, Money::from_rupees(10950));
    }

    #[test]
    fn test_round_trip_long_distance_bills_actual() {
        let req = TripRequest::round_trip(700.0, 2, VehicleCategory::Sedan, true);
        let fare = compute_fare(&rates(), &req).unwrap();

        assert_eq!(fare.amount_of(ChargeKind::BaseFare), Money::from_rupees(9800));
        assert_eq!(fare.amount_of(ChargeKind::PermitCharge), Money::from_rupees(800));
    }

    #[test]
    fn test_round_trip_manual_allowance_is_used_verbatim() {
        let mut req = TripRequest::round_trip(700.0, 2, VehicleCategory::Sedan, false);
        req.driver_allowance_override = Some(Money::zero());
        let fare = compute_fare(&rates(), &req).unwrap();

        assert!(fare.has(ChargeKind::DriverAllowance));
        assert_eq!(fare.amount_of(ChargeKind::DriverAllowance), Money::zero());
    }

    #[test]
    fn test_local_hourly_picks_smallest_package() {
        let fare = compute_fare(&rates(), &TripRequest::local_hourly(5, VehicleCategory::Sedan))
            .unwrap();
        assert_eq!(fare.total, Money::from_rupees(2200));

        let fare = compute_fare(&rates(), &TripRequest::local_hourly(4, VehicleCategory::Sedan))
            .unwrap();
        assert_eq!(fare.total, Money::from_rupees(1200));
    }

    #[test]
    fn test_local_hourly_extra_hours() {
        let req = TripRequest::local_hourly(14, VehicleCategory::Suv);
        let fare = compute_fare(&rates(), &req).unwrap();

        assert_eq!(fare.amount_of(ChargeKind::PackageFare), Money::from_rupees(3800));
        assert_eq!(fare.amount_of(ChargeKind::ExtraHours), Money::from_rupees(500));
        assert_eq!(fare.total, Money::from_rupees(4300));
    }

    #[test]
    fn test_local_hourly_zero_hours_rejected() {
        let req = TripRequest::local_hourly(0, VehicleCategory::Sedan);
        assert!(matches!(
            compute_fare(&rates(), &req),
            Err(CoreError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_invalid_table_cannot_price() {
        let mut table = rates();
        table.distance.permit_fee = Money::from_rupees(-800);
        let req = TripRequest::one_way(10.0, VehicleCategory::Sedan, false);

        assert!(matches!(
            compute_fare(&table, &req),
            Err(CoreError::InvalidRateTable { .. })
        ));
    }

    #[test]
    fn test_negative_distance_rejected() {
        let req = TripRequest::one_way(-10.0, VehicleCategory::Sedan, false);
        assert!(matches!(
            compute_fare(&rates(), &req),
            Err(CoreError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_auto_driver_allowance() {
        assert_eq!(
            auto_driver_allowance(&rates(), VehicleCategory::Suv, 3),
            Money::from_rupees(1800)
        );
    }

    fn huge_toll_table() -> RateTable {
        let mut table = rates();
        table.distance.toll_block_rate = Money::from_paise(100_000_000_000_000_000);
        table
    }

    #[test]
    fn test_oversized_rate_table_is_rejected_not_panicking() {
        let req = TripRequest::one_way(10_000.0, VehicleCategory::Sedan, false);
        assert!(matches!(
            compute_fare(&huge_toll_table(), &req),
            Err(CoreError::InvalidRateTable { .. })
        ));
    }

    #[test]
    fn test_price_trip_reports_overflow() {
        let trip = Trip::OneWay {
            distance: Distance::from_km(10_000.0).unwrap(),
            category: VehicleCategory::Sedan,
            crosses_state_border: false,
        };
        let err = price_trip(&huge_toll_table(), &trip).unwrap_err();
        assert!(matches!(err, CoreError::InvalidRateTable { .. }));
        assert!(err.to_string().contains(ChargeKind::TollEstimate.label()));

        let mut table = rates();
        table.distance.per_km.sedan = Money::from_paise(i64::MAX / 1000);
        assert!(price_trip(&table, &trip).is_err());
    }

    #[test]
    fn test_largest_valid_table_prices_longest_trip() {
        let mut table = rates();
        table.distance.toll_block_rate = crate::MAX_AMOUNT;
        table.distance.per_km.bus = crate::MAX_AMOUNT;
        table.distance.permit_fee = crate::MAX_AMOUNT;

        let req = TripRequest::one_way(crate::MAX_DISTANCE_KM as f64, VehicleCategory::Bus, true);
        let fare = compute_fare(&table, &req).unwrap();
        assert!(fare.total > crate::MAX_AMOUNT);
    }

    #[test]
    fn test_auto_driver_allowance_saturates() {
        let mut table = rates();
        let half = Money::from_paise(i64::MAX / 2);
        table.allowance = AllowanceRates {
            economy: half,
            standard: half,
            premium: half,
            group: half,
        };
        assert_eq!(
            auto_driver_allowance(&table, VehicleCategory::Suv, 3),
            Money::from_paise(i64::MAX)
        );
    }
}
