//! # Market Comparison Scenarios
//!
//! A fixed set of representative trips, each with the fare range competing
//! operators quote for it. `cabfare verify` prices every trip through the
//! active rate table and reports where our estimate lands. The report is
//! informational: a "below" or "above" verdict never fails the command.

use cabfare_core::{
    compute_fare, ActingDriverPlan, CoreResult, Money, RateTable, RelocationMethod, ServiceType,
    TripRequest, VehicleCategory,
};
use serde::Serialize;

/// Where an estimate falls relative to the market range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Below,
    Within,
    Above,
}

impl Verdict {
    /// Both ends of the range count as within.
    pub fn classify(estimate: Money, low: Money, high: Money) -> Self {
        if estimate < low {
            Verdict::Below
        } else if estimate > high {
            Verdict::Above
        } else {
            Verdict::Within
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Verdict::Below => "below market",
            Verdict::Within => "within",
            Verdict::Above => "above market",
        }
    }
}

pub struct Scenario {
    pub name: &'static str,
    pub request: TripRequest,
    pub market_low: Money,
    pub market_high: Money,
}

impl Scenario {
    fn new(name: &'static str, request: TripRequest, market_rupees: (i64, i64)) -> Self {
        Scenario {
            name,
            request,
            market_low: Money::from_rupees(market_rupees.0),
            market_high: Money::from_rupees(market_rupees.1),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    pub name: &'static str,
    pub service_type: ServiceType,
    pub estimate: Money,
    pub market_low: Money,
    pub market_high: Money,
    pub verdict: Verdict,
}

/// The comparison trips, with market ranges in rupees.
pub fn scenarios() -> Vec<Scenario> {
    use VehicleCategory::*;

    vec![
        Scenario::new(
            "Bangalore → Chennai drop, sedan",
            TripRequest::one_way(345.0, Sedan, true),
            (5500, 7500),
        ),
        Scenario::new(
            "Bangalore → Mysore drop, hatchback",
            TripRequest::one_way(150.0, Hatchback, false),
            (2200, 3000),
        ),
        Scenario::new(
            "Group drop 250 km, tempo traveller",
            TripRequest::one_way(250.0, TempoTraveller, false),
            (7000, 9500),
        ),
        Scenario::new(
            "Outstation round trip 300 km × 2 days, SUV",
            TripRequest::round_trip(300.0, 2, Suv, false),
            (9000, 12000),
        ),
        Scenario::new(
            "City package 8 hours, sedan",
            TripRequest::local_hourly(8, Sedan),
            (2000, 2800),
        ),
        Scenario::new(
            "Acting driver local 12h × 3 days",
            TripRequest::acting_driver(ActingDriverPlan::Local12Hours, 3, false, false),
            (2400, 3600),
        ),
        Scenario::new(
            "Acting driver outstation × 2 days",
            TripRequest::acting_driver(ActingDriverPlan::Outstation, 2, false, false),
            (3500, 4500),
        ),
        Scenario::new(
            "Car carrier 1000 km, sedan",
            TripRequest::relocation(1000.0, Sedan, RelocationMethod::Carrier),
            (8000, 12000),
        ),
        Scenario::new(
            "Self-drive relocation 320 km, sedan",
            TripRequest::relocation(320.0, Sedan, RelocationMethod::SelfDrive),
            (6000, 8000),
        ),
    ]
}

/// Prices every scenario against `rates`.
pub fn run(rates: &RateTable) -> CoreResult<Vec<ScenarioResult>> {
    scenarios()
        .into_iter()
        .map(|scenario| {
            let fare = compute_fare(rates, &scenario.request)?;
            Ok(ScenarioResult {
                name: scenario.name,
                service_type: fare.service_type,
                estimate: fare.total,
                market_low: scenario.market_low,
                market_high: scenario.market_high,
                verdict: Verdict::classify(fare.total, scenario.market_low, scenario.market_high),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result<'a>(results: &'a [ScenarioResult], name: &str) -> &'a ScenarioResult {
        results.iter().find(|r| r.name.starts_with(name)).unwrap()
    }

    #[test]
    fn test_verdict_bounds_inclusive() {
        let low = Money::from_rupees(100);
        let high = Money::from_rupees(200);

        assert_eq!(Verdict::classify(Money::from_rupees(99), low, high), Verdict::Below);
        assert_eq!(Verdict::classify(low, low, high), Verdict::Within);
        assert_eq!(Verdict::classify(high, low, high), Verdict::Within);
        assert_eq!(Verdict::classify(Money::from_rupees(201), low, high), Verdict::Above);
    }

    #[test]
    fn test_every_scenario_prices_with_default_rates() {
        let results = run(&RateTable::default()).unwrap();
        assert_eq!(results.len(), scenarios().len());
        assert!(results.iter().all(|r| r.market_low <= r.market_high));
    }

    #[test]
    fn test_known_estimates() {
        let results = run(&RateTable::default()).unwrap();

        let chennai = result(&results, "Bangalore → Chennai");
        assert_eq!(chennai.estimate, Money::from_rupees(6630));
        assert_eq!(chennai.verdict, Verdict::Within);

        let outstation = result(&results, "Acting driver outstation");
        assert_eq!(outstation.estimate, Money::from_rupees(4700));
        assert_eq!(outstation.verdict, Verdict::Above);

        let carrier = result(&results, "Car carrier");
        assert_eq!(carrier.estimate, Money::from_rupees(8000));
        assert_eq!(carrier.verdict, Verdict::Within);

        let self_drive = result(&results, "Self-drive");
        assert_eq!(self_drive.estimate, Money::from_rupees(5740));
        assert_eq!(self_drive.verdict, Verdict::Below);
    }

    #[test]
    fn test_report_follows_rate_table() {
        let mut rates = RateTable::default();
        rates.acting_driver.outstation = Money::from_rupees(1000);

        let results = run(&rates).unwrap();
        let outstation = result(&results, "Acting driver outstation");
        assert_eq!(outstation.estimate, Money::from_rupees(4300));
        assert_eq!(outstation.verdict, Verdict::Within);
    }
}
