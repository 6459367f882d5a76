//! # Rate Table
//!
//! Every price constant the engine, the booking form and the verification
//! report use lives here, in one read-only value.
//!
//! ## Layout
//! ```text
//! RateTable
//! ├── distance       per-km by category, toll block, permit, round-trip minimum
//! ├── allowance      driver allowance per day by tier
//! ├── local          4h / 8h / 12h package prices + extra hour, by category
//! ├── acting_driver  per-day by plan, food / stay per day, return charge
//! └── relocation     bracket limits, carrier tiers, self-drive fees
//! ```
//!
//! ## Loading
//! This crate never touches the filesystem. `RateTable::default()` is the
//! built-in table; hosts deserialize overrides from TOML (amounts in paise)
//! and must call [`RateTable::validate`] before pricing with them.
//! `engine::compute_fare` validates again, so a bad table can't price.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{ActingDriverPlan, Distance, LocalPackage};
use crate::vehicle::{AllowanceTier, VehicleCategory};
use crate::MAX_AMOUNT;

// =============================================================================
// Per-Category Values
// =============================================================================

/// One amount per vehicle category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRates {
    pub hatchback: Money,
    pub sedan: Money,
    pub suv: Money,
    pub tempo_traveller: Money,
    pub van: Money,
    pub bus: Money,
}

impl CategoryRates {
    /// Builds from whole-rupee amounts, in `VehicleCategory::ALL` order.
    pub const fn from_rupees(values: [i64; 6]) -> Self {
        CategoryRates {
            hatchback: Money::from_rupees(values[0]),
            sedan: Money::from_rupees(values[1]),
            suv: Money::from_rupees(values[2]),
            tempo_traveller: Money::from_rupees(values[3]),
            van: Money::from_rupees(values[4]),
            bus: Money::from_rupees(values[5]),
        }
    }

    pub const fn get(&self, category: VehicleCategory) -> Money {
        match category {
            VehicleCategory::Hatchback => self.hatchback,
            VehicleCategory::Sedan => self.sedan,
            VehicleCategory::Suv => self.suv,
            VehicleCategory::TempoTraveller => self.tempo_traveller,
            VehicleCategory::Van => self.van,
            VehicleCategory::Bus => self.bus,
        }
    }
}

/// Four carrier tiers per vehicle category, cheapest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBrackets {
    pub hatchback: [Money; 4],
    pub sedan: [Money; 4],
    pub suv: [Money; 4],
    pub tempo_traveller: [Money; 4],
    pub van: [Money; 4],
    pub bus: [Money; 4],
}

impl CategoryBrackets {
    pub const fn get(&self, category: VehicleCategory) -> &[Money; 4] {
        match category {
            VehicleCategory::Hatchback => &self.hatchback,
            VehicleCategory::Sedan => &self.sedan,
            VehicleCategory::Suv => &self.suv,
            VehicleCategory::TempoTraveller => &self.tempo_traveller,
            VehicleCategory::Van => &self.van,
            VehicleCategory::Bus => &self.bus,
        }
    }
}

const fn tiers(values: [i64; 4]) -> [Money; 4] {
    [
        Money::from_rupees(values[0]),
        Money::from_rupees(values[1]),
        Money::from_rupees(values[2]),
        Money::from_rupees(values[3]),
    ]
}

// =============================================================================
// Sections
// =============================================================================

/// Distance-based charges shared by one-way, round-trip and self-drive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistanceRates {
    pub per_km: CategoryRates,
    /// Length of one toll block.
    pub toll_block_km: u32,
    /// Charged per started block.
    pub toll_block_rate: Money,
    /// Flat interstate permit fee.
    pub permit_fee: Money,
    /// Round trips bill at least this many km per day.
    pub round_trip_min_km_per_day: u32,
}

impl Default for DistanceRates {
    fn default() -> Self {
        DistanceRates {
            per_km: CategoryRates::from_rupees([12, 14, 18, 24, 20, 45]),
            toll_block_km: 100,
            toll_block_rate: Money::from_rupees(250),
            permit_fee: Money::from_rupees(800),
            round_trip_min_km_per_day: 250,
        }
    }
}

/// Driver allowance per day, by tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllowanceRates {
    pub economy: Money,
    pub standard: Money,
    pub premium: Money,
    pub group: Money,
}

impl AllowanceRates {
    pub const fn per_day(&self, tier: AllowanceTier) -> Money {
        match tier {
            AllowanceTier::Economy => self.economy,
            AllowanceTier::Standard => self.standard,
            AllowanceTier::Premium => self.premium,
            AllowanceTier::Group => self.group,
        }
    }
}

impl Default for AllowanceRates {
    fn default() -> Self {
        AllowanceRates {
            economy: Money::from_rupees(400),
            standard: Money::from_rupees(500),
            premium: Money::from_rupees(600),
            group: Money::from_rupees(800),
        }
    }
}

/// Local-hourly package prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalRates {
    pub four_hours: CategoryRates,
    pub eight_hours: CategoryRates,
    pub twelve_hours: CategoryRates,
    /// Per hour beyond the largest package.
    pub extra_hour: CategoryRates,
}

impl LocalRates {
    pub const fn package(&self, package: LocalPackage, category: VehicleCategory) -> Money {
        match package {
            LocalPackage::FourHours => self.four_hours.get(category),
            LocalPackage::EightHours => self.eight_hours.get(category),
            LocalPackage::TwelveHours => self.twelve_hours.get(category),
        }
    }
}

impl Default for LocalRates {
    fn default() -> Self {
        LocalRates {
            four_hours: CategoryRates::from_rupees([1000, 1200, 1600, 2500, 2000, 5000]),
            eight_hours: CategoryRates::from_rupees([1800, 2200, 2800, 4200, 3500, 8000]),
            twelve_hours: CategoryRates::from_rupees([2500, 3000, 3800, 5500, 4800, 11000]),
            extra_hour: CategoryRates::from_rupees([150, 180, 250, 350, 300, 700]),
        }
    }
}

/// Acting-driver rates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActingDriverRates {
    pub local_8_hours: Money,
    pub local_12_hours: Money,
    pub outstation: Money,
    /// Outstation only, when the customer doesn't feed the driver.
    pub food_per_day: Money,
    /// Outstation only, when the customer doesn't lodge the driver.
    pub stay_per_day: Money,
    /// Outstation only, the driver's trip home. Charged once.
    pub return_charge: Money,
}

impl ActingDriverRates {
    pub const fn per_day(&self, plan: ActingDriverPlan) -> Money {
        match plan {
            ActingDriverPlan::Local8Hours => self.local_8_hours,
            ActingDriverPlan::Local12Hours => self.local_12_hours,
            ActingDriverPlan::Outstation => self.outstation,
        }
    }
}

impl Default for ActingDriverRates {
    fn default() -> Self {
        ActingDriverRates {
            local_8_hours: Money::from_rupees(800),
            local_12_hours: Money::from_rupees(1000),
            outstation: Money::from_rupees(1200),
            food_per_day: Money::from_rupees(400),
            stay_per_day: Money::from_rupees(500),
            return_charge: Money::from_rupees(500),
        }
    }
}

/// Self-drive relocation fees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelfDriveRates {
    pub driver_fee: CategoryRates,
    pub fuel_per_km: CategoryRates,
    pub return_fee: Money,
}

impl Default for SelfDriveRates {
    fn default() -> Self {
        SelfDriveRates {
            driver_fee: CategoryRates::from_rupees([1500, 1500, 2000, 2500, 2000, 3500]),
            fuel_per_km: CategoryRates::from_rupees([6, 7, 9, 12, 9, 20]),
            return_fee: Money::from_rupees(1000),
        }
    }
}

/// Vehicle relocation rates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelocationRates {
    /// Upper bounds (inclusive, km) of the first three carrier tiers.
    pub bracket_limits_km: [u32; 3],
    pub carrier: CategoryBrackets,
    pub self_drive: SelfDriveRates,
}

impl RelocationRates {
    /// Carrier tier index (0-3) for a distance. Each limit belongs to the
    /// lower tier.
    pub fn carrier_tier(&self, distance: Distance) -> usize {
        self.bracket_limits_km
            .iter()
            .position(|&limit| distance.within_km(limit))
            .unwrap_or(self.bracket_limits_km.len())
    }
}

impl Default for RelocationRates {
    fn default() -> Self {
        RelocationRates {
            bracket_limits_km: [500, 1000, 1500],
            carrier: CategoryBrackets {
                hatchback: tiers([5000, 8000, 11000, 14000]),
                sedan: tiers([5000, 8000, 11000, 14000]),
                suv: tiers([6500, 10000, 13500, 17000]),
                tempo_traveller: tiers([9000, 14000, 19000, 24000]),
                van: tiers([7000, 11000, 15000, 19000]),
                bus: tiers([15000, 24000, 33000, 42000]),
            },
            self_drive: SelfDriveRates::default(),
        }
    }
}

// =============================================================================
// Rate Table
// =============================================================================

/// The complete rate configuration.
///
/// Missing sections or fields in a TOML file fall back to the built-in
/// values, so an override file only needs the lines it changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateTable {
    pub distance: DistanceRates,
    pub allowance: AllowanceRates,
    pub local: LocalRates,
    pub acting_driver: ActingDriverRates,
    pub relocation: RelocationRates,
}

impl RateTable {
    /// Per-day driver allowance for a vehicle category.
    pub const fn allowance_per_day(&self, category: VehicleCategory) -> Money {
        self.allowance.per_day(category.allowance_tier())
    }

    /// Checks the table's own invariants.
    ///
    /// ## Rules
    /// - Every amount is between zero and MAX_AMOUNT
    /// - Toll block length is at least 1 km
    /// - Bracket limits are positive and strictly ascending
    /// - Each category's carrier tiers are strictly ascending
    pub fn validate(&self) -> CoreResult<()> {
        if self.distance.toll_block_km == 0 {
            return Err(invalid("toll_block_km must be at least 1"));
        }

        let limits = &self.relocation.bracket_limits_km;
        if limits[0] == 0 || limits.windows(2).any(|w| w[0] >= w[1]) {
            return Err(invalid(format!(
                "bracket_limits_km must be positive and strictly ascending, got {:?}",
                limits
            )));
        }

        for category in VehicleCategory::ALL {
            let tiers = self.relocation.carrier.get(category);
            if tiers.windows(2).any(|w| w[0] >= w[1]) {
                return Err(invalid(format!(
                    "carrier tiers for {} must be strictly ascending",
                    category
                )));
            }
        }

        if let Some((name, amount)) = self.first_out_of_range() {
            return Err(invalid(format!(
                "{} must be between {} and {}, got {}",
                name,
                Money::zero(),
                MAX_AMOUNT,
                amount
            )));
        }

        Ok(())
    }

    /// Name and value of the first amount outside `0..=MAX_AMOUNT`.
    fn first_out_of_range(&self) -> Option<(String, Money)> {
        let out_of_range = |amount: Money| amount.is_negative() || amount > MAX_AMOUNT;

        let category_tables = [
            ("distance.per_km", &self.distance.per_km),
            ("local.four_hours", &self.local.four_hours),
            ("local.eight_hours", &self.local.eight_hours),
            ("local.twelve_hours", &self.local.twelve_hours),
            ("local.extra_hour", &self.local.extra_hour),
            ("relocation.self_drive.driver_fee", &self.relocation.self_drive.driver_fee),
            ("relocation.self_drive.fuel_per_km", &self.relocation.self_drive.fuel_per_km),
        ];
        for (section, rates) in category_tables {
            for category in VehicleCategory::ALL {
                let amount = rates.get(category);
                if out_of_range(amount) {
                    return Some((format!("{}.{}", section, category), amount));
                }
            }
        }

        for category in VehicleCategory::ALL {
            let tiers = self.relocation.carrier.get(category);
            if let Some(amount) = tiers.iter().copied().find(|a| out_of_range(*a)) {
                return Some((format!("relocation.carrier.{}", category), amount));
            }
        }

        let flat = [
            ("distance.toll_block_rate", self.distance.toll_block_rate),
            ("distance.permit_fee", self.distance.permit_fee),
            ("allowance.economy", self.allowance.economy),
            ("allowance.standard", self.allowance.standard),
            ("allowance.premium", self.allowance.premium),
            ("allowance.group", self.allowance.group),
            ("acting_driver.local_8_hours", self.acting_driver.local_8_hours),
            ("acting_driver.local_12_hours", self.acting_driver.local_12_hours),
            ("acting_driver.outstation", self.acting_driver.outstation),
            ("acting_driver.food_per_day", self.acting_driver.food_per_day),
            ("acting_driver.stay_per_day", self.acting_driver.stay_per_day),
            ("acting_driver.return_charge", self.acting_driver.return_charge),
            ("relocation.self_drive.return_fee", self.relocation.self_drive.return_fee),
        ];
        flat.iter()
            .find(|(_, amount)| out_of_range(*amount))
            .map(|(name, amount)| (name.to_string(), *amount))
    }
}

fn invalid(reason: impl Into<String>) -> CoreError {
    CoreError::InvalidRateTable {
        reason: reason.into(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_is_valid() {
        assert!(RateTable::default().validate().is_ok());
    }

    #[test]
    fn test_allowance_per_day_follows_tier() {
        let rates = RateTable::default();
        assert_eq!(
            rates.allowance_per_day(VehicleCategory::Suv),
            Money::from_rupees(600)
        );
        assert_eq!(
            rates.allowance_per_day(VehicleCategory::Hatchback),
            Money::from_rupees(400)
        );
        assert_eq!(
            rates.allowance_per_day(VehicleCategory::Van),
            Money::from_rupees(800)
        );
    }

    #[test]
    fn test_carrier_tier_boundaries() {
        let relocation = RelocationRates::default();
        let tier = |km: f64| relocation.carrier_tier(Distance::from_km(km).unwrap());

        assert_eq!(tier(0.0), 0);
        assert_eq!(tier(500.0), 0);
        assert_eq!(tier(500.5), 1);
        assert_eq!(tier(1000.0), 1);
        assert_eq!(tier(1500.0), 2);
        assert_eq!(tier(1501.0), 3);
        assert_eq!(tier(9000.0), 3);
    }

    #[test]
    fn test_rejects_negative_rate() {
        let mut rates = RateTable::default();
        rates.acting_driver.food_per_day = Money::from_rupees(-1);

        let err = rates.validate().unwrap_err();
        assert!(matches!(err, CoreError::InvalidRateTable { .. }));
        assert!(err.to_string().contains("acting_driver.food_per_day"));
    }

    #[test]
    fn test_rejects_amount_above_ceiling() {
        let mut rates = RateTable::default();
        rates.distance.toll_block_rate = Money::from_paise(100_000_000_000_000_000);

        let err = rates.validate().unwrap_err();
        assert!(err.to_string().contains("distance.toll_block_rate"));

        let mut rates = RateTable::default();
        rates.distance.permit_fee = MAX_AMOUNT;
        assert!(rates.validate().is_ok());
    }

    #[test]
    fn test_rejects_unordered_brackets() {
        let mut rates = RateTable::default();
        rates.relocation.bracket_limits_km = [500, 500, 1500];
        assert!(rates.validate().is_err());

        let mut rates = RateTable::default();
        rates.relocation.carrier.suv = tiers([6500, 6000, 13500, 17000]);
        let err = rates.validate().unwrap_err();
        assert!(err.to_string().contains("suv"));
    }

    #[test]
    fn test_rejects_zero_toll_block() {
        let mut rates = RateTable::default();
        rates.distance.toll_block_km = 0;
        assert!(rates.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let rates = RateTable::default();
        let text = toml::to_string(&rates).unwrap();
        let parsed: RateTable = toml::from_str(&text).unwrap();
        assert_eq!(parsed, rates);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let text = r#"
            [distance]
            permit_fee = 100000

            [acting_driver]
            outstation = 150000
        "#;
        let parsed: RateTable = toml::from_str(text).unwrap();

        assert_eq!(parsed.distance.permit_fee, Money::from_rupees(1000));
        assert_eq!(parsed.distance.toll_block_rate, Money::from_rupees(250));
        assert_eq!(parsed.acting_driver.outstation, Money::from_rupees(1500));
        assert_eq!(parsed.acting_driver.food_per_day, Money::from_rupees(400));
        assert_eq!(parsed.local, LocalRates::default());
    }
}
