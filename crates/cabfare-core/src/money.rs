//! # Money Module
//!
//! Provides the `Money` type for fare amounts.
//!
//! ## Why Integer Paise?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  A booking form in JavaScript computes:                                 │
//! │    345.3 km × ₹14 = 4834.200000000001  ❌ WRONG!                         │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Paise (1 rupee = 100 paise)                      │
//! │    345_300 m × 1400 paise/km = 483_420 paise = ₹4834.20                 │
//! │    Rounding happens exactly once, at the per-km multiplication          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use cabfare_core::money::Money;
//!
//! let toll_block = Money::from_rupees(250);
//! let toll = toll_block * 4u32;
//! assert_eq!(toll.rupees(), 1000);
//! assert_eq!(toll.to_string(), "₹1000.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use ts_rs::TS;

use crate::types::Distance;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in paise (1/100 of a rupee).
///
/// ## Design Decisions
/// - **i64 (signed)**: arithmetic stays closed under subtraction; the fare
///   engine itself only ever produces non-negative amounts
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Serde as plain integer**: the booking form sends and receives paise
///
/// ## Where Money is Used
/// ```text
/// RateTable (per-km, toll block, permit, allowances)
///      │
///      ▼
/// Fare engine ──► ChargeLine.amount ──► FareBreakdown.total
///      │
///      └──► Displayed as "₹6630.00" in CLI reports
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise.
    ///
    /// ## Example
    /// ```rust
    /// use cabfare_core::money::Money;
    ///
    /// let fare = Money::from_paise(483_050);
    /// assert_eq!(fare.rupees(), 4830);
    /// assert_eq!(fare.paise_part(), 50);
    /// ```
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from whole rupees.
    ///
    /// Every rate in the default table is a whole-rupee amount. For amounts
    /// typed by a user, use [`Money::try_from_rupees`].
    #[inline]
    pub const fn from_rupees(rupees: i64) -> Self {
        Money(rupees * 100)
    }

    /// Creates a Money value from whole rupees, or `None` if the paise
    /// value doesn't fit in an i64.
    ///
    /// ## Example
    /// ```rust
    /// use cabfare_core::money::Money;
    ///
    /// assert_eq!(Money::try_from_rupees(250), Some(Money::from_paise(25_000)));
    /// assert_eq!(Money::try_from_rupees(i64::MAX / 10), None);
    /// ```
    #[inline]
    pub const fn try_from_rupees(rupees: i64) -> Option<Self> {
        match rupees.checked_mul(100) {
            Some(paise) => Some(Money(paise)),
            None => None,
        }
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee portion.
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the paise portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a count (days, blocks, hours), `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use cabfare_core::money::Money;
    ///
    /// let per_day = Money::from_rupees(1200);
    /// assert_eq!(per_day.checked_mul(2).map(|m| m.rupees()), Some(2400));
    /// assert_eq!(Money::from_paise(i64::MAX).checked_mul(2), None);
    /// ```
    #[inline]
    pub const fn checked_mul(&self, qty: u32) -> Option<Self> {
        match self.0.checked_mul(qty as i64) {
            Some(paise) => Some(Money(paise)),
            None => None,
        }
    }

    /// Adds two amounts, `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(paise) => Some(Money(paise)),
            None => None,
        }
    }

    /// Prices a distance at this per-kilometre rate.
    ///
    /// ## Implementation
    /// Distances are stored in metres, so the product is divided by 1000.
    /// We use `(paise_per_km * metres + 500) / 1000` to round half up,
    /// in i128 so long relocations can't overflow.
    ///
    /// ## Example
    /// ```rust
    /// use cabfare_core::money::Money;
    /// use cabfare_core::types::Distance;
    ///
    /// let sedan_rate = Money::from_rupees(14);
    /// let distance = Distance::from_km(345.0).unwrap();
    /// assert_eq!(sedan_rate.per_km(distance).rupees(), 4830);
    /// ```
    pub fn per_km(&self, distance: Distance) -> Money {
        self.checked_per_km(distance)
            .unwrap_or(if self.0 < 0 { Money(i64::MIN) } else { Money(i64::MAX) })
    }

    /// Like [`Money::per_km`], but `None` when the result doesn't fit in
    /// an i64 instead of saturating.
    pub fn checked_per_km(&self, distance: Distance) -> Option<Money> {
        let paise = (self.0 as i128 * distance.metres() as i128 + 500) / 1000;
        i64::try_from(paise).ok().map(Money)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows rupees with two decimal places, e.g. `₹6630.00`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}₹{}.{:02}",
            sign,
            self.rupees().abs(),
            self.paise_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Multiplication by a count (days, toll blocks).
impl Mul<u32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: u32) -> Self {
        Money(self.0 * qty as i64)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
