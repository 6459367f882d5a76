//! # Vehicle Classification
//!
//! Maps vehicles to the category that picks their rates.
//!
//! ## Two Signals
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Structured category (preferred)                                        │
//! │    "suv".parse::<VehicleCategory>()   → Ok(Suv)                         │
//! │    "spaceship".parse()                → Err(InvalidRequest)             │
//! │                                                                         │
//! │  Free-text model name (booking form dropdown label)                     │
//! │    classify_model_name("Toyota Innova Crysta") → Matched(Suv)           │
//! │    classify_model_name("Mystery Machine")      → Unmatched              │
//! │    ModelMatch::Unmatched.resolve()             → Sedan (DEFAULT)        │
//! │                                                                         │
//! │  Category → allowance tier is an exhaustive match, decided once.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};

// =============================================================================
// Vehicle Category
// =============================================================================

/// Rate category of a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum VehicleCategory {
    Hatchback,
    Sedan,
    /// SUVs and MUVs (Innova class).
    Suv,
    TempoTraveller,
    Van,
    Bus,
}

impl VehicleCategory {
    /// Category used when a model name matches no keyword set.
    pub const DEFAULT: VehicleCategory = VehicleCategory::Sedan;

    pub const ALL: [VehicleCategory; 6] = [
        VehicleCategory::Hatchback,
        VehicleCategory::Sedan,
        VehicleCategory::Suv,
        VehicleCategory::TempoTraveller,
        VehicleCategory::Van,
        VehicleCategory::Bus,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            VehicleCategory::Hatchback => "hatchback",
            VehicleCategory::Sedan => "sedan",
            VehicleCategory::Suv => "suv",
            VehicleCategory::TempoTraveller => "tempo_traveller",
            VehicleCategory::Van => "van",
            VehicleCategory::Bus => "bus",
        }
    }

    /// Driver allowance tier for outstation trips.
    pub const fn allowance_tier(&self) -> AllowanceTier {
        match self {
            VehicleCategory::Hatchback => AllowanceTier::Economy,
            VehicleCategory::Sedan => AllowanceTier::Standard,
            VehicleCategory::Suv => AllowanceTier::Premium,
            VehicleCategory::TempoTraveller | VehicleCategory::Van | VehicleCategory::Bus => {
                AllowanceTier::Group
            }
        }
    }
}

impl fmt::Display for VehicleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleCategory {
    type Err = CoreError;

    /// Strict parse of a structured category; "car" is accepted as sedan.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "hatchback" | "hatch" => Ok(VehicleCategory::Hatchback),
            "sedan" | "car" => Ok(VehicleCategory::Sedan),
            "suv" | "muv" | "innova" => Ok(VehicleCategory::Suv),
            "tempo_traveller" | "tempo" | "traveller" => Ok(VehicleCategory::TempoTraveller),
            "van" => Ok(VehicleCategory::Van),
            "bus" | "coach" => Ok(VehicleCategory::Bus),
            _ => Err(ValidationError::NotAllowed {
                field: "vehicle_category".to_string(),
                allowed: VehicleCategory::ALL
                    .iter()
                    .map(|c| c.as_str().to_string())
                    .collect(),
            }
            .into()),
        }
    }
}

// =============================================================================
// Allowance Tier
// =============================================================================

/// Per-day driver allowance tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum AllowanceTier {
    /// Hatchbacks.
    Economy,
    /// Sedans and unmatched model names.
    Standard,
    /// SUVs / MUVs.
    Premium,
    /// Tempo travellers, vans, buses.
    Group,
}

// =============================================================================
// Keyword Classifier
// =============================================================================

/// Keyword sets, checked in order. Larger vehicles come first so that
/// "Force Tempo Traveller" never falls through to a car keyword, and sedans
/// before hatchbacks so "Swift Dzire" is a sedan.
const KEYWORDS: &[(VehicleCategory, &[&str])] = &[
    (VehicleCategory::Bus, &["bus", "coach"]),
    (
        VehicleCategory::TempoTraveller,
        &["tempo", "traveller", "traveler", "urbania"],
    ),
    (VehicleCategory::Van, &["van", "eeco", "omni"]),
    (
        VehicleCategory::Suv,
        &[
            "innova", "suv", "ertiga", "crysta", "xylo", "marazzo", "scorpio", "xuv", "carens",
            "fortuner",
        ],
    ),
    (
        VehicleCategory::Sedan,
        &["sedan", "dzire", "etios", "verna", "ciaz", "amaze", "aura", "city"],
    ),
    (
        VehicleCategory::Hatchback,
        &["hatchback", "swift", "wagon", "wagonr", "alto", "celerio", "kwid", "tiago", "i10", "i20"],
    ),
];

/// Outcome of matching a model name against the keyword sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelMatch {
    Matched(VehicleCategory),
    Unmatched,
}

impl ModelMatch {
    /// Category to price with. Unmatched names use `VehicleCategory::DEFAULT`.
    pub const fn resolve(self) -> VehicleCategory {
        match self {
            ModelMatch::Matched(category) => category,
            ModelMatch::Unmatched => VehicleCategory::DEFAULT,
        }
    }

    pub const fn is_matched(&self) -> bool {
        matches!(self, ModelMatch::Matched(_))
    }
}

/// Classifies a free-text vehicle model name.
///
/// The name is split into words on anything that isn't a letter or digit.
/// A keyword matches a whole word, optionally followed by a model number
/// ("xuv700"), so "Innova Business" is an SUV and "Caravan" matches nothing.
///
/// ## Example
/// ```rust
/// use cabfare_core::vehicle::{classify_model_name, AllowanceTier, ModelMatch, VehicleCategory};
///
/// assert_eq!(
///     classify_model_name("Toyota Innova"),
///     ModelMatch::Matched(VehicleCategory::Suv)
/// );
/// assert_eq!(
///     classify_model_name("Toyota Innova").resolve().allowance_tier(),
///     AllowanceTier::Premium
/// );
/// assert_eq!(classify_model_name("DeLorean").resolve(), VehicleCategory::Sedan);
/// ```
pub fn classify_model_name(name: &str) -> ModelMatch {
    let lowered = name.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    for (category, keywords) in KEYWORDS {
        if keywords
            .iter()
            .any(|k| words.iter().any(|w| word_matches(w, k)))
        {
            return ModelMatch::Matched(*category);
        }
    }

    debug!(model = %name, "Vehicle model matched no keyword set, using default tier");
    ModelMatch::Unmatched
}

fn word_matches(word: &str, keyword: &str) -> bool {
    word.strip_prefix(keyword)
        .is_some_and(|rest| rest.chars().all(|c| c.is_ascii_digit()))
}

/// Like [`classify_model_name`] but reports unmatched names as an error.
pub fn classify_model_name_strict(name: &str) -> CoreResult<VehicleCategory> {
    match classify_model_name(name) {
        ModelMatch::Matched(category) => Ok(category),
        ModelMatch::Unmatched => Err(CoreError::UnknownCategory {
            name: name.to_string(),
        }),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
