//! # Rate Table Loading
//!
//! ## Resolution Order
//! ```text
//! --rates <path>            must exist
//!   └─ CABFARE_RATES_PATH   must exist
//!        └─ <config dir>/cabfare/rates.toml   optional
//!             └─ built-in RateTable::default()
//! ```
//!
//! Then the env overrides (amounts in rupees) are applied and the result is
//! validated:
//!
//! | Variable                  | Field                        |
//! |---------------------------|------------------------------|
//! | `CABFARE_TOLL_BLOCK_RATE` | `distance.toll_block_rate`   |
//! | `CABFARE_PERMIT_FEE`      | `distance.permit_fee`        |

use std::path::{Path, PathBuf};

use cabfare_core::{CoreError, Money, RateTable};
use thiserror::Error;
use tracing::{debug, info, warn};

pub const RATES_PATH_ENV: &str = "CABFARE_RATES_PATH";
pub const TOLL_BLOCK_RATE_ENV: &str = "CABFARE_TOLL_BLOCK_RATE";
pub const PERMIT_FEE_ENV: &str = "CABFARE_PERMIT_FEE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Rate file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid value for {var}: '{value}' (expected whole rupees)")]
    InvalidOverride { var: &'static str, value: String },

    #[error(transparent)]
    InvalidRates(#[from] CoreError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Loads the rate table the way the CLI uses it.
pub fn load_rates(explicit: Option<&Path>) -> ConfigResult<RateTable> {
    let env_path = std::env::var_os(RATES_PATH_ENV).map(PathBuf::from);
    let mut rates = load_rates_from(explicit, env_path.as_deref(), default_rates_path().as_deref())?;
    apply_env_overrides(&mut rates, |var| std::env::var(var).ok())?;
    rates.validate()?;
    Ok(rates)
}

/// Reads the first configured rate file, or the built-in table.
///
/// A path the user named (flag or env) must exist; the default location is
/// optional.
pub fn load_rates_from(
    explicit: Option<&Path>,
    from_env: Option<&Path>,
    default_path: Option<&Path>,
) -> ConfigResult<RateTable> {
    if let Some(path) = explicit.or(from_env) {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        return read_rate_file(path);
    }

    match default_path {
        Some(path) if path.exists() => read_rate_file(path),
        _ => {
            debug!("No rate file, using built-in rates");
            Ok(RateTable::default())
        }
    }
}

fn read_rate_file(path: &Path) -> ConfigResult<RateTable> {
    info!(?path, "Loading rate table");
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Applies rupee overrides from the environment.
///
/// `lookup` is `std::env::var` in production.
pub fn apply_env_overrides(
    rates: &mut RateTable,
    lookup: impl Fn(&str) -> Option<String>,
) -> ConfigResult<()> {
    if let Some(value) = lookup(TOLL_BLOCK_RATE_ENV) {
        let rate = parse_rupees(TOLL_BLOCK_RATE_ENV, &value)?;
        warn!(toll_block_rate = %rate, "Overriding toll block rate from environment");
        rates.distance.toll_block_rate = rate;
    }

    if let Some(value) = lookup(PERMIT_FEE_ENV) {
        let fee = parse_rupees(PERMIT_FEE_ENV, &value)?;
        warn!(permit_fee = %fee, "Overriding permit fee from environment");
        rates.distance.permit_fee = fee;
    }

    Ok(())
}

fn parse_rupees(var: &'static str, value: &str) -> ConfigResult<Money> {
    value
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|rupees| *rupees >= 0)
        .and_then(Money::try_from_rupees)
        .ok_or_else(|| ConfigError::InvalidOverride {
            var,
            value: value.to_string(),
        })
}

/// `~/.config/cabfare/rates.toml` on Linux, the platform equivalent elsewhere.
pub fn default_rates_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "cabfare", "cabfare")
        .map(|dirs| dirs.config_dir().join("rates.toml"))
}

/// Where the notifier config lives when `--config` is not given.
pub fn default_notify_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "cabfare", "cabfare")
        .map(|dirs| dirs.config_dir().join("notify.toml"))
}
