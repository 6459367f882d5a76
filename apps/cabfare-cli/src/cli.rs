//! Command-line arguments.

use std::path::PathBuf;

use cabfare_core::{ActingDriverPlan, RelocationMethod};
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "cabfare", version, about = "Cab fare calculator")]
pub struct Cli {
    /// Rate table (TOML). Falls back to CABFARE_RATES_PATH, then the user config dir.
    #[arg(long, global = true)]
    pub rates: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Price a trip
    Quote {
        #[command(subcommand)]
        trip: QuoteCommand,
    },
    /// Driver allowance for a vehicle model and trip length
    Allowance {
        /// Vehicle model as typed in the booking form, e.g. "Toyota Innova"
        model: String,
        #[arg(long, default_value_t = 1)]
        days: u32,
        /// Manual allowance in rupees (total, not per day)
        #[arg(long)]
        manual: Option<i64>,
    },
    /// Compare estimates for a fixed set of trips against market ranges
    Verify,
    /// Print the active rate table
    Rates,
    /// Send a push notification
    Notify(NotifyArgs),
}

#[derive(Subcommand, Debug)]
pub enum QuoteCommand {
    OneWay {
        #[arg(long)]
        km: f64,
        /// Category or model name
        #[arg(long, default_value = "sedan")]
        vehicle: String,
        #[arg(long, default_value_t = false)]
        border: bool,
    },
    RoundTrip {
        #[arg(long)]
        km: f64,
        #[arg(long, default_value_t = 1)]
        days: u32,
        #[arg(long, default_value = "sedan")]
        vehicle: String,
        #[arg(long, default_value_t = false)]
        border: bool,
        /// Manual driver allowance in rupees (total)
        #[arg(long)]
        allowance: Option<i64>,
    },
    Local {
        #[arg(long)]
        hours: u32,
        #[arg(long, default_value = "sedan")]
        vehicle: String,
    },
    ActingDriver {
        #[arg(long)]
        plan: ActingDriverPlan,
        #[arg(long, default_value_t = 1)]
        days: u32,
        /// Customer provides the driver's meals
        #[arg(long, default_value_t = false)]
        food: bool,
        /// Customer provides the driver's lodging
        #[arg(long, default_value_t = false)]
        stay: bool,
    },
    Relocation {
        #[arg(long)]
        km: f64,
        #[arg(long, default_value = "sedan")]
        vehicle: String,
        #[arg(long, default_value = "carrier")]
        method: RelocationMethod,
    },
    /// A trip request in booking-form JSON ("-" reads stdin)
    Json { file: PathBuf },
}

#[derive(clap::Args, Debug)]
pub struct NotifyArgs {
    /// FCM registration token of the target device
    #[arg(long)]
    pub token: String,
    #[arg(long)]
    pub title: String,
    #[arg(long, default_value = "")]
    pub body: String,
    /// Payload entries as key=value
    #[arg(long = "data", value_parser = parse_key_val)]
    pub data: Vec<(String, String)>,
    /// Notifier config (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    if key.trim().is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    Ok((key.trim().to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quote_one_way() {
        let cli = Cli::try_parse_from([
            "cabfare", "quote", "one-way", "--km", "345", "--border", "--format", "json",
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Quote {
                trip: QuoteCommand::OneWay { km, vehicle, border },
            } => {
                assert_eq!(km, 345.0);
                assert_eq!(vehicle, "sedan");
                assert!(border);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_acting_driver_plan() {
        let cli = Cli::try_parse_from([
            "cabfare", "quote", "acting-driver", "--plan", "outstation", "--days", "2",
        ])
        .unwrap();

        assert!(matches!(
            cli.command,
            Commands::Quote {
                trip: QuoteCommand::ActingDriver {
                    plan: ActingDriverPlan::Outstation,
                    days: 2,
                    ..
                }
            }
        ));
    }

    #[test]
    fn test_unknown_plan_rejected() {
        assert!(Cli::try_parse_from([
            "cabfare", "quote", "acting-driver", "--plan", "weekly",
        ])
        .is_err());
    }

    #[test]
    fn test_notify_data_pairs() {
        let cli = Cli::try_parse_from([
            "cabfare", "notify", "--token", "abc", "--title", "Hi", "--data", "booking_id=BK-1",
            "--data", "note=a=b",
        ])
        .unwrap();

        let Commands::Notify(args) = cli.command else {
            panic!("expected notify");
        };
        assert_eq!(
            args.data,
            vec![
                ("booking_id".to_string(), "BK-1".to_string()),
                ("note".to_string(), "a=b".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_key_val_requires_equals() {
        assert!(parse_key_val("novalue").is_err());
        assert!(parse_key_val("=x").is_err());
    }
}
