//! Command handlers.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use cabfare_core::{
    classify_model_name, compute_fare, BookingForm, Money, RateTable, TripRequest, ValidationError,
    VehicleCategory, MAX_AMOUNT,
};
use cabfare_notify::{
    DeviceRegistry, DeviceToken, Notifier, NotifyConfig, PushNotification, SendReceipt,
    StaticTokenSource,
};
use tracing::{info, warn};

use crate::cli::{NotifyArgs, OutputFormat, QuoteCommand};
use crate::config::default_notify_config_path;
use crate::output::{emit, render_allowance, render_fare, render_report};
use crate::scenarios;

// =============================================================================
// Quote
// =============================================================================

pub fn quote(rates: &RateTable, trip: &QuoteCommand, format: OutputFormat) -> anyhow::Result<()> {
    let request = build_request(trip)?;
    let fare = compute_fare(rates, &request).context("Failed to price trip")?;
    emit(format, &fare, render_fare)
}

/// Turns the quote arguments into a trip request.
pub fn build_request(trip: &QuoteCommand) -> anyhow::Result<TripRequest> {
    let request = match trip {
        QuoteCommand::OneWay { km, vehicle, border } => {
            TripRequest::one_way(*km, resolve_vehicle(vehicle), *border)
        }
        QuoteCommand::RoundTrip {
            km,
            days,
            vehicle,
            border,
            allowance,
        } => {
            let mut request = TripRequest::round_trip(*km, *days, resolve_vehicle(vehicle), *border);
            request.driver_allowance_override = allowance
                .map(|rupees| rupees_to_money("driver_allowance_override", rupees))
                .transpose()?;
            request
        }
        QuoteCommand::Local { hours, vehicle } => {
            TripRequest::local_hourly(*hours, resolve_vehicle(vehicle))
        }
        QuoteCommand::ActingDriver {
            plan,
            days,
            food,
            stay,
        } => TripRequest::acting_driver(*plan, *days, *food, *stay),
        QuoteCommand::Relocation { km, vehicle, method } => {
            TripRequest::relocation(*km, resolve_vehicle(vehicle), *method)
        }
        QuoteCommand::Json { file } => read_request(file)?,
    };
    Ok(request)
}

/// An exact category name wins; anything else is a model name for the
/// keyword classifier.
fn resolve_vehicle(name: &str) -> VehicleCategory {
    if let Ok(category) = name.parse::<VehicleCategory>() {
        return category;
    }

    let matched = classify_model_name(name);
    if !matched.is_matched() {
        warn!(
            vehicle = name,
            fallback = %VehicleCategory::DEFAULT,
            "Vehicle not recognised, pricing as default category"
        );
    }
    matched.resolve()
}

/// Rupees typed on the command line, rejected when paise would overflow.
fn rupees_to_money(field: &str, rupees: i64) -> Result<Money, ValidationError> {
    Money::try_from_rupees(rupees).ok_or_else(|| ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: MAX_AMOUNT.rupees(),
    })
}

fn read_request(file: &Path) -> anyhow::Result<TripRequest> {
    let json = if file == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read trip request from stdin")?;
        buf
    } else {
        std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?
    };
    Ok(TripRequest::from_json(&json)?)
}

// =============================================================================
// Allowance
// =============================================================================

pub fn allowance(
    rates: &RateTable,
    model: &str,
    days: u32,
    manual: Option<i64>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let mut form = BookingForm::new(rates);
    form.select_vehicle(model)?;
    form.set_days(days)?;
    if let Some(rupees) = manual {
        form.override_allowance(rupees_to_money("driver_allowance_override", rupees)?)?;
    }

    emit(format, &form.snapshot(), render_allowance)
}

// =============================================================================
// Verify / Rates
// =============================================================================

pub fn verify(rates: &RateTable, format: OutputFormat) -> anyhow::Result<()> {
    let results = scenarios::run(rates).context("Failed to price comparison scenarios")?;
    emit(format, &results, |r| render_report(r))
}

pub fn rates(rates: &RateTable, format: OutputFormat) -> anyhow::Result<()> {
    let toml = toml::to_string_pretty(rates).context("Failed to serialise rate table")?;
    emit(format, rates, |_| toml)
}

// =============================================================================
// Notify
// =============================================================================

pub async fn notify(args: &NotifyArgs, format: OutputFormat) -> anyhow::Result<()> {
    let config_path = args.config.clone().or_else(default_notify_config_path);
    let config = NotifyConfig::load(config_path.as_deref()).context("Invalid notifier config")?;

    let source = StaticTokenSource::new(config.access_token.clone().unwrap_or_default());
    let notifier = Notifier::from_config(&config, source, Arc::new(DeviceRegistry::new()))?;

    let token = DeviceToken::parse(&args.token)?;
    let notification = args
        .data
        .iter()
        .fold(PushNotification::new(&args.title, &args.body), |n, (k, v)| {
            n.with_data(k, v)
        });

    info!(notification_id = %notification.id, "Sending push notification");
    let receipt = notifier.deliver(&token, &notification).await?;
    emit(format, &receipt, render_receipt)
}

fn render_receipt(receipt: &SendReceipt) -> String {
    format!("Delivered: {}\n", receipt.name)
}
