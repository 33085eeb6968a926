//! Command handlers

use crate::cli::{Cli, Commands, ReviewAction};
use crate::output::{
    output_analytics, output_owners, output_record, output_records, output_status,
    output_summary, output_vehicles,
};
use autotoll_api::TollApi;
use autotoll_app::{load_capture, Config};
use autotoll_domain::{promote, reconcile, reconcile_all};
use autotoll_types::{Error, OutputFormat, RegistrationForm, Result, VehicleType};
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    // Load config
    let mut config = Config::load()?;

    // Override from CLI args
    if let Some(ref base_url) = cli.base_url {
        config.base_url = base_url.clone();
    }

    let output_format = cli.format.unwrap_or(config.output_format);
    let api = TollApi::new(config.base_url.clone());

    if cli.verbose {
        eprintln!("Backend: {}", api.base_url());
    }

    match &cli.command {
        Commands::Analyze { image } => cmd_analyze(&api, &config, image.clone(), output_format).await,

        Commands::History { limit, review_only } => {
            cmd_history(&api, *limit, *review_only, output_format).await
        }

        Commands::Summary => {
            let summary = api.summary().await?;
            output_summary(output_format, &summary)
        }

        Commands::Analytics => {
            let report = api.analytics().await?;
            output_analytics(output_format, &report)
        }

        Commands::Review { action } => match action {
            ReviewAction::List => cmd_review_list(&api, output_format).await,
            ReviewAction::Confirm {
                id,
                vehicle_type,
                toll,
            } => cmd_review_confirm(&api, &config, *id, *vehicle_type, *toll).await,
            ReviewAction::Discard { id, yes } => cmd_review_discard(&api, *id, *yes).await,
        },

        Commands::Register {
            name,
            contact,
            plate,
            model,
            photo,
        } => {
            cmd_register(
                &api,
                name.clone(),
                contact.clone(),
                plate.clone(),
                model.clone(),
                photo.clone(),
            )
            .await
        }

        Commands::Import { file } => cmd_import(&api, file.clone()).await,

        Commands::Lookup { plate } => {
            let report = api.vehicle_status(plate).await?;
            output_status(output_format, &report)
        }

        Commands::Registry { owners, history } => {
            if let Some(vehicle_id) = history {
                let rows = api.vehicle_history(*vehicle_id).await?;
                let records = reconcile_all(&rows, api.base_url(), now_ms());
                output_records(output_format, &records)
            } else if *owners {
                let list = api.owners().await?;
                output_owners(output_format, &list)
            } else {
                let list = api.vehicles().await?;
                output_vehicles(output_format, &list)
            }
        }

        Commands::Watch { interval } => cmd_watch(&api, &config, *interval).await,

        Commands::Config {
            show,
            set_base_url,
            set_output,
            set_rate,
            set_history_poll,
            set_analytics_poll,
            reset,
        } => cmd_config(
            *show,
            set_base_url.clone(),
            *set_output,
            set_rate.clone(),
            *set_history_poll,
            *set_analytics_poll,
            *reset,
        ),
    }
}

async fn cmd_analyze(
    api: &TollApi,
    config: &Config,
    image: PathBuf,
    output_format: OutputFormat,
) -> Result<()> {
    let payload = load_capture(&image)?;

    let bar = spinner("Analyzing capture...");
    let outcome = api
        .analyze(&payload.file_name, &payload.mime, payload.bytes)
        .await;
    bar.finish_and_clear();

    let result = outcome?;
    let timestamp = now_ms();
    let record = promote(
        &result,
        &config.toll_rates,
        timestamp.to_string(),
        timestamp,
        String::new(),
    );

    output_record(output_format, &record)
}

async fn cmd_history(
    api: &TollApi,
    limit: usize,
    review_only: bool,
    output_format: OutputFormat,
) -> Result<()> {
    let rows = api.history().await?;
    let mut records = reconcile_all(&rows, api.base_url(), now_ms());

    if review_only {
        records.retain(|r| r.needs_review());
    }
    records.truncate(limit);

    output_records(output_format, &records)
}

async fn cmd_review_list(api: &TollApi, output_format: OutputFormat) -> Result<()> {
    let rows = api.review_queue().await?;
    let records = reconcile_all(&rows, api.base_url(), now_ms());
    output_records(output_format, &records)
}

async fn cmd_review_confirm(
    api: &TollApi,
    config: &Config,
    id: i64,
    vehicle_type: Option<VehicleType>,
    toll: Option<f64>,
) -> Result<()> {
    let rows = api.review_queue().await?;
    let row = rows
        .iter()
        .find(|r| r.id == id)
        .ok_or_else(|| Error::Rejected(format!("detection {id} is not awaiting review")))?;
    let record = reconcile(row, api.base_url(), now_ms());

    let vehicle_type = vehicle_type.unwrap_or(record.vehicle_type);
    let toll = toll.unwrap_or_else(|| config.toll_rates.rate(vehicle_type));
    if toll < 0.0 {
        return Err(Error::Rejected("toll amount must be zero or positive".to_string()));
    }

    api.confirm_detection(id, vehicle_type, toll).await?;
    println!("Confirmed {} as {} at {:.2}", id, vehicle_type, toll);
    Ok(())
}

async fn cmd_review_discard(api: &TollApi, id: i64, yes: bool) -> Result<()> {
    // Confirmation
    if !yes {
        println!("Discard detection {}? This cannot be undone. [y/N]", id);
        let mut input = String::new();
        std::io::stdin().read_line(&mut input).ok();
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    api.delete_detection(id).await?;
    println!("Discarded {}", id);
    Ok(())
}

async fn cmd_register(
    api: &TollApi,
    name: String,
    contact: String,
    plate: String,
    model: String,
    photo: Option<PathBuf>,
) -> Result<()> {
    let form = RegistrationForm {
        name,
        contact_info: contact,
        license_plate: plate,
        make_model: model,
        photo: photo.clone(),
    };

    let photo_part = match photo {
        Some(path) => {
            let payload = load_capture(&path)?;
            Some((payload.file_name, payload.bytes))
        }
        None => None,
    };

    api.register(&form, photo_part).await?;
    println!("Registered {} for {}", form.normalized_plate(), form.name);
    Ok(())
}

async fn cmd_import(api: &TollApi, file: PathBuf) -> Result<()> {
    if !file.exists() {
        return Err(Error::FileNotFound(file.display().to_string()));
    }
    let bytes = std::fs::read(&file)?;
    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "import".to_string());

    let bar = spinner("Importing registry rows...");
    let outcome = api.import(&file_name, bytes).await;
    bar.finish_and_clear();

    let outcome = outcome?;
    println!("Imported: {}  Failed: {}", outcome.imported, outcome.failed);
    Ok(())
}

async fn cmd_watch(api: &TollApi, config: &Config, interval_secs: Option<u64>) -> Result<()> {
    let secs = interval_secs.unwrap_or(config.history_poll_secs).max(1);
    let mut ticker = tokio::time::interval(Duration::from_secs(secs));

    println!("Watching {} every {}s (Ctrl-C to stop)", api.base_url(), secs);

    loop {
        ticker.tick().await;

        let summary = match api.summary().await {
            Ok(s) => s,
            Err(e) => {
                // Keep the last printed snapshot on a failed poll
                log::warn!("summary poll failed: {e}");
                continue;
            }
        };
        let rows = match api.history().await {
            Ok(r) => r,
            Err(e) => {
                log::warn!("history poll failed: {e}");
                continue;
            }
        };

        let mut records = reconcile_all(&rows, api.base_url(), now_ms());
        records.truncate(5);

        println!(
            "\n[{}] vehicles: {}  revenue: {:.2}  pending review: {}",
            Utc::now().format("%H:%M:%S"),
            summary.total_vehicles,
            summary.total_revenue,
            summary.pending_review,
        );
        for record in &records {
            println!(
                "  {:<6} {:<12} {:<12} {:>8.2}  {}",
                record.id,
                record.vehicle_type.label(),
                record.license_plate,
                record.toll_amount,
                record.status,
            );
        }
    }
}

fn cmd_config(
    show: bool,
    set_base_url: Option<String>,
    set_output: Option<OutputFormat>,
    set_rate: Vec<String>,
    set_history_poll: Option<u64>,
    set_analytics_poll: Option<u64>,
    reset: bool,
) -> Result<()> {
    let mut config = Config::load()?;
    let mut modified = false;

    if reset {
        config = Config::default();
        modified = true;
        println!("Configuration reset to defaults.");
    }

    if let Some(base_url) = set_base_url {
        config.base_url = base_url.trim_end_matches('/').to_string();
        modified = true;
    }
    if let Some(format) = set_output {
        config.output_format = format;
        modified = true;
    }
    for entry in &set_rate {
        let (vehicle_type, amount) = parse_rate(entry)?;
        config.toll_rates.set(vehicle_type, amount);
        modified = true;
    }
    if let Some(secs) = set_history_poll {
        config.history_poll_secs = secs.max(1);
        modified = true;
    }
    if let Some(secs) = set_analytics_poll {
        config.analytics_poll_secs = secs.max(1);
        modified = true;
    }

    if modified {
        config.save()?;
        println!("Configuration saved.");
    }

    if show || !modified {
        println!("{}", config);
    }

    Ok(())
}

/// Parse a "type=amount" rate override
fn parse_rate(entry: &str) -> Result<(VehicleType, f64)> {
    let (name, amount) = entry
        .split_once('=')
        .ok_or_else(|| Error::Rejected(format!("expected TYPE=AMOUNT, got '{entry}'")))?;

    let vehicle_type: VehicleType = name.parse().unwrap_or(VehicleType::Unknown);
    if vehicle_type == VehicleType::Unknown && !name.trim().eq_ignore_ascii_case("unknown") {
        return Err(Error::Rejected(format!("unknown vehicle type '{name}'")));
    }

    let amount: f64 = amount
        .trim()
        .parse()
        .map_err(|_| Error::Rejected(format!("invalid amount '{amount}'")))?;
    if amount < 0.0 {
        return Err(Error::Rejected("rate must be zero or positive".to_string()));
    }

    Ok((vehicle_type, amount))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rate_overrides() {
        assert_eq!(parse_rate("truck=12.5").unwrap(), (VehicleType::Truck, 12.5));
        assert_eq!(parse_rate("Unknown=9").unwrap(), (VehicleType::Unknown, 9.0));
        assert!(parse_rate("hovercraft=3").is_err());
        assert!(parse_rate("truck").is_err());
        assert!(parse_rate("truck=-1").is_err());
    }
}
