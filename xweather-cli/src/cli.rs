use anyhow::Result;
use clap::{Parser, Subcommand};
use inquire::{CustomType, Password, Select, Text};
use tokio::sync::watch;

use xweather_core::config::{DEFAULT_NAME, DEFAULT_UPDATE_INTERVAL};
use xweather_core::reader::{CURRENT_FIELDS, field_spec};
use xweather_core::{Config, Coordinator, RefreshState, Section, SnapshotReader, Units, XweatherClient};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "xweather", version, about = "Xweather polling adapter CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure API credentials and location interactively.
    Configure,

    /// Fetch once and print current conditions, air quality and outlook.
    Show {
        /// Override the configured measurement system (metric or imperial).
        #[arg(long)]
        units: Option<String>,
    },

    /// Poll at the configured interval and print every update until Ctrl-C.
    Watch,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { units } => show(units).await,
            Command::Watch => watch_updates().await,
        }
    }
}

fn configure() -> Result<()> {
    let client_id = Text::new("Client ID:").prompt()?;
    let client_secret = Password::new("Client secret:")
        .without_confirmation()
        .prompt()?;
    let latitude = CustomType::<f64>::new("Latitude:").prompt()?;
    let longitude = CustomType::<f64>::new("Longitude:").prompt()?;
    let name = Text::new("Display name:")
        .with_default(DEFAULT_NAME)
        .prompt()?;
    let update_interval = CustomType::<u64>::new("Update interval (minutes):")
        .with_default(DEFAULT_UPDATE_INTERVAL)
        .prompt()?;
    let units = Select::new("Measurement system:", vec![Units::Metric, Units::Imperial]).prompt()?;

    let mut config = Config::new(client_id, client_secret, latitude, longitude);
    config.name = name;
    config.update_interval = update_interval;
    config.units = units;
    config.save()?;

    println!(
        "Configuration written to {}",
        Config::config_file_path()?.display()
    );
    Ok(())
}

async fn show(units_override: Option<String>) -> Result<()> {
    let config = Config::load()?;
    let units = match units_override {
        Some(s) => Units::try_from(s.as_str())?,
        None => config.units,
    };

    let coordinator = start_coordinator(&config).await?;
    print_report(&coordinator.reader(), &config, units);
    Ok(())
}

async fn watch_updates() -> Result<()> {
    let config = Config::load()?;
    let coordinator = start_coordinator(&config).await?;

    let mut updates = coordinator.subscribe();
    let (shutdown_tx, shutdown_rx) = watch::channel(());
    let poll_task = coordinator.spawn(shutdown_rx);

    let reader = coordinator.reader();
    print_report(&reader, &config, config.units);
    println!("Polling every {} minutes; Ctrl-C to stop.", config.update_interval);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let published = updates.borrow_and_update().clone();
                match published.state {
                    RefreshState::Idle => {
                        println!("[{}] updated", chrono::Local::now().format("%H:%M:%S"));
                        print_report(&reader, &config, config.units);
                    }
                    RefreshState::Failed => {
                        if let Some(err) = published.last_error {
                            eprintln!("refresh failed: {err}");
                        }
                    }
                    RefreshState::Refreshing => {}
                }
            }
        }
    }

    shutdown_tx.send(()).ok();
    poll_task.await.ok();
    Ok(())
}

async fn start_coordinator(config: &Config) -> Result<std::sync::Arc<Coordinator>> {
    let client = XweatherClient::new(config);
    let coordinator = Coordinator::new(Box::new(client), config);
    coordinator
        .first_refresh()
        .await
        .map_err(|err| anyhow::anyhow!("{err}"))?;
    Ok(coordinator)
}

fn print_report(reader: &SnapshotReader, config: &Config, units: Units) {
    println!("{} ({})", config.name, units);

    if let Some(condition) = reader.current_condition() {
        println!("  Conditions: {condition}");
    }

    for spec in CURRENT_FIELDS {
        match reader.value(spec, 0, units) {
            Some(value) => println!("  {}: {value} {}", spec.name, spec.unit(units)),
            None => println!("  {}: unavailable", spec.name),
        }
    }

    if let Some(aqi) = reader.aqi() {
        let category = reader.aqi_category().unwrap_or_default();
        println!("  Air Quality Index: {aqi} {category}");
    }
    if let Some(dominant) = reader.dominant_pollutant() {
        println!("  Dominant Pollutant: {dominant}");
    }
    for key in ["o3", "pm2.5", "pm10", "co", "no2", "so2"] {
        if let Some(concentration) = reader.pollutant_concentration(key) {
            println!("  {key}: {concentration} µg/m³");
        }
    }

    print_outlook(reader, units);
}

fn print_outlook(reader: &SnapshotReader, units: Units) {
    let high = field_spec(Section::ForecastDaily, "high_temp");
    let low = field_spec(Section::ForecastDaily, "low_temp");
    let labels = ["Today", "Tomorrow"];

    for (offset, label) in labels.iter().enumerate() {
        let Some(condition) = reader.daily_condition(offset) else {
            continue;
        };
        let mut line = format!("  {label}: {condition}");
        if let Some(spec) = high {
            if let Some(value) = reader.value(spec, offset, units) {
                line.push_str(&format!(", high {value} {}", spec.unit(units)));
            }
        }
        if let Some(spec) = low {
            if let Some(value) = reader.value(spec, offset, units) {
                line.push_str(&format!(", low {value} {}", spec.unit(units)));
            }
        }
        println!("{line}");
    }
}
