use anyhow::Context;
use clap::{Parser, Subcommand};
use dashboard_core::{Config, Dashboard, MemoryStore, OpenWeatherProvider, RunSummary, S3Store};
use inquire::{Password, Text};
use tracing::info;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-dashboard", version, about = "Weather dashboard pipeline")]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch, archive and publish the dashboard once.
    Run {
        /// City to fetch; repeat to override the configured list.
        #[arg(long = "city", value_name = "CITY")]
        cities: Vec<String>,

        /// Keep uploads in memory and list them instead of writing to S3.
        #[arg(long)]
        dry_run: bool,
    },

    /// Interactively store the API key and bucket in the config file.
    Configure,

    /// Print the config file location.
    ConfigPath,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Run { cities, dry_run } => {
                let mut config = Config::resolve()?;
                if !cities.is_empty() {
                    config.cities = cities;
                }
                run_pipeline(&config, dry_run).await
            }
            Command::Configure => configure(),
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
                Ok(())
            }
        }
    }
}

/// Per-city and publish failures are logged, never turned into an error exit.
async fn run_pipeline(config: &Config, dry_run: bool) -> anyhow::Result<()> {
    let provider = OpenWeatherProvider::from_config(config)?;

    let summary = if dry_run {
        let store = MemoryStore::new(config.bucket.clone());
        let summary = Dashboard::new(&provider, &store, config)
            .run(&config.cities)
            .await;
        summary
    } else {
        let store = S3Store::from_config(config).context("Storage client unavailable")?;
        let summary = Dashboard::new(&provider, &store, config)
            .run(&config.cities)
            .await;
        summary
    };

    log_summary(&summary, &config.report_key, dry_run);
    Ok(())
}

fn log_summary(summary: &RunSummary, report_key: &str, dry_run: bool) {
    for outcome in summary.failed() {
        info!(city = %outcome.city, state = ?outcome.state, "City excluded from report");
    }

    if dry_run {
        for key in planned_uploads(summary, report_key) {
            info!(key = %key, "Dry run: would upload");
        }
    }
}

/// Keys a run wrote: archived observations in city order, then the report.
fn planned_uploads(summary: &RunSummary, report_key: &str) -> Vec<String> {
    let mut keys: Vec<String> = summary
        .included()
        .filter_map(|outcome| outcome.archive_key.clone())
        .collect();
    if summary.published {
        keys.push(report_key.to_string());
    }
    keys
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    config.api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()?;
    config.bucket = Text::new("Bucket name:")
        .with_default(&config.bucket)
        .prompt()?;
    config.region = Text::new("Region:")
        .with_default(&config.region)
        .prompt()?;

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_core::{CityOutcome, CityState};

    fn outcome(city: &str, state: CityState, key: Option<&str>) -> CityOutcome {
        CityOutcome {
            city: city.to_string(),
            state,
            archive_key: key.map(str::to_string),
            error: None,
        }
    }

    #[test]
    fn planned_uploads_list_archives_then_report() {
        let summary = RunSummary {
            bucket: None,
            cities: vec![
                outcome("Rabat", CityState::IncludedInReport, Some("weather-data/Rabat-1.json")),
                outcome("Ottawa", CityState::FetchFailed, None),
                outcome("Tokyo", CityState::IncludedInReport, Some("weather-data/Tokyo-1.json")),
            ],
            report_rows: Vec::new(),
            published: true,
            publish_error: None,
        };

        assert_eq!(
            planned_uploads(&summary, "weather-dashboard.html"),
            vec![
                "weather-data/Rabat-1.json",
                "weather-data/Tokyo-1.json",
                "weather-dashboard.html",
            ]
        );
    }

    #[test]
    fn unpublished_report_is_not_listed() {
        let summary = RunSummary {
            bucket: None,
            cities: vec![outcome("Rabat", CityState::ArchiveFailed, None)],
            report_rows: Vec::new(),
            published: false,
            publish_error: Some("denied".into()),
        };

        assert!(planned_uploads(&summary, "weather-dashboard.html").is_empty());
    }

    #[test]
    fn run_collects_repeated_cities() {
        let cli = Cli::parse_from([
            "weather-dashboard",
            "-v",
            "run",
            "--city",
            "Lima",
            "--city",
            "Oslo",
            "--dry-run",
        ]);

        assert_eq!(cli.verbose, 1);
        match cli.command {
            Command::Run { cities, dry_run } => {
                assert_eq!(cities, vec!["Lima", "Oslo"]);
                assert!(dry_run);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn run_without_cities_keeps_configured_list() {
        let cli = Cli::parse_from(["weather-dashboard", "run"]);

        match cli.command {
            Command::Run { cities, dry_run } => {
                assert!(cities.is_empty());
                assert!(!dry_run);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
