//! Sequential fetch → archive → report pipeline.
//!
//! Each city moves through [`CityState`]; only cities that reach
//! `Archived` are included in the report. The report is rendered and
//! published exactly once per run, whatever happened to the cities.

use tracing::{info, warn};

use crate::{
    Config,
    archive::ArchiveWriter,
    model::Observation,
    provider::WeatherProvider,
    report::{ReportError, ReportPublisher, render_report, stage_report},
    storage::{BucketStatus, ObjectStore, ensure_bucket},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CityState {
    Pending,
    Fetched,
    Archived,
    IncludedInReport,
    FetchFailed,
    ArchiveFailed,
}

impl CityState {
    pub fn is_failure(self) -> bool {
        matches!(self, CityState::FetchFailed | CityState::ArchiveFailed)
    }
}

#[derive(Debug, Clone)]
pub struct CityOutcome {
    pub city: String,
    pub state: CityState,
    pub archive_key: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    /// `None` when the bucket could neither be confirmed nor created.
    pub bucket: Option<BucketStatus>,
    pub cities: Vec<CityOutcome>,
    /// Observations in the published report, in city-list order.
    pub report_rows: Vec<Observation>,
    pub published: bool,
    /// Rendered `ReportError` when the upload did not happen.
    pub publish_error: Option<String>,
}

impl RunSummary {
    pub fn included(&self) -> impl Iterator<Item = &CityOutcome> {
        self.cities
            .iter()
            .filter(|c| c.state == CityState::IncludedInReport)
    }

    pub fn failed(&self) -> impl Iterator<Item = &CityOutcome> {
        self.cities.iter().filter(|c| c.state.is_failure())
    }
}

/// Drives one run. Borrows its collaborators; holds no state between runs.
#[derive(Debug)]
pub struct Dashboard<'a> {
    provider: &'a dyn WeatherProvider,
    store: &'a dyn ObjectStore,
    config: &'a Config,
}

impl<'a> Dashboard<'a> {
    pub fn new(
        provider: &'a dyn WeatherProvider,
        store: &'a dyn ObjectStore,
        config: &'a Config,
    ) -> Self {
        Self {
            provider,
            store,
            config,
        }
    }

    pub async fn run(&self, cities: &[String]) -> RunSummary {
        let bucket = match ensure_bucket(self.store).await {
            Ok(status) => Some(status),
            Err(err) => {
                warn!(bucket = self.store.bucket(), error = %err, "Error creating bucket");
                None
            }
        };

        let archive = ArchiveWriter::new(self.store, &self.config.archive_prefix);
        let mut outcomes = Vec::with_capacity(cities.len());
        let mut report_rows = Vec::new();

        for city in cities {
            let (mut outcome, observation) = self.process_city(&archive, city).await;
            if let Some(obs) = observation {
                report_rows.push(obs);
                outcome.state = CityState::IncludedInReport;
            }
            outcomes.push(outcome);
        }

        let (published, publish_error) = match self.publish_report(&report_rows).await {
            Ok(()) => (true, None),
            Err(err) => {
                warn!(key = %self.config.report_key, error = %err, "Error uploading HTML report");
                (false, Some(err.to_string()))
            }
        };

        let summary = RunSummary {
            bucket,
            cities: outcomes,
            report_rows,
            published,
            publish_error,
        };

        info!(
            included = summary.included().count(),
            failed = summary.failed().count(),
            published = summary.published,
            "Run complete"
        );

        summary
    }

    /// Fetch and archive one city. Returns the observation only if it was archived.
    async fn process_city(
        &self,
        archive: &ArchiveWriter<'_>,
        city: &str,
    ) -> (CityOutcome, Option<Observation>) {
        let mut outcome = CityOutcome {
            city: city.to_string(),
            state: CityState::Pending,
            archive_key: None,
            error: None,
        };

        info!(city, "Fetching weather");
        let observation = match self.provider.fetch_current(city).await {
            Ok(obs) => obs,
            Err(err) => {
                warn!(city, error = %err, "Failed to fetch weather data");
                outcome.state = CityState::FetchFailed;
                outcome.error = Some(err.to_string());
                return (outcome, None);
            }
        };
        outcome.state = CityState::Fetched;

        info!(
            city,
            temperature_c = observation.temperature_c,
            feels_like_c = observation.feels_like_c,
            humidity_pct = observation.humidity_pct,
            condition = %observation.condition,
            "Fetched current weather"
        );

        match archive.archive(&observation).await {
            Ok(record) => {
                outcome.state = CityState::Archived;
                outcome.archive_key = Some(record.key);
                (outcome, Some(observation))
            }
            Err(err) => {
                warn!(city, error = %err, "Error saving observation to archive");
                outcome.state = CityState::ArchiveFailed;
                outcome.error = Some(err.to_string());
                (outcome, None)
            }
        }
    }

    /// Render, stage and upload. If staging fails the in-memory document is
    /// uploaded directly, so exactly one upload is attempted per run.
    async fn publish_report(&self, rows: &[Observation]) -> Result<(), ReportError> {
        let html = render_report(rows)?;
        let publisher = ReportPublisher::new(self.store, &self.config.report_key);

        match stage_report(&html, &self.config.staging_path).await {
            Ok(path) => publisher.publish_file(&path).await,
            Err(err) => {
                warn!(error = %err, "Could not stage report locally, uploading from memory");
                publisher.publish_bytes(html.as_bytes()).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::{FetchError, StorageError},
        storage::MemoryStore,
    };
    use async_trait::async_trait;

    #[derive(Debug)]
    struct NoWeather;

    #[async_trait]
    impl WeatherProvider for NoWeather {
        async fn fetch_current(&self, _city: &str) -> Result<Observation, FetchError> {
            Err(FetchError::Status {
                status: reqwest::StatusCode::UNAUTHORIZED,
                body: "invalid key".into(),
            })
        }
    }

    /// Accepts bucket calls, refuses every write.
    #[derive(Debug)]
    struct ReadOnlyStore(MemoryStore);

    #[async_trait]
    impl ObjectStore for ReadOnlyStore {
        fn bucket(&self) -> &str {
            self.0.bucket()
        }

        async fn bucket_exists(&self) -> Result<bool, StorageError> {
            self.0.bucket_exists().await
        }

        async fn create_bucket(&self) -> Result<(), StorageError> {
            self.0.create_bucket().await
        }

        async fn put(&self, key: &str, _body: &[u8], _content_type: &str) -> Result<(), StorageError> {
            Err(StorageError::Write {
                key: key.to_string(),
                reason: "read-only".into(),
            })
        }
    }

    #[tokio::test]
    async fn publish_failure_keeps_its_storage_cause() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            staging_path: dir.path().join("report.html"),
            ..Config::default()
        };
        let store = ReadOnlyStore(MemoryStore::existing("dash"));
        let dashboard = Dashboard::new(&NoWeather, &store, &config);

        let err = dashboard.publish_report(&[]).await.unwrap_err();

        match err {
            ReportError::Publish(StorageError::Write { key, .. }) => {
                assert_eq!(key, "weather-dashboard.html");
            }
            other => panic!("expected publish write error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn summary_carries_rendered_publish_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            staging_path: dir.path().join("report.html"),
            ..Config::default()
        };
        let store = ReadOnlyStore(MemoryStore::existing("dash"));

        let summary = Dashboard::new(&NoWeather, &store, &config)
            .run(&["Rabat".to_string()])
            .await;

        assert!(!summary.published);
        assert_eq!(
            summary.publish_error.as_deref(),
            Some("Failed to write object 'weather-dashboard.html': read-only")
        );
        assert_eq!(summary.cities[0].state, CityState::FetchFailed);
    }
}
