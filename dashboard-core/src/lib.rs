//! Core library for the `weather-dashboard` tool.
//!
//! This crate defines:
//! - Configuration loading (file, `.env`, environment)
//! - The weather provider abstraction and its OpenWeather implementation
//! - Object storage abstraction over S3, with an in-memory stand-in
//! - Archiving, HTML report rendering and publishing
//! - The sequential pipeline that ties them together
//!
//! It is used by `dashboard-cli`, but can also be driven from tests or other binaries.

pub mod archive;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod model;
pub mod provider;
pub mod report;
pub mod storage;

pub use archive::{ArchiveRecord, ArchiveWriter, archive_key};
pub use config::Config;
pub use dashboard::{CityOutcome, CityState, Dashboard, RunSummary};
pub use error::{FetchError, StorageError};
pub use model::Observation;
pub use provider::{OpenWeatherProvider, WeatherProvider};
pub use report::{ReportError, ReportPublisher, render_report};
pub use storage::{MemoryStore, ObjectStore, S3Store};
