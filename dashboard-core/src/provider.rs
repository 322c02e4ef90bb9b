use crate::{error::FetchError, model::Observation};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

pub use openweather::OpenWeatherProvider;

/// Source of current weather observations.
///
/// Implementations make exactly one outbound call per invocation and never
/// retry; a failure means the city is skipped for this run.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Fetch current conditions for `city`, tagged with the city name and
    /// the time of the fetch.
    async fn fetch_current(&self, city: &str) -> Result<Observation, FetchError>;
}
