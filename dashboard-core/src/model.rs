use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Second-granularity stamp used in archive keys and the report.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// One city's weather snapshot at fetch time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// City name as requested, used for keys and report rows.
    pub city: String,
    /// Location name as reported by the provider.
    pub location_name: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub condition: String,
    pub wind_speed_mps: f64,
    pub fetched_at: DateTime<Utc>,
}

impl Observation {
    pub fn timestamp(&self) -> String {
        self.fetched_at.format(TIMESTAMP_FORMAT).to_string()
    }
}
