use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::{
    error::StorageError,
    model::{Observation, TIMESTAMP_FORMAT},
    storage::{CONTENT_TYPE_JSON, ObjectStore},
};

pub const DEFAULT_ARCHIVE_PREFIX: &str = "weather-data";

/// `{prefix}/{city}-{yyyyMMdd-HHmmss}.json`
pub fn archive_key(prefix: &str, city: &str, fetched_at: DateTime<Utc>) -> String {
    format!(
        "{}/{}-{}.json",
        prefix.trim_end_matches('/'),
        city,
        fetched_at.format(TIMESTAMP_FORMAT)
    )
}

/// An observation as written to the archive. Never read back.
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveRecord {
    #[serde(skip)]
    pub key: String,
    #[serde(flatten)]
    pub observation: Observation,
    pub timestamp: String,
}

impl ArchiveRecord {
    pub fn new(prefix: &str, observation: Observation) -> Self {
        Self {
            key: archive_key(prefix, &observation.city, observation.fetched_at),
            timestamp: observation.timestamp(),
            observation,
        }
    }
}

#[derive(Debug)]
pub struct ArchiveWriter<'a> {
    store: &'a dyn ObjectStore,
    prefix: &'a str,
}

impl<'a> ArchiveWriter<'a> {
    pub fn new(store: &'a dyn ObjectStore, prefix: &'a str) -> Self {
        Self { store, prefix }
    }

    /// Store one observation as JSON. Each call writes a new object.
    pub async fn archive(&self, observation: &Observation) -> Result<ArchiveRecord, StorageError> {
        let record = ArchiveRecord::new(self.prefix, observation.clone());
        let body = serde_json::to_vec(&record)?;

        self.store.put(&record.key, &body, CONTENT_TYPE_JSON).await?;
        info!(city = %observation.city, key = %record.key, "Saved observation to archive");

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::{Duration, TimeZone};

    fn observation(city: &str, at: DateTime<Utc>) -> Observation {
        Observation {
            city: city.into(),
            location_name: city.into(),
            temperature_c: 12.0,
            feels_like_c: 10.5,
            humidity_pct: 71,
            condition: "light rain".into(),
            wind_speed_mps: 5.2,
            fetched_at: at,
        }
    }

    #[test]
    fn key_combines_prefix_city_and_timestamp() {
        let at = Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 58).unwrap();

        assert_eq!(
            archive_key("weather-data", "Tokyo", at),
            "weather-data/Tokyo-20251231-235958.json"
        );
        assert_eq!(
            archive_key("weather-data/", "Tokyo", at),
            "weather-data/Tokyo-20251231-235958.json"
        );
    }

    #[test]
    fn keys_differ_once_a_second_has_passed() {
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

        let first = archive_key(DEFAULT_ARCHIVE_PREFIX, "Rabat", at);
        let second = archive_key(DEFAULT_ARCHIVE_PREFIX, "Rabat", at + Duration::seconds(1));
        let same_second = archive_key(
            DEFAULT_ARCHIVE_PREFIX,
            "Rabat",
            at + Duration::milliseconds(400),
        );

        assert_ne!(first, second);
        assert_eq!(first, same_second);
    }

    #[tokio::test]
    async fn archive_writes_json_with_injected_timestamp() {
        let store = MemoryStore::existing("dash");
        let writer = ArchiveWriter::new(&store, DEFAULT_ARCHIVE_PREFIX);
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 0).unwrap();

        let record = writer.archive(&observation("Ottawa", at)).await.unwrap();

        assert_eq!(record.key, "weather-data/Ottawa-20240601-123000.json");
        let stored = store.get(&record.key).expect("object must be stored");
        assert_eq!(stored.content_type, "application/json");

        let json: serde_json::Value = serde_json::from_slice(&stored.body).unwrap();
        assert_eq!(json["city"], "Ottawa");
        assert_eq!(json["timestamp"], "20240601-123000");
        assert_eq!(json["humidity_pct"], 71);
        assert!(json.get("key").is_none());
    }
}
