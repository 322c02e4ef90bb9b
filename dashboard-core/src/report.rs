//! HTML report rendering and publishing.
//!
//! The report is a single static table, one row per archived observation,
//! in the order the observations were collected. It is staged to a local
//! file and then uploaded under a fixed key, replacing the previous run's.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tera::{Context, Tera};
use thiserror::Error;
use tracing::info;

use crate::{
    error::StorageError,
    model::Observation,
    storage::{CONTENT_TYPE_HTML, ObjectStore},
};

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Weather Dashboard</title>
    <style>
        body { font-family: Arial, sans-serif; margin: 20px; }
        table { width: 100%; border-collapse: collapse; margin: 20px 0; }
        th, td { border: 1px solid #ddd; padding: 8px; text-align: left; }
        th { background-color: #f4f4f4; }
    </style>
</head>
<body>
    <h1>Weather Dashboard</h1>
    <table>
        <tr>
            <th>City</th>
            <th>Temperature (°C)</th>
            <th>Feels Like (°C)</th>
            <th>Conditions</th>
            <th>Humidity (%)</th>
            <th>Wind Speed (m/s)</th>
            <th>Timestamp</th>
        </tr>
{%- for row in rows %}
        <tr>
            <td>{{ row.city }}</td>
            <td>{{ row.temperature }}</td>
            <td>{{ row.feels_like }}</td>
            <td>{{ row.condition }}</td>
            <td>{{ row.humidity }}</td>
            <td>{{ row.wind_speed }}</td>
            <td>{{ row.timestamp }}</td>
        </tr>
{%- endfor %}
    </table>
</body>
</html>
"#;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Report rendering failed: {0}")]
    Render(#[from] tera::Error),

    #[error("Failed to access staged report {path}: {source}")]
    Staging {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Publish(#[from] StorageError),
}

#[derive(Debug, Serialize)]
struct ReportRow {
    city: String,
    temperature: String,
    feels_like: String,
    condition: String,
    humidity: String,
    wind_speed: String,
    timestamp: String,
}

impl From<&Observation> for ReportRow {
    fn from(obs: &Observation) -> Self {
        Self {
            city: obs.city.clone(),
            temperature: obs.temperature_c.to_string(),
            feels_like: obs.feels_like_c.to_string(),
            condition: obs.condition.clone(),
            humidity: obs.humidity_pct.to_string(),
            wind_speed: obs.wind_speed_mps.to_string(),
            timestamp: obs.timestamp(),
        }
    }
}

/// Render observations into the dashboard HTML. Values are HTML-escaped.
pub fn render_report(observations: &[Observation]) -> Result<String, ReportError> {
    let rows: Vec<ReportRow> = observations.iter().map(ReportRow::from).collect();

    let mut ctx = Context::new();
    ctx.insert("rows", &rows);

    Ok(Tera::one_off(TEMPLATE, &ctx, true)?)
}

/// Write the rendered report to its local staging path.
pub async fn stage_report(html: &str, path: &Path) -> Result<PathBuf, ReportError> {
    tokio::fs::write(path, html)
        .await
        .map_err(|source| ReportError::Staging {
            path: path.to_path_buf(),
            source,
        })?;

    info!(path = %path.display(), "HTML report generated");
    Ok(path.to_path_buf())
}

/// Uploads the report under a single well-known key.
#[derive(Debug)]
pub struct ReportPublisher<'a> {
    store: &'a dyn ObjectStore,
    key: &'a str,
}

impl<'a> ReportPublisher<'a> {
    pub fn new(store: &'a dyn ObjectStore, key: &'a str) -> Self {
        Self { store, key }
    }

    /// Upload a staged report file, overwriting any previous version.
    pub async fn publish_file(&self, path: &Path) -> Result<(), ReportError> {
        let body = tokio::fs::read(path)
            .await
            .map_err(|source| ReportError::Staging {
                path: path.to_path_buf(),
                source,
            })?;

        self.publish_bytes(&body).await
    }

    pub async fn publish_bytes(&self, body: &[u8]) -> Result<(), ReportError> {
        self.store.put(self.key, body, CONTENT_TYPE_HTML).await?;
        info!(bucket = self.store.bucket(), key = self.key, "HTML report uploaded");
        Ok(())
    }
}
