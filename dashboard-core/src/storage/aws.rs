use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use std::fmt::Display;
use tracing::{debug, warn};

use crate::{Config, error::StorageError};

use super::ObjectStore;

/// S3 (or S3-compatible) store bound to a single bucket.
#[derive(Debug)]
pub struct S3Store {
    name: String,
    region: Region,
    credentials: Credentials,
    path_style: bool,
    bucket: Box<Bucket>,
}

impl S3Store {
    /// Build the store from configuration. Credentials come from the usual
    /// AWS environment variables or profile; when none are found the store
    /// is built unsigned and each write fails on its own.
    ///
    /// This is the only storage step whose failure ends the run.
    pub fn from_config(config: &Config) -> Result<Self, StorageError> {
        let credentials = credentials_or_anonymous(Credentials::default())?;

        let (region, path_style) = match &config.endpoint {
            Some(endpoint) => (
                Region::Custom {
                    region: config.region.clone(),
                    endpoint: endpoint.clone(),
                },
                true,
            ),
            None => (
                config
                    .region
                    .parse::<Region>()
                    .map_err(|e| StorageError::Client(format!("invalid region: {e}")))?,
                false,
            ),
        };

        Self::new(&config.bucket, region, credentials, path_style)
    }

    pub fn new(
        name: &str,
        region: Region,
        credentials: Credentials,
        path_style: bool,
    ) -> Result<Self, StorageError> {
        let mut bucket = Bucket::new(name, region.clone(), credentials.clone())
            .map_err(|e| StorageError::Client(e.to_string()))?;
        if path_style {
            // MinIO and most self-hosted endpoints need path-style addressing.
            bucket = bucket.with_path_style();
        }

        Ok(Self {
            name: name.to_string(),
            region,
            credentials,
            path_style,
            bucket,
        })
    }
}

/// Missing credentials do not stop the run: fall back to unsigned requests.
fn credentials_or_anonymous<E: Display>(
    resolved: Result<Credentials, E>,
) -> Result<Credentials, StorageError> {
    match resolved {
        Ok(credentials) => Ok(credentials),
        Err(err) => {
            warn!(error = %err, "No AWS credentials found, using anonymous access");
            Credentials::anonymous().map_err(|e| StorageError::Client(format!("credentials: {e}")))
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    fn bucket(&self) -> &str {
        &self.name
    }

    async fn bucket_exists(&self) -> Result<bool, StorageError> {
        self.bucket
            .exists()
            .await
            .map_err(|e| StorageError::BucketProvision {
                bucket: self.name.clone(),
                reason: e.to_string(),
            })
    }

    async fn create_bucket(&self) -> Result<(), StorageError> {
        let provision_err = |reason: String| StorageError::BucketProvision {
            bucket: self.name.clone(),
            reason,
        };

        let response = if self.path_style {
            Bucket::create_with_path_style(
                &self.name,
                self.region.clone(),
                self.credentials.clone(),
                BucketConfiguration::default(),
            )
            .await
        } else {
            Bucket::create(
                &self.name,
                self.region.clone(),
                self.credentials.clone(),
                BucketConfiguration::default(),
            )
            .await
        }
        .map_err(|e| provision_err(e.to_string()))?;

        if !response.success() {
            return Err(provision_err(format!(
                "status {}: {}",
                response.response_code, response.response_text
            )));
        }

        Ok(())
    }

    async fn put(&self, key: &str, body: &[u8], content_type: &str) -> Result<(), StorageError> {
        let write_err = |reason: String| StorageError::Write {
            key: key.to_string(),
            reason,
        };

        let response = self
            .bucket
            .put_object_with_content_type(key, body, content_type)
            .await
            .map_err(|e| write_err(e.to_string()))?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(write_err(format!(
                "status {status}: {}",
                String::from_utf8_lossy(response.as_slice())
            )));
        }

        debug!(bucket = %self.name, key, bytes = body.len(), "Object written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credentials_fall_back_to_anonymous() {
        let credentials = credentials_or_anonymous(Err("no credentials in env")).unwrap();

        assert!(credentials.access_key.is_none());
        assert!(credentials.secret_key.is_none());
    }

    #[test]
    fn resolved_credentials_are_kept() {
        let resolved = Credentials::new(Some("AKID"), Some("SECRET"), None, None, None);

        let credentials = credentials_or_anonymous(resolved).unwrap();

        assert_eq!(credentials.access_key.as_deref(), Some("AKID"));
    }

    #[test]
    fn store_builds_without_credentials_against_custom_endpoint() {
        let credentials = credentials_or_anonymous(Err("none")).unwrap();
        let region = Region::Custom {
            region: "us-east-1".into(),
            endpoint: "http://127.0.0.1:9000".into(),
        };

        let store = S3Store::new("dash", region, credentials, true).unwrap();

        assert_eq!(store.bucket(), "dash");
    }
}
