//! Persistent gallery of finished renders.
//!
//! The actual store is a spreadsheet reached through a small HTTP bridge;
//! its internals are irrelevant here. [`GalleryStore`] is the narrow seam
//! the reconciler and the `gallery` subcommand talk to: append one row per
//! finished render, list the most recent rows. Saves are best-effort — a
//! failed save is reported but never reverts a job's state.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("gallery endpoint returned status {status}")]
    Status { status: u16 },

    #[error("malformed gallery response: {0}")]
    Malformed(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// One stored render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryEntry {
    pub timestamp: DateTime<Utc>,
    pub image_url: String,
    pub prompt: String,
    /// Provider label of the job that produced the image.
    pub engine: String,
}

/// Narrow interface to the external gallery store.
pub trait GalleryStore {
    fn save(
        &self,
        result_url: &str,
        prompt: &str,
        provider_label: &str,
    ) -> impl Future<Output = Result<(), GalleryError>> + Send;

    fn list_recent(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<GalleryEntry>, GalleryError>> + Send;
}

/// [`GalleryStore`] implementation appending rows to the spreadsheet
/// bridge endpoint over HTTP.
pub struct SheetGallery {
    client: Client,
    endpoint: String,
}

impl SheetGallery {
    pub fn new(endpoint: String) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(15))
            .build()
            .expect("failed to build HTTP client");
        Self { client, endpoint }
    }
}

impl GalleryStore for SheetGallery {
    async fn save(
        &self,
        result_url: &str,
        prompt: &str,
        provider_label: &str,
    ) -> Result<(), GalleryError> {
        let entry = GalleryEntry {
            timestamp: Utc::now(),
            image_url: result_url.to_string(),
            prompt: prompt.to_string(),
            engine: provider_label.to_string(),
        };

        let response = self.client.post(&self.endpoint).json(&entry).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GalleryError::Status {
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<GalleryEntry>, GalleryError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("limit", limit)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GalleryError::Status {
                status: status.as_u16(),
            });
        }

        let mut entries = response
            .json::<Vec<GalleryEntry>>()
            .await
            .map_err(|e| GalleryError::Malformed(e.to_string()))?;
        // Newest first, regardless of bridge ordering.
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries.truncate(limit);
        Ok(entries)
    }
}
