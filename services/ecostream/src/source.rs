//! Readings endpoint client

use std::sync::Arc;

use async_trait::async_trait;

use crate::io::HttpClient;
use crate::reading::Reading;

/// Something that can produce the current readings collection, newest first
#[async_trait]
pub trait ReadingSource: Send + Sync + std::fmt::Debug {
    /// Fetch the readings collection
    async fn fetch(&self) -> crate::Result<Vec<Reading>>;
}

/// Reads the collection from an HTTP endpoint returning a JSON array
pub struct HttpReadingSource {
    url: String,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for HttpReadingSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpReadingSource")
            .field("url", &self.url)
            .finish()
    }
}

impl HttpReadingSource {
    pub fn new(url: impl Into<String>, http: Arc<dyn HttpClient>) -> Self {
        let url = url.into();
        tracing::debug!("Created HttpReadingSource for {}", url);
        Self { url, http }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ReadingSource for HttpReadingSource {
    async fn fetch(&self) -> crate::Result<Vec<Reading>> {
        let response = self.http.get(&self.url).await?;
        if !response.is_success() {
            tracing::debug!(
                "Non-success response from {}: status={}",
                self.url,
                response.status
            );
            return Err(crate::EcostreamError::Status(response.status));
        }

        let readings: Vec<Reading> = serde_json::from_str(&response.body)?;
        tracing::debug!("Fetched {} readings from {}", readings.len(), self.url);
        Ok(readings)
    }
}
