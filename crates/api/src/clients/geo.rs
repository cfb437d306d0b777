//! Batch IP geolocation against an ip-api compatible endpoint.
//!
//! Batching and quota spacing come from [`nihontowatch_core::geo`]. Any
//! failed batch resolves its addresses to "Unknown"; lookups never fail
//! the caller.

use std::collections::HashMap;
use std::time::Duration;

use nihontowatch_core::geo::{batch_spacing, fold_geo_results, plan_geo_batches, GeoLookupResult};

/// HTTP request timeout for a single batch.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum GeoError {
    /// The underlying HTTP request failed (network, DNS, timeout, decode).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Geo provider returned HTTP {0}")]
    HttpStatus(u16),
}

pub struct GeoClient {
    client: reqwest::Client,
    url: String,
    spacing: Duration,
}

impl GeoClient {
    pub fn new(url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            url: url.into(),
            spacing: batch_spacing(),
        })
    }

    /// Override the pause between batches (tests use zero).
    pub fn with_spacing(mut self, spacing: Duration) -> Self {
        self.spacing = spacing;
        self
    }

    /// Resolve every address to a country name.
    pub async fn lookup_countries(&self, ips: &[String]) -> HashMap<String, String> {
        let plan = plan_geo_batches(ips);
        let mut results: Vec<GeoLookupResult> = Vec::new();

        for (i, batch) in plan.batches.iter().enumerate() {
            if i > 0 && !self.spacing.is_zero() {
                tokio::time::sleep(self.spacing).await;
            }
            match self.send_batch(batch).await {
                Ok(mut found) => results.append(&mut found),
                Err(e) => tracing::warn!(
                    batch = i,
                    size = batch.len(),
                    error = %e,
                    "Geo batch lookup failed; addresses resolve to Unknown"
                ),
            }
        }

        tracing::debug!(
            requested = ips.len(),
            batches = plan.batches.len(),
            unresolvable = plan.unresolvable.len(),
            skipped = plan.skipped,
            resolved = results.len(),
            "Geo lookup finished"
        );
        fold_geo_results(ips, &results)
    }

    async fn send_batch(&self, batch: &[String]) -> Result<Vec<GeoLookupResult>, GeoError> {
        let response = self
            .client
            .post(&self.url)
            .query(&[("fields", "status,country,countryCode,query")])
            .json(batch)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(GeoError::HttpStatus(response.status().as_u16()));
        }
        Ok(response.json::<Vec<GeoLookupResult>>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nihontowatch_core::geo::UNKNOWN_COUNTRY;

    #[tokio::test]
    async fn unreachable_provider_yields_unknown() {
        let client = GeoClient::new("http://127.0.0.1:9/batch")
            .unwrap()
            .with_spacing(Duration::ZERO);
        let ips = vec!["8.8.8.8".to_string(), "10.0.0.1".to_string()];
        let countries = client.lookup_countries(&ips).await;
        assert_eq!(countries["8.8.8.8"], UNKNOWN_COUNTRY);
        assert_eq!(countries["10.0.0.1"], UNKNOWN_COUNTRY);
    }

    #[test]
    fn geo_error_display_http_status() {
        assert_eq!(GeoError::HttpStatus(429).to_string(), "Geo provider returned HTTP 429");
    }
}
