//! Cache-aware retrieval of forecast documents.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::instrument;
use yr_core::ServiceConfig;

use crate::cache::{ForecastCache, Freshness};
use crate::error::{ForecastError, Result};
use crate::target::FetchTarget;

/// Returns a cached document while the server says it is current, otherwise
/// performs a single GET and refreshes the cache.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    cache: ForecastCache,
}

impl Fetcher {
    pub fn new(service: &ServiceConfig, cache: ForecastCache) -> Result<Self> {
        let mut builder = Client::builder().user_agent(service.user_agent.clone());
        if let Some(secs) = service.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(ForecastError::HttpClient)?;

        Ok(Self { client, cache })
    }

    pub fn cache(&self) -> &ForecastCache {
        &self.cache
    }

    #[instrument(skip(self, target), fields(key = %target.cache_key()), level = "info")]
    pub async fn fetch(&self, target: &FetchTarget) -> Result<String> {
        tracing::info!("weatherdata request: {}", target.label());

        let key = target.cache_key();
        if self.cache.exists(key) {
            match self.cache.freshness(key, target.kind()) {
                Freshness::Fresh => return self.cache.load(key),
                Freshness::Stale | Freshness::Unknown => {}
            }
        }

        tracing::info!("read online: {}", target.url());
        let response = self
            .client
            .get(target.url())
            .send()
            .await
            .map_err(|source| ForecastError::Fetch {
                url: target.url().to_string(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ForecastError::Upstream {
                status: status.as_u16(),
                url: target.url().to_string(),
            });
        }

        let body = response.text().await.map_err(|source| ForecastError::Fetch {
            url: target.url().to_string(),
            source,
        })?;

        self.cache.store(key, &body)?;
        Ok(body)
    }
}
