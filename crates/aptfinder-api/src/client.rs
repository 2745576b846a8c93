//! HTTP client for the listings backend

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use aptfinder_session::SessionGuard;

use crate::api::{ListingsApi, ScrapeApi};
use crate::error::ApiError;
use crate::types::{Apartment, ListingFilters, Neighborhood, ScrapeResponse, ScrapeStatus, Stats};
use crate::Result;

/// Typed client for the listings backend.
///
/// Requests are only built from [`SessionGuard::authorized_headers`]; when
/// the session is invalid the guard redirects and the call returns
/// [`ApiError::AuthExpired`] without touching the network.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: Url,
    guard: SessionGuard,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration, guard: SessionGuard) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_client(client, base_url, guard)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str, guard: SessionGuard) -> Result<Self> {
        // Url::join replaces the last segment unless the base ends in '/'
        let mut base = base_url.trim().trim_end_matches('/').to_string();
        base.push('/');

        Ok(Self {
            client,
            base_url: Url::parse(&base)?,
            guard,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn guard(&self) -> &SessionGuard {
        &self.guard
    }

    fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let headers = self.guard.authorized_headers()?;
        tracing::debug!(url = %url, "GET");

        let resp = self.client.get(url).headers(headers).send().await?;
        self.parse_response(resp).await
    }

    async fn post_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let headers = self.guard.authorized_headers()?;
        tracing::debug!(url = %url, "POST");

        let resp = self.client.post(url).headers(headers).send().await?;
        self.parse_response(resp).await
    }

    async fn parse_response<T: DeserializeOwned>(&self, resp: reqwest::Response) -> Result<T> {
        let status = resp.status();

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("Backend rejected the session token");
            self.guard.invalidate();
            return Err(ApiError::AuthExpired);
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Http {
                status: status.as_u16(),
                body,
            });
        }

        Ok(resp.json().await?)
    }
}

#[async_trait]
impl ListingsApi for ApiClient {
    async fn neighborhoods(&self) -> Result<Vec<Neighborhood>> {
        let url = self.url("neighborhoods")?;
        self.get_json(url).await
    }

    async fn stats(&self) -> Result<Stats> {
        let url = self.url("stats")?;
        self.get_json(url).await
    }

    async fn apartments(&self, filters: &ListingFilters) -> Result<Vec<Apartment>> {
        let mut url = self.url("apartments")?;

        let pairs = filters.query_pairs();
        if !pairs.is_empty() {
            let mut query = url.query_pairs_mut();
            for (key, value) in &pairs {
                query.append_pair(key, value);
            }
        }

        self.get_json(url).await
    }

    async fn apartment(&self, id: i64) -> Result<Apartment> {
        let url = self.url(&format!("apartments/{id}"))?;
        self.get_json(url).await
    }
}

#[async_trait]
impl ScrapeApi for ApiClient {
    async fn start_scrape(&self) -> Result<ScrapeResponse> {
        let url = self.url("scrape")?;
        self.post_json(url).await
    }

    async fn scrape_status(&self) -> Result<ScrapeStatus> {
        let url = self.url("scrape/status")?;
        self.get_json(url).await
    }
}

impl Clone for ApiClient {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            guard: self.guard.clone(),
        }
    }
}
