//! Backend API seams
//!
//! The job poller and the view sync loop depend on these traits rather than
//! on [`crate::ApiClient`] directly.

use async_trait::async_trait;

use crate::types::{Apartment, ListingFilters, Neighborhood, ScrapeResponse, ScrapeStatus, Stats};
use crate::Result;

/// Read access to listing data
#[async_trait]
pub trait ListingsApi: Send + Sync {
    async fn neighborhoods(&self) -> Result<Vec<Neighborhood>>;

    async fn stats(&self) -> Result<Stats>;

    async fn apartments(&self, filters: &ListingFilters) -> Result<Vec<Apartment>>;

    /// `GET /apartments/{id}`
    async fn apartment(&self, id: i64) -> Result<Apartment>;
}

/// Control of the remote scrape job
#[async_trait]
pub trait ScrapeApi: Send + Sync {
    /// `POST /scrape`
    async fn start_scrape(&self) -> Result<ScrapeResponse>;

    /// `GET /scrape/status`
    async fn scrape_status(&self) -> Result<ScrapeStatus>;
}
