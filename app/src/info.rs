//! Serializable views printed by `show` and `status`

use chrono::Utc;
use serde::Serialize;

use aptfinder_core::{format_price, time_ago, Apartment, Dashboard, ListingFilters};

#[derive(Debug, Serialize)]
pub struct ApartmentInfo {
    pub id: i64,
    pub title: String,
    pub price: String,
    pub rooms: f64,
    pub neighborhood: String,
    pub address: String,
    pub floor: Option<String>,
    pub square_meters: Option<i64>,
    pub published: String,
    pub published_ago: String,
    pub is_new: bool,
    pub link: String,
    pub images: Vec<String>,
}

impl From<Apartment> for ApartmentInfo {
    fn from(apartment: Apartment) -> Self {
        let now = Utc::now();
        let is_new = apartment.is_new(now);
        let published_ago = time_ago(apartment.publish_date, now);

        Self {
            id: apartment.id,
            title: apartment.title,
            price: format_price(apartment.price),
            rooms: apartment.rooms,
            neighborhood: apartment.neighborhood,
            address: apartment.address,
            floor: apartment.floor,
            square_meters: apartment.square_meters,
            published: apartment.publish_date.to_rfc3339(),
            published_ago,
            is_new,
            link: apartment.link,
            images: apartment.images,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusInfo {
    pub job_state: String,
    pub failure_reason: Option<String>,
    pub job_id: Option<String>,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
    pub refreshing: bool,
    pub filters: ListingFilters,
}

impl StatusInfo {
    pub fn collect(dashboard: &Dashboard) -> Self {
        let snapshot = dashboard.job_snapshot();

        Self {
            job_state: snapshot.state.as_str().to_string(),
            failure_reason: snapshot.state.failure_reason().map(str::to_string),
            job_id: snapshot.job_id.map(|id| id.to_string()),
            started_at: snapshot.started_at.map(|dt| dt.to_rfc3339()),
            finished_at: snapshot.finished_at.map(|dt| dt.to_rfc3339()),
            refreshing: dashboard.is_refreshing(),
            filters: dashboard.filters(),
        }
    }
}
