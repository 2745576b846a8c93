//! Aptfinder API Client
//!
//! Typed access to the listings backend. Every request takes its headers
//! from the session guard, so an expired session never reaches the network.

mod api;
mod client;
mod error;
mod types;

pub use api::{ListingsApi, ScrapeApi};
pub use client::ApiClient;
pub use error::ApiError;
pub use types::{Apartment, ListingFilters, Neighborhood, ScrapeResponse, ScrapeStatus, Stats};

pub type Result<T> = std::result::Result<T, ApiError>;
