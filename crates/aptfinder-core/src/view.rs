//! Rendering seam for listing data

use aptfinder_api::{Apartment, ApiError, Neighborhood, Stats};

/// Receives everything the refresh loop loads.
///
/// Called from tokio tasks; implementations must not block.
pub trait ListingView: Send + Sync {
    fn show_neighborhoods(&self, neighborhoods: &[Neighborhood]);

    fn show_stats(&self, stats: &Stats);

    /// Listing fetch started or finished
    fn set_loading(&self, loading: bool);

    /// Replaces the rendered listings. An empty slice means "no results".
    fn show_listings(&self, apartments: &[Apartment]);

    fn show_listing_error(&self, error: &ApiError);
}
