//! Wire types for the listings backend

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A neighborhood usable as a listing filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Neighborhood {
    pub id: String,
    pub name: String,
}

/// Summary statistics shown above the listing grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub active_apartments: u64,
    pub apartments_last_3_days: u64,
    /// When the most recent listing was scraped, if ever
    #[serde(default, with = "timestamp::option")]
    pub last_scrape: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_apartments: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Apartment {
    pub id: i64,
    pub title: String,
    pub price: i64,
    pub rooms: f64,
    pub neighborhood: String,
    pub address: String,
    #[serde(default)]
    pub floor: Option<String>,
    #[serde(default)]
    pub square_meters: Option<i64>,
    #[serde(with = "timestamp")]
    pub publish_date: DateTime<Utc>,
    pub link: String,
    #[serde(default)]
    pub images: Vec<String>,
}

impl Apartment {
    /// Published within the last 24 hours
    pub fn is_new(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.publish_date) <= Duration::hours(24)
    }
}

/// Reply to `POST /scrape`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Reply to `GET /scrape/status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeStatus {
    pub is_scraping: bool,
}

/// User-selected listing filters. Empty fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingFilters {
    pub neighborhood: Option<String>,
    pub max_price: Option<u64>,
    /// Exact room count; sent as both lower and upper bound
    pub room_count: Option<f64>,
}

impl ListingFilters {
    pub fn is_empty(&self) -> bool {
        self.neighborhood.is_none() && self.max_price.is_none() && self.room_count.is_none()
    }

    /// Query parameters for `GET /apartments`, in a stable order
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        if let Some(neighborhood) = self.neighborhood.as_deref().filter(|n| !n.is_empty()) {
            pairs.push(("neighborhood_id", neighborhood.to_string()));
        }
        if let Some(max_price) = self.max_price {
            pairs.push(("max_price", max_price.to_string()));
        }
        if let Some(rooms) = self.room_count {
            pairs.push(("min_rooms", rooms.to_string()));
            pairs.push(("max_rooms", rooms.to_string()));
        }

        pairs
    }
}

/// The backend emits RFC 3339 timestamps, sometimes without an offset.
/// Offset-less values are read as UTC.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(value: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(dt) => serializer.serialize_some(&dt.to_rfc3339()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) => parse(&raw)
                    .map(Some)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}"))),
                None => Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_stats_accepts_naive_and_null_timestamps() {
        let stats: Stats = serde_json::from_str(
            r#"{"active_apartments": 12, "apartments_last_3_days": 4, "last_scrape": "2024-05-01T10:30:00.123456"}"#,
        )
        .unwrap();
        assert_eq!(stats.active_apartments, 12);
        assert_eq!(
            stats.last_scrape.unwrap(),
            Utc.with_ymd_and_hms(2024, 5, 1, 10, 30, 0).unwrap() + Duration::microseconds(123_456)
        );

        let empty: Stats = serde_json::from_str(
            r#"{"active_apartments": 0, "apartments_last_3_days": 0, "last_scrape": null}"#,
        )
        .unwrap();
        assert!(empty.last_scrape.is_none());
        assert!(empty.total_apartments.is_none());
    }

    #[test]
    fn test_apartment_optional_fields() {
        let apartment: Apartment = serde_json::from_str(
            r#"{
                "id": 7,
                "title": "Sunny flat",
                "price": 6500,
                "rooms": 2.5,
                "neighborhood": "Florentin",
                "address": "Vital 3",
                "publish_date": "2024-05-01T08:00:00Z",
                "link": "https://example.com/7",
                "images": ["https://example.com/7.jpg"]
            }"#,
        )
        .unwrap();

        assert_eq!(apartment.floor, None);
        assert_eq!(apartment.square_meters, None);
        assert_eq!(apartment.images.len(), 1);
    }

    #[test]
    fn test_is_new() {
        let now = Utc.with_ymd_and_hms(2024, 5, 2, 12, 0, 0).unwrap();
        let mut apartment = Apartment {
            id: 1,
            title: String::new(),
            price: 0,
            rooms: 1.0,
            neighborhood: String::new(),
            address: String::new(),
            floor: None,
            square_meters: None,
            publish_date: now - Duration::hours(23),
            link: String::new(),
            images: Vec::new(),
        };
        assert!(apartment.is_new(now));

        apartment.publish_date = now - Duration::hours(25);
        assert!(!apartment.is_new(now));
    }

    #[test]
    fn test_filter_query_pairs() {
        assert!(ListingFilters::default().query_pairs().is_empty());

        let filters = ListingFilters {
            neighborhood: Some("204".to_string()),
            max_price: Some(7000),
            room_count: Some(3.5),
        };
        assert_eq!(
            filters.query_pairs(),
            vec![
                ("neighborhood_id", "204".to_string()),
                ("max_price", "7000".to_string()),
                ("min_rooms", "3.5".to_string()),
                ("max_rooms", "3.5".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_neighborhood_is_not_sent() {
        let filters = ListingFilters {
            neighborhood: Some(String::new()),
            ..Default::default()
        };
        assert!(filters.query_pairs().is_empty());
    }
}
