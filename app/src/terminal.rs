//! Stdout renderer
//!
//! Implements every surface the dashboard drives: listing view, notices,
//! the scrape control and login redirects.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::fmt::Write as _;
use std::io::Write as _;
use std::sync::atomic::{AtomicBool, Ordering};

use aptfinder_core::{
    format_price, time_ago, Apartment, ApiError, ListingView, Navigator, Neighborhood, Notice,
    NoticeLevel, Notifier, Stats, TriggerControl,
};

pub struct Terminal {
    /// Serializes writes from background tasks
    out: Mutex<()>,
    scrape_enabled: AtomicBool,
    signed_out: AtomicBool,
}

impl Terminal {
    pub fn new() -> Self {
        Self {
            out: Mutex::new(()),
            scrape_enabled: AtomicBool::new(true),
            signed_out: AtomicBool::new(false),
        }
    }

    pub fn print(&self, text: &str) {
        let _lock = self.out.lock();
        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(stdout, "{text}");
        let _ = stdout.flush();
    }

    pub fn prompt(&self) {
        let _lock = self.out.lock();
        let mut stdout = std::io::stdout().lock();
        let marker = if self.is_signed_out() {
            " (signed out)"
        } else if !self.scrape_enabled.load(Ordering::SeqCst) {
            " (scraping)"
        } else {
            ""
        };
        let _ = write!(stdout, "aptfinder{marker}> ");
        let _ = stdout.flush();
    }

    /// A redirect to login happened since the last sign-in
    pub fn is_signed_out(&self) -> bool {
        self.signed_out.load(Ordering::SeqCst)
    }

    pub fn mark_signed_in(&self) {
        self.signed_out.store(false, Ordering::SeqCst);
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl ListingView for Terminal {
    fn show_neighborhoods(&self, neighborhoods: &[Neighborhood]) {
        let names: Vec<String> = neighborhoods
            .iter()
            .map(|n| format!("{} ({})", n.name, n.id))
            .collect();
        self.print(&format!("Neighborhoods: {}", names.join(", ")));
    }

    fn show_stats(&self, stats: &Stats) {
        self.print(&render_stats(stats, Utc::now()));
    }

    fn set_loading(&self, loading: bool) {
        if loading {
            tracing::debug!("Loading listings");
        }
    }

    fn show_listings(&self, apartments: &[Apartment]) {
        if apartments.is_empty() {
            self.print("No apartments match the current filters");
            return;
        }

        let now = Utc::now();
        let mut text = format!("{} apartments:", apartments.len());
        for apartment in apartments {
            text.push('\n');
            text.push_str(&render_apartment(apartment, now));
        }
        self.print(&text);
    }

    fn show_listing_error(&self, error: &ApiError) {
        self.print(&format!("! Failed to load apartments: {error}"));
    }
}

impl Notifier for Terminal {
    fn notify(&self, notice: Notice) {
        let tag = match notice.level {
            NoticeLevel::Info => "i",
            NoticeLevel::Success => "+",
            NoticeLevel::Error => "!",
        };
        self.print(&format!("{tag} {notice}"));
    }
}

impl TriggerControl for Terminal {
    fn set_enabled(&self, enabled: bool) {
        self.scrape_enabled.store(enabled, Ordering::SeqCst);
    }
}

impl Navigator for Terminal {
    fn navigate(&self, path: &str) {
        self.signed_out.store(true, Ordering::SeqCst);
        self.print(&format!(
            "Session ended, redirecting to {path}. Use 'login <token>' to sign in."
        ));
    }
}

pub fn render_stats(stats: &Stats, now: DateTime<Utc>) -> String {
    let last_scrape = stats
        .last_scrape
        .map(|at| time_ago(at, now))
        .unwrap_or_else(|| "never".to_string());
    format!(
        "Active: {} | Last 3 days: {} | Last scrape: {}",
        stats.active_apartments, stats.apartments_last_3_days, last_scrape
    )
}

pub fn render_apartment(apartment: &Apartment, now: DateTime<Utc>) -> String {
    let mut text = String::new();
    let badge = if apartment.is_new(now) { "[NEW] " } else { "" };
    let _ = write!(
        text,
        "{badge}#{} {}\n  {} | {} rooms | {}, {}",
        apartment.id,
        apartment.title,
        format_price(apartment.price),
        apartment.rooms,
        apartment.neighborhood,
        apartment.address
    );
    if let Some(floor) = &apartment.floor {
        let _ = write!(text, " | floor {floor}");
    }
    if let Some(size) = apartment.square_meters {
        let _ = write!(text, " | {size} m2");
    }
    let _ = write!(
        text,
        " | {}\n  {}",
        time_ago(apartment.publish_date, now),
        apartment.link
    );
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn apartment(published: DateTime<Utc>) -> Apartment {
        Apartment {
            id: 7,
            title: "Sunny flat".to_string(),
            price: 6500,
            rooms: 3.0,
            neighborhood: "Florentin".to_string(),
            address: "Vital 1".to_string(),
            floor: Some("2".to_string()),
            square_meters: None,
            publish_date: published,
            link: "https://example.com/7".to_string(),
            images: Vec::new(),
        }
    }

    #[test]
    fn test_render_new_apartment() {
        let now = Utc::now();
        let text = render_apartment(&apartment(now - Duration::hours(3)), now);

        assert!(text.starts_with("[NEW] #7 Sunny flat"));
        assert!(text.contains("₪6,500 | 3 rooms | Florentin, Vital 1 | floor 2 | 3 hours ago"));
        assert!(!text.contains("m2"));
        assert!(text.ends_with("https://example.com/7"));
    }

    #[test]
    fn test_render_old_apartment() {
        let now = Utc::now();
        let text = render_apartment(&apartment(now - Duration::days(2)), now);

        assert!(text.starts_with("#7"));
        assert!(text.contains("2 days ago"));
    }

    #[test]
    fn test_render_stats() {
        let now = Utc::now();
        let mut stats = Stats {
            active_apartments: 25,
            apartments_last_3_days: 9,
            last_scrape: None,
            total_apartments: None,
        };
        assert_eq!(
            render_stats(&stats, now),
            "Active: 25 | Last 3 days: 9 | Last scrape: never"
        );

        stats.last_scrape = Some(now - Duration::minutes(5));
        assert!(render_stats(&stats, now).ends_with("5 minutes ago"));
    }

    #[test]
    fn test_navigation_marks_signed_out() {
        let terminal = Terminal::new();
        assert!(!terminal.is_signed_out());

        terminal.navigate("./login.html");
        assert!(terminal.is_signed_out());

        terminal.mark_signed_in();
        assert!(!terminal.is_signed_out());
    }
}
