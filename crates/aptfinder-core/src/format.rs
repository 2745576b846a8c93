//! Display helpers shared by front-ends

use chrono::{DateTime, Utc};

/// Coarse relative time, e.g. `3 hours ago`.
///
/// Uses the largest whole unit among days, hours and minutes. Future
/// timestamps read as `0 minutes ago`.
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);
    let days = elapsed.num_days();
    let hours = elapsed.num_hours();

    if days > 0 {
        plural(days, "day")
    } else if hours > 0 {
        plural(hours, "hour")
    } else {
        plural(elapsed.num_minutes().max(0), "minute")
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}

/// Price in shekels with thousands separators, e.g. `₪6,500`
pub fn format_price(price: i64) -> String {
    let digits = price.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if price < 0 { "-" } else { "" };
    format!("{sign}₪{grouped}")
}
