use chrono::NaiveDate;

/// Format a `yyyy-mm-dd` date as "Jan 11, 2024". Unparseable input is
/// returned unchanged.
pub fn format_date_pretty(date: &str) -> String {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) => d.format("%b %-d, %Y").to_string(),
        Err(_) => date.to_string(),
    }
}

/// Format a 24-hour "HH:MM" time as "02:30 PM".
/// Empty input renders as "--:--"; unparseable parts count as zero.
pub fn format_time_12h(time: &str) -> String {
    if time.is_empty() {
        return "--:--".to_string();
    }
    let mut parts = time.split(':');
    let hour: u32 = parts.next().and_then(|h| h.trim().parse().ok()).unwrap_or(0);
    let minute: u32 = parts.next().and_then(|m| m.trim().parse().ok()).unwrap_or(0);
    let ampm = if hour >= 12 { "PM" } else { "AM" };
    let display_hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{:02}:{:02} {}", display_hour, minute, ampm)
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}
