use chrono::{DateTime, Utc};
use time_humanize::{Accuracy, HumanTime, Tense};
use unicode_width::UnicodeWidthChar;

/// `m:ss` clock display for elapsed seconds
pub fn format_time(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// "3 minutes ago" style label; "Never" when there is no timestamp
pub fn time_ago(when: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(when) = when else {
        return "Never".to_string();
    };
    match (now - when).to_std() {
        Ok(elapsed) if elapsed.as_secs() >= 1 => {
            HumanTime::from(elapsed).to_text_en(Accuracy::Rough, Tense::Past)
        }
        _ => "Just now".to_string(),
    }
}

/// Cut `text` to at most `max_width` terminal columns, appending `...` when cut.
/// Below three columns only as many dots as fit are returned.
pub fn truncate(text: &str, max_width: usize) -> String {
    let total: usize = text.chars().filter_map(|c| c.width()).sum();
    if total <= max_width {
        return text.to_string();
    }
    if max_width < 3 {
        return ".".repeat(max_width);
    }
    let budget = max_width.saturating_sub(3);
    let mut width = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if width + w > budget {
            break;
        }
        width += w;
        out.push(c);
    }
    format!("{}...", out.trim_end())
}
