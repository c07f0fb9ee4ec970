/// Human-readable time labels for story captions
use chrono::Duration;

use super::data::STORY_TTL_MS;

/// Time left before a story created at `created_at` expires,
/// e.g. "23h 59m", "42m" or "Expired".
pub fn time_remaining(created_at: i64, now: i64) -> String {
    let remaining = Duration::milliseconds(STORY_TTL_MS - (now - created_at));
    if remaining <= Duration::zero() {
        return "Expired".to_string();
    }

    let hours = remaining.num_hours();
    let minutes = remaining.num_minutes() % 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// Age of a story, e.g. "3h ago", "12m ago" or "Just now"
pub fn relative_time(created_at: i64, now: i64) -> String {
    let elapsed = Duration::milliseconds(now - created_at);
    let hours = elapsed.num_hours();
    let minutes = elapsed.num_minutes();

    if hours > 0 {
        format!("{}h ago", hours)
    } else if minutes > 0 {
        format!("{}m ago", minutes)
    } else {
        "Just now".to_string()
    }
}
