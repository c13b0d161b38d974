use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg_attr(not(test), allow(dead_code))]
struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub fn system_clock() -> Arc<dyn Clock> {
    Arc::new(SystemClock)
}

#[cfg(test)]
pub fn fixed_clock(unix: i64) -> Arc<dyn Clock> {
    Arc::new(FixedClock(Utc.timestamp_opt(unix, 0).single().unwrap_or_default()))
}

pub fn now_unix() -> u64 {
    Utc::now().timestamp().max(0) as u64
}

/// Formats a unix timestamp relative to `now`, e.g. "5m ago".
pub fn format_relative(timestamp: u64, now: DateTime<Utc>) -> String {
    let now_ts = now.timestamp().max(0) as u64;
    let secs = now_ts.saturating_sub(timestamp);
    match secs {
        0..=59 => "just now".to_string(),
        60..=3599 => format!("{}m ago", secs / 60),
        3600..=86_399 => format!("{}h ago", secs / 3600),
        86_400..=2_591_999 => format!("{}d ago", secs / 86_400),
        _ => Utc
            .timestamp_opt(timestamp as i64, 0)
            .single()
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_092_800;

    fn now() -> DateTime<Utc> {
        fixed_clock(NOW).now()
    }

    #[test]
    fn test_format_relative_buckets() {
        let now_ts = NOW as u64;
        assert_eq!(format_relative(now_ts - 10, now()), "just now");
        assert_eq!(format_relative(now_ts - 300, now()), "5m ago");
        assert_eq!(format_relative(now_ts - 7200, now()), "2h ago");
        assert_eq!(format_relative(now_ts - 86_400, now()), "1d ago");
    }

    #[test]
    fn test_format_relative_old_dates() {
        assert_eq!(format_relative(0, now()), "1970-01-01");
    }

    #[test]
    fn test_future_timestamp_is_just_now() {
        assert_eq!(format_relative(NOW as u64 + 500, now()), "just now");
    }
}
