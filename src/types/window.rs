//! Aggregation time window

use chrono::{DateTime, Utc};

/// An optional half-open interval `[from, to)` restricting which sessions
/// feed an aggregation query. Either bound may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Window {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl Window {
    /// The unbounded window (matches everything)
    pub fn all() -> Self {
        Self::default()
    }

    /// A window bounded on both ends
    pub fn between(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    /// Whether an instant falls inside `[from, to)`
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.from.map_or(true, |from| instant >= from)
            && self.to.map_or(true, |to| instant < to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_unbounded_contains_everything() {
        assert!(Window::all().contains(at(0)));
        assert!(Window::all().contains(at(23)));
    }

    #[test]
    fn test_half_open_bounds() {
        let window = Window::between(at(10), at(12));
        assert!(!window.contains(at(9)));
        assert!(window.contains(at(10)));
        assert!(window.contains(at(11)));
        // upper bound is exclusive
        assert!(!window.contains(at(12)));
    }

    #[test]
    fn test_single_bound() {
        let from_only = Window {
            from: Some(at(10)),
            to: None,
        };
        assert!(from_only.contains(at(15)));
        assert!(!from_only.contains(at(9)));
    }
}
