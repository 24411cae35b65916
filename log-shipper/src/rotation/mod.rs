//! Rotation module for the log shipper.
//!
//! Documents are written into one index per calendar day, named
//! `<prefix>-YYYY-MM-DD`. The rotation state decides when the active index
//! has to change and is owned by the indexing loop alone.

use chrono::{DateTime, Datelike, Duration, FixedOffset, Local, TimeZone};

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Wall clock in the host's local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Name of the index holding documents for the calendar day of `now`.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use log_shipper::rotation::current_index_name;
///
/// let now = Utc.with_ymd_and_hms(2024, 3, 7, 10, 0, 0).unwrap();
/// assert_eq!(current_index_name("app", &now), "app-2024-03-07");
/// ```
pub fn current_index_name<Tz: TimeZone>(prefix: &str, now: &DateTime<Tz>) -> String {
    format!(
        "{}-{:04}-{:02}-{:02}",
        prefix,
        now.year(),
        now.month(),
        now.day()
    )
}

/// Active index and the time of the last rollover.
#[derive(Debug, Clone)]
pub struct IndexRotation {
    prefix: String,
    active_index: String,
    last_rollover: DateTime<FixedOffset>,
}

impl IndexRotation {
    /// Start rotating indices for `prefix`.
    ///
    /// The active index is set for the day of `now`, but the last rollover is
    /// placed a day earlier so that the first [`IndexRotation::check`] always
    /// rolls over.
    pub fn new(prefix: impl Into<String>, now: DateTime<FixedOffset>) -> Self {
        let prefix = prefix.into();
        let active_index = current_index_name(&prefix, &now);
        Self {
            prefix,
            active_index,
            last_rollover: now - Duration::hours(24),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn active_index(&self) -> &str {
        &self.active_index
    }

    pub fn last_rollover(&self) -> DateTime<FixedOffset> {
        self.last_rollover
    }

    /// Roll over if the calendar day changed since the last rollover.
    ///
    /// Returns the new active index name when a rollover happened. The
    /// rollover time is updated either way the caller's index creation goes,
    /// so a failed creation is not retried before the next day.
    pub fn check(&mut self, now: DateTime<FixedOffset>) -> Option<&str> {
        if self.last_rollover.date_naive() == now.date_naive() {
            return None;
        }

        self.active_index = current_index_name(&self.prefix, &now);
        self.last_rollover = now;
        Some(&self.active_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn at(rfc3339: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap()
    }

    #[test]
    fn test_index_name_format() {
        let now = Utc.with_ymd_and_hms(2024, 3, 7, 10, 0, 0).unwrap();
        assert_eq!(current_index_name("app", &now), "app-2024-03-07");
    }

    #[test]
    fn test_index_name_pads_fields() {
        let now = at("0987-01-02T00:00:00Z");
        assert_eq!(current_index_name("x", &now), "x-0987-01-02");
    }

    #[test]
    fn test_index_name_uses_offset_of_timestamp() {
        // 23:30 UTC on the 7th is already the 8th at +02:00.
        let now = at("2024-03-08T01:30:00+02:00");
        assert_eq!(current_index_name("app", &now), "app-2024-03-08");
    }

    #[test]
    fn test_first_check_always_rolls_over() {
        let start = at("2024-03-07T10:00:00Z");
        let mut rotation = IndexRotation::new("app", start);

        assert_eq!(rotation.active_index(), "app-2024-03-07");
        assert_eq!(rotation.check(start), Some("app-2024-03-07"));
        assert_eq!(rotation.last_rollover(), start);
    }

    #[test]
    fn test_same_day_rolls_over_once() {
        let mut rotation = IndexRotation::new("app", at("2024-03-07T00:00:01Z"));

        assert!(rotation.check(at("2024-03-07T00:00:01Z")).is_some());
        assert!(rotation.check(at("2024-03-07T12:00:00Z")).is_none());
        assert!(rotation.check(at("2024-03-07T23:59:59Z")).is_none());
        assert_eq!(rotation.active_index(), "app-2024-03-07");
    }

    #[test]
    fn test_day_boundary_rolls_over_to_new_name() {
        let mut rotation = IndexRotation::new("app", at("2024-03-07T23:00:00Z"));
        rotation.check(at("2024-03-07T23:00:00Z"));

        assert_eq!(
            rotation.check(at("2024-03-08T00:00:00Z")),
            Some("app-2024-03-08")
        );
        assert!(rotation.check(at("2024-03-08T00:00:01Z")).is_none());
        assert_eq!(rotation.active_index(), "app-2024-03-08");
    }

    #[test]
    fn test_same_day_of_month_in_next_month_rolls_over() {
        let mut rotation = IndexRotation::new("app", at("2024-03-07T10:00:00Z"));
        rotation.check(at("2024-03-07T10:00:00Z"));

        assert_eq!(
            rotation.check(at("2024-04-07T10:00:00Z")),
            Some("app-2024-04-07")
        );
    }

    #[test]
    fn test_system_clock_is_close_to_now() {
        let now = SystemClock.now();
        let delta = (Utc::now() - now.with_timezone(&Utc)).num_seconds().abs();
        assert!(delta < 5);
    }
}
