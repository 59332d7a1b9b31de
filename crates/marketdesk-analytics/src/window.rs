// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trailing time windows over order `created_at`.

use chrono::{DateTime, Duration, Utc};
use marketdesk_core::{Period, format_timestamp};

/// A half-open range `[start, end)`. The current window has no end so that
/// orders stamped in the same instant as the query are still counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    days: i64,
}

impl Window {
    /// The trailing window for `period` ending at `now`.
    pub fn trailing(period: Period, now: DateTime<Utc>) -> Self {
        Self::trailing_days(period.days(), now)
    }

    pub fn trailing_days(days: i64, now: DateTime<Utc>) -> Self {
        Self {
            start: now - Duration::days(days),
            end: None,
            days,
        }
    }

    /// The window of equal length immediately before this one.
    pub fn previous(&self) -> Self {
        Self {
            start: self.start - Duration::days(self.days),
            end: Some(self.start),
            days: self.days,
        }
    }

    /// Bounds as stored timestamp strings, for binding into queries.
    pub(crate) fn bounds(&self) -> (String, Option<String>) {
        (format_timestamp(self.start), self.end.map(format_timestamp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn previous_window_abuts_current() {
        let now = Utc.with_ymd_and_hms(2026, 3, 31, 12, 0, 0).unwrap();
        let current = Window::trailing(Period::Week, now);
        let previous = current.previous();
        assert_eq!(previous.end, Some(current.start));
        assert_eq!(current.start - previous.start, Duration::days(7));

        let (start, end) = previous.bounds();
        assert_eq!(start, "2026-03-17T12:00:00.000Z");
        assert_eq!(end.as_deref(), Some("2026-03-24T12:00:00.000Z"));
    }
}
