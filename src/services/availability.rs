use chrono::{DateTime, Datelike, Duration, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::models::{Booking, BusinessHours, TimeWindow};
use crate::services::scheduling::conflicts_with;

#[derive(Debug, Clone)]
pub struct AvailabilitySource {
    hours: BusinessHours,
    tz: Tz,
    window: Duration,
    horizon_days: u32,
}

impl AvailabilitySource {
    pub fn new(hours: BusinessHours, tz: Tz, window_minutes: i64, horizon_days: u32) -> Self {
        Self {
            hours,
            tz,
            window: Duration::minutes(window_minutes.max(15)),
            horizon_days,
        }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// The UTC span `windows` can cover when starting from `now`, for
    /// loading the bookings it needs.
    pub fn horizon(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        (now, now + Duration::days(i64::from(self.horizon_days) + 1))
    }

    /// Windows from today (local) for the configured horizon, in
    /// chronological order. Windows that have started or overlap a booking
    /// are marked unavailable rather than dropped.
    pub fn windows(&self, now: DateTime<Utc>, bookings: &[Booking]) -> Vec<TimeWindow> {
        let today = now.with_timezone(&self.tz).date_naive();
        let mut windows = Vec::new();

        for offset in 0..self.horizon_days {
            let Some(date) = today.checked_add_days(chrono::Days::new(u64::from(offset))) else {
                break;
            };
            for (open, close) in self.hours.intervals_on(date.weekday()) {
                let close = date.and_time(close);
                let mut cursor = date.and_time(open);
                while cursor + self.window <= close {
                    if let Some(window) = self.to_window(cursor, now, bookings) {
                        windows.push(window);
                    }
                    cursor += self.window;
                }
            }
        }

        windows
    }

    fn to_window(
        &self,
        local_start: NaiveDateTime,
        now: DateTime<Utc>,
        bookings: &[Booking],
    ) -> Option<TimeWindow> {
        let start = self
            .tz
            .from_local_datetime(&local_start)
            .earliest()?
            .with_timezone(&Utc);
        let end = start + self.window;
        Some(TimeWindow {
            start,
            end,
            available: start > now && !conflicts_with(bookings, &start, &end),
        })
    }
}
