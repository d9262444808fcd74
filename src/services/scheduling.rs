use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;

use crate::models::{Booking, Preference, TimeWindow, WindowSelection};

// First available window whose local start hour is in the bucket, else the
// first available window with `matched_preference = false`. Input order wins.
pub fn select_window(
    windows: &[TimeWindow],
    preference: Preference,
    tz: Tz,
) -> Option<WindowSelection> {
    if let Some(window) = windows
        .iter()
        .filter(|w| w.available)
        .find(|w| preference.contains_hour(local_hour(&w.start, tz)))
    {
        return Some(WindowSelection {
            window: *window,
            matched_preference: true,
        });
    }

    windows.iter().find(|w| w.available).map(|window| WindowSelection {
        window: *window,
        matched_preference: false,
    })
}

pub fn local_hour(instant: &DateTime<Utc>, tz: Tz) -> u32 {
    instant.with_timezone(&tz).hour()
}

/// Whether `[start, end)` overlaps a non-cancelled booking. Touching
/// endpoints do not conflict.
pub fn conflicts_with(bookings: &[Booking], start: &DateTime<Utc>, end: &DateTime<Utc>) -> bool {
    bookings.iter().any(|b| b.blocks(start, end))
}

/// `("2025-06-17", "8:00 AM - 10:00 AM")` in the business timezone.
pub fn describe_window(window: &TimeWindow, tz: Tz) -> (String, String) {
    let start = window.start.with_timezone(&tz);
    let end = window.end.with_timezone(&tz);
    (
        start.format("%Y-%m-%d").to_string(),
        format!("{} - {}", start.format("%-I:%M %p"), end.format("%-I:%M %p")),
    )
}
