use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub available: bool,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Preference {
    #[default]
    Any,
    Morning,
    Afternoon,
    Evening,
}

impl Preference {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preference::Any => "any",
            Preference::Morning => "morning",
            Preference::Afternoon => "afternoon",
            Preference::Evening => "evening",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "morning" => Preference::Morning,
            "afternoon" => Preference::Afternoon,
            "evening" => Preference::Evening,
            _ => Preference::Any,
        }
    }

    /// Local start-hour range `[from, to)`; `None` means every hour matches.
    pub fn hour_range(&self) -> Option<(u32, u32)> {
        match self {
            Preference::Any => None,
            Preference::Morning => Some((7, 12)),
            Preference::Afternoon => Some((12, 17)),
            Preference::Evening => Some((17, 21)),
        }
    }

    pub fn contains_hour(&self, hour: u32) -> bool {
        match self.hour_range() {
            None => true,
            Some((from, to)) => hour >= from && hour < to,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WindowSelection {
    pub window: TimeWindow,
    pub matched_preference: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_preference() {
        assert_eq!(Preference::parse("Morning"), Preference::Morning);
        assert_eq!(Preference::parse(" evening "), Preference::Evening);
        assert_eq!(Preference::parse("whenever"), Preference::Any);
    }

    #[test]
    fn test_bucket_boundaries() {
        assert!(Preference::Morning.contains_hour(7));
        assert!(!Preference::Morning.contains_hour(12));
        assert!(Preference::Afternoon.contains_hour(12));
        assert!(!Preference::Evening.contains_hour(21));
        assert!(Preference::Any.contains_hour(3));
    }
}
