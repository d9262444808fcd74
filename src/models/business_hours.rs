use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoursSlot {
    pub day: String,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessHours {
    pub slots: Vec<HoursSlot>,
}

impl Default for BusinessHours {
    fn default() -> Self {
        let weekday = |day: &str| HoursSlot {
            day: day.to_string(),
            start: "08:00".to_string(),
            end: "18:00".to_string(),
        };
        let mut slots: Vec<HoursSlot> = ["mon", "tue", "wed", "thu", "fri"]
            .into_iter()
            .map(weekday)
            .collect();
        slots.push(HoursSlot {
            day: "sat".to_string(),
            start: "09:00".to_string(),
            end: "13:00".to_string(),
        });
        Self { slots }
    }
}

impl BusinessHours {
    pub fn from_json(s: &str) -> anyhow::Result<Self> {
        let hours: BusinessHours = serde_json::from_str(s)?;
        for slot in &hours.slots {
            parse_weekday(&slot.day)?;
            let start = parse_time(&slot.start)?;
            let end = parse_time(&slot.end)?;
            if end <= start {
                anyhow::bail!("slot for {} ends before it starts", slot.day);
            }
        }
        Ok(hours)
    }

    pub fn intervals_on(&self, weekday: Weekday) -> Vec<(NaiveTime, NaiveTime)> {
        self.slots
            .iter()
            .filter(|slot| parse_weekday(&slot.day).ok() == Some(weekday))
            .filter_map(|slot| Some((parse_time(&slot.start).ok()?, parse_time(&slot.end).ok()?)))
            .collect()
    }

    pub fn to_human_readable(&self) -> String {
        if self.slots.is_empty() {
            return String::new();
        }

        let mut sorted_slots = self.slots.clone();
        sorted_slots.sort_by_key(|s| {
            parse_weekday(&s.day)
                .map(|d| d.num_days_from_monday())
                .unwrap_or(7)
        });

        sorted_slots
            .iter()
            .map(|s| format!("{}: {}-{}", capitalize(&s.day), s.start, s.end))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn capitalize(s: &str) -> String {
    let mut c = s.chars();
    match c.next() {
        None => String::new(),
        Some(f) => f.to_uppercase().to_string() + &c.as_str().to_lowercase(),
    }
}

fn parse_weekday(s: &str) -> anyhow::Result<Weekday> {
    match s.to_lowercase().as_str() {
        "mon" => Ok(Weekday::Mon),
        "tue" => Ok(Weekday::Tue),
        "wed" => Ok(Weekday::Wed),
        "thu" => Ok(Weekday::Thu),
        "fri" => Ok(Weekday::Fri),
        "sat" => Ok(Weekday::Sat),
        "sun" => Ok(Weekday::Sun),
        _ => Err(anyhow::anyhow!("invalid weekday: {s}")),
    }
}

fn parse_time(s: &str) -> anyhow::Result<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M").map_err(|_| anyhow::anyhow!("invalid time format: {s}"))
}
