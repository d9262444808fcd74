use std::env;
use std::str::FromStr;
use std::time::Duration;

use chrono_tz::Tz;

use crate::errors::AppError;
use crate::models::BusinessHours;

const DEFAULT_SERVICE_AREA: &str =
    "02169,02170,02171,02184,02186,02188,02189,02190,02191,02122,02124,02125";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub timezone: Tz,
    pub business_phone: String,
    pub service_area_zips: String,
    pub business_hours: BusinessHours,
    pub arrival_window_minutes: i64,
    pub booking_horizon_days: u32,
    pub actions_base_url: String,
    pub dispatch_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            database_url: "servicecall.db".to_string(),
            timezone: chrono_tz::America::New_York,
            business_phone: "(617) 555-0100".to_string(),
            service_area_zips: DEFAULT_SERVICE_AREA.to_string(),
            business_hours: BusinessHours::default(),
            arrival_window_minutes: 120,
            booking_horizon_days: 14,
            actions_base_url: "http://localhost:3000".to_string(),
            dispatch_timeout: Duration::from_secs(15),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = Self::default();

        let timezone = match env::var("BUSINESS_TIMEZONE") {
            Ok(name) => Tz::from_str(name.trim())
                .map_err(|e| AppError::Config(format!("BUSINESS_TIMEZONE {name:?}: {e}")))?,
            Err(_) => defaults.timezone,
        };

        let business_hours = match env::var("BUSINESS_HOURS") {
            Ok(json) => BusinessHours::from_json(&json)
                .map_err(|e| AppError::Config(format!("BUSINESS_HOURS: {e}")))?,
            Err(_) => defaults.business_hours,
        };

        Ok(Self {
            port: parsed_or("PORT", defaults.port),
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            timezone,
            business_phone: env::var("BUSINESS_PHONE").unwrap_or(defaults.business_phone),
            service_area_zips: env::var("SERVICE_AREA_ZIPS").unwrap_or(defaults.service_area_zips),
            business_hours,
            arrival_window_minutes: parsed_or(
                "ARRIVAL_WINDOW_MINUTES",
                defaults.arrival_window_minutes,
            ),
            booking_horizon_days: parsed_or("BOOKING_HORIZON_DAYS", defaults.booking_horizon_days),
            actions_base_url: env::var("ACTIONS_BASE_URL").unwrap_or(defaults.actions_base_url),
            dispatch_timeout: Duration::from_secs(parsed_or("DISPATCH_TIMEOUT_SECS", 15)),
        })
    }
}

fn parsed_or<T: FromStr + std::fmt::Display + Copy>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, default = %default, "invalid config value");
            default
        }),
        Err(_) => default,
    }
}
