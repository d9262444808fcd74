use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::config::AppConfig;
use crate::services::availability::AvailabilitySource;
use crate::services::clock::{Clock, IdGenerator};
use crate::services::intent::IntentExtractor;
use crate::services::service_area::ServiceArea;
use crate::services::tools::BookingTools;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub tools: Arc<BookingTools>,
    pub extractor: IntentExtractor,
}

impl AppState {
    pub fn new(
        conn: Connection,
        config: AppConfig,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        let db = Arc::new(Mutex::new(conn));
        let service_area = Arc::new(ServiceArea::from_csv(&config.service_area_zips));
        let availability = AvailabilitySource::new(
            config.business_hours.clone(),
            config.timezone,
            config.arrival_window_minutes,
            config.booking_horizon_days,
        );
        let tools = Arc::new(BookingTools::new(
            Arc::clone(&db),
            service_area,
            availability,
            config.business_phone.clone(),
            Arc::clone(&clock),
            Arc::clone(&ids),
        ));

        Self {
            db,
            config,
            tools,
            extractor: IntentExtractor::new(clock, ids),
        }
    }
}
