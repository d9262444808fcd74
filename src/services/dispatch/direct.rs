use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::ToolCaller;
use crate::errors::ToolError;
use crate::services::tools::BookingTools;

pub struct InProcessToolCaller {
    tools: Arc<BookingTools>,
}

impl InProcessToolCaller {
    pub fn new(tools: Arc<BookingTools>) -> Self {
        Self { tools }
    }
}

#[async_trait]
impl ToolCaller for InProcessToolCaller {
    async fn call_tool(&self, tool: &str, payload: &Value) -> Result<Value, ToolError> {
        self.tools.call(tool, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::action::{ActionContext, ActionError};
    use crate::models::BusinessHours;
    use crate::services::availability::AvailabilitySource;
    use crate::services::clock::{FixedClock, SequentialIds};
    use crate::services::dispatch::http::HttpActionClient;
    use crate::services::dispatch::ActionDispatcher;
    use crate::services::service_area::ServiceArea;
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Map};
    use std::sync::Mutex;
    use std::time::Duration;

    fn dispatcher() -> ActionDispatcher {
        let tools = BookingTools::new(
            Arc::new(Mutex::new(db::init_db(":memory:").unwrap())),
            Arc::new(ServiceArea::from_csv("02169")),
            AvailabilitySource::new(BusinessHours::default(), chrono_tz::America::New_York, 120, 1),
            "(617) 555-0100".to_string(),
            Arc::new(FixedClock(Utc.with_ymd_and_hms(2025, 6, 16, 10, 0, 0).unwrap())),
            Arc::new(SequentialIds::new("id")),
        );
        ActionDispatcher::new(
            Arc::new(InProcessToolCaller::new(Arc::new(tools))),
            HttpActionClient::new("http://127.0.0.1:1", Duration::from_secs(1)),
        )
    }

    #[tokio::test]
    async fn test_books_in_process() {
        let mut payload = Map::new();
        payload.insert("name".into(), json!("Ann Lee"));
        payload.insert("phone".into(), json!("617-555-0001"));
        payload.insert("zip".into(), json!("02169"));

        let result = dispatcher()
            .dispatch("book_service_call", payload, &ActionContext::new("t-1"))
            .await;
        assert!(result.ok);
        assert_eq!(result.correlation_id, "id-2");
        assert!(result.result.unwrap().message.starts_with("You're booked for 2025-06-16"));
    }

    #[tokio::test]
    async fn test_validation_failure_in_process() {
        let mut payload = Map::new();
        payload.insert("zip".into(), json!("02169"));

        let result = dispatcher()
            .dispatch("book_service_call", payload, &ActionContext::new("t-1"))
            .await;
        assert_eq!(result.error_code(), Some(ActionError::VALIDATION_ERROR));
        assert_eq!(
            result.error.unwrap().missing_fields,
            Some(vec!["name".to_string(), "phone".to_string()])
        );
    }
}
