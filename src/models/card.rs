use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const CARD_VERSION: &str = "1";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// An actionable card the assistant asked the UI to render.
///
/// Base fields are shared by every variant; `body` carries the `type`
/// discriminant and the variant payload, flattened into the same JSON object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CardIntent {
    pub id: String,
    pub version: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    #[serde(flatten)]
    pub body: CardBody,
}

impl CardIntent {
    pub fn card_type(&self) -> &'static str {
        self.body.card_type()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CardBody {
    LeadCard(LeadCard),
    NewCustomerInfo(NewCustomerInfo),
    ReturningCustomerLookup(ReturningCustomerLookup),
    DatePicker(DatePicker),
    TimePicker(TimePicker),
    BookingConfirmation(BookingConfirmation),
    ServiceRecommendation(ServiceRecommendation),
    ServiceFee(ServiceFee),
    EstimateRange(EstimateRange),
    EmergencyHelp(EmergencyHelp),
}

impl CardBody {
    pub fn card_type(&self) -> &'static str {
        match self {
            CardBody::LeadCard(_) => "lead_card",
            CardBody::NewCustomerInfo(_) => "new_customer_info",
            CardBody::ReturningCustomerLookup(_) => "returning_customer_lookup",
            CardBody::DatePicker(_) => "date_picker",
            CardBody::TimePicker(_) => "time_picker",
            CardBody::BookingConfirmation(_) => "booking_confirmation",
            CardBody::ServiceRecommendation(_) => "service_recommendation",
            CardBody::ServiceFee(_) => "service_fee",
            CardBody::EstimateRange(_) => "estimate_range",
            CardBody::EmergencyHelp(_) => "emergency_help",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContactPrefill {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeadCard {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefill: Option<ContactPrefill>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomerInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefill: Option<ContactPrefill>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReturningCustomerLookup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CapacityState {
    SameDayFeeWaived,
    LimitedSameDay,
    NextDay,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DateOption {
    pub date: String,
    pub slots_available: u32,
    pub capacity_state: CapacityState,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DatePicker {
    pub available_dates: Vec<DateOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlotOption {
    pub id: String,
    pub label: String,
    pub start: String,
    pub end: String,
    #[serde(default = "default_true")]
    pub available: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimePicker {
    pub date: String,
    pub time_slots: Vec<TimeSlotOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    pub scheduled_date: String,
    pub scheduled_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfirmation {
    pub booking: BookingRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRecommendation {
    pub recommendations: Vec<Recommendation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceFee {
    pub amount: f64,
    #[serde(default)]
    pub waived_if_booked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EstimateRange {
    pub low: f64,
    pub high: f64,
    pub service_type: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disclaimer: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyHelp {
    pub severity: Severity,
    pub instructions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_currency() -> String {
    "USD".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_serializes_type_alongside_base_fields() {
        let card = CardIntent {
            id: "card-1".to_string(),
            version: CARD_VERSION.to_string(),
            priority: Priority::High,
            title: None,
            created_at: Utc.with_ymd_and_hms(2025, 6, 16, 14, 0, 0).unwrap(),
            thread_id: Some("t-1".to_string()),
            body: CardBody::LeadCard(LeadCard {
                message: Some("Call us".to_string()),
                prefill: None,
            }),
        };

        let value = serde_json::to_value(&card).unwrap();
        assert_eq!(value["type"], "lead_card");
        assert_eq!(value["priority"], "high");
        assert_eq!(value["threadId"], "t-1");
        assert_eq!(value["message"], "Call us");
        assert!(value.get("title").is_none());
    }

    #[test]
    fn test_deserializes_date_picker_payload() {
        let json = r#"{
            "id": "c1", "version": "1", "createdAt": "2025-06-16T14:00:00Z",
            "type": "date_picker",
            "availableDates": [{"date": "2025-06-17", "slotsAvailable": 3, "capacityState": "next_day"}]
        }"#;
        let card: CardIntent = serde_json::from_str(json).unwrap();
        assert_eq!(card.card_type(), "date_picker");
        assert_eq!(card.priority, Priority::Medium);
        match card.body {
            CardBody::DatePicker(picker) => {
                assert_eq!(picker.available_dates[0].slots_available, 3);
                assert_eq!(picker.available_dates[0].capacity_state, CapacityState::NextDay);
            }
            other => panic!("unexpected body: {other:?}"),
        }
    }

    #[test]
    fn test_estimate_currency_defaults_to_usd() {
        let json = r#"{
            "id": "c2", "version": "1", "createdAt": "2025-06-16T14:00:00Z",
            "type": "estimate_range", "low": 150, "high": 400, "serviceType": "drain cleaning"
        }"#;
        let card: CardIntent = serde_json::from_str(json).unwrap();
        match card.body {
            CardBody::EstimateRange(est) => {
                assert_eq!(est.currency, "USD");
                assert_eq!(est.low, 150.0);
            }
            other => panic!("unexpected body: {other:?}"),
        }
    }
}
