//! The closed set of card types and the single validation entry point for
//! turning a raw JSON object into a [`CardIntent`].

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::models::card::{CardBody, CardIntent, CARD_VERSION};

struct VariantSpec {
    card_type: &'static str,
    required: &'static [&'static str],
}

const BASE_REQUIRED: &[&str] = &["id", "createdAt"];

const VARIANTS: &[VariantSpec] = &[
    VariantSpec { card_type: "lead_card", required: &[] },
    VariantSpec { card_type: "new_customer_info", required: &[] },
    VariantSpec { card_type: "returning_customer_lookup", required: &[] },
    VariantSpec { card_type: "date_picker", required: &["availableDates"] },
    VariantSpec { card_type: "time_picker", required: &["date", "timeSlots"] },
    VariantSpec { card_type: "booking_confirmation", required: &["booking"] },
    VariantSpec { card_type: "service_recommendation", required: &["recommendations"] },
    VariantSpec { card_type: "service_fee", required: &["amount"] },
    VariantSpec { card_type: "estimate_range", required: &["low", "high", "serviceType"] },
    VariantSpec { card_type: "emergency_help", required: &["severity", "instructions"] },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: String,
    pub reason: String,
}

impl FieldIssue {
    fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationFailure {
    #[error("card intent must be a JSON object")]
    NotAnObject,

    #[error("card intent has no \"type\" field")]
    MissingType,

    #[error("unknown card type \"{0}\"")]
    UnknownType(String),

    #[error("{card_type} card failed validation{}", describe(.missing_fields, .invalid_fields))]
    Fields {
        card_type: String,
        missing_fields: Vec<String>,
        invalid_fields: Vec<FieldIssue>,
    },
}

impl ValidationFailure {
    pub fn missing_fields(&self) -> &[String] {
        match self {
            ValidationFailure::Fields { missing_fields, .. } => missing_fields,
            _ => &[],
        }
    }
}

fn describe(missing_fields: &[String], invalid_fields: &[FieldIssue]) -> String {
    let mut out = String::new();
    if !missing_fields.is_empty() {
        out.push_str(&format!("; missing: {}", missing_fields.join(", ")));
    }
    for issue in invalid_fields {
        out.push_str(&format!("; {}: {}", issue.field, issue.reason));
    }
    out
}

pub fn registered_types() -> impl Iterator<Item = &'static str> {
    VARIANTS.iter().map(|v| v.card_type)
}

pub fn is_registered(card_type: &str) -> bool {
    VARIANTS.iter().any(|v| v.card_type == card_type)
}

/// Validates a raw card object. A missing `version` is filled in; any other
/// base field must already be present.
pub fn validate_card(value: Value) -> Result<CardIntent, ValidationFailure> {
    let Value::Object(mut obj) = value else {
        return Err(ValidationFailure::NotAnObject);
    };

    let card_type = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or(ValidationFailure::MissingType)?
        .to_string();
    let spec = VARIANTS
        .iter()
        .find(|v| v.card_type == card_type)
        .ok_or_else(|| ValidationFailure::UnknownType(card_type.clone()))?;

    let missing_fields: Vec<String> = BASE_REQUIRED
        .iter()
        .chain(spec.required)
        .filter(|field| is_absent(&obj, field))
        .map(|field| field.to_string())
        .collect();

    let mut invalid_fields = Vec::new();
    match obj.get("version") {
        None | Some(Value::Null) => {
            obj.insert("version".to_string(), Value::from(CARD_VERSION));
        }
        Some(Value::String(v)) if v == CARD_VERSION => {}
        Some(other) => invalid_fields.push(FieldIssue::new(
            "version",
            format!("expected \"{CARD_VERSION}\", got {other}"),
        )),
    }

    let fail = |missing_fields: Vec<String>, invalid_fields: Vec<FieldIssue>| {
        ValidationFailure::Fields {
            card_type: card_type.clone(),
            missing_fields,
            invalid_fields,
        }
    };

    if !missing_fields.is_empty() || !invalid_fields.is_empty() {
        return Err(fail(missing_fields, invalid_fields));
    }

    let card: CardIntent = serde_json::from_value(Value::Object(obj))
        .map_err(|e| fail(Vec::new(), vec![FieldIssue::new("payload", e.to_string())]))?;

    let issues = check_body(&card.body);
    if !issues.is_empty() {
        return Err(fail(Vec::new(), issues));
    }

    Ok(card)
}

fn is_absent(obj: &Map<String, Value>, field: &str) -> bool {
    match obj.get(field) {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

fn check_date(field: String, value: &str, issues: &mut Vec<FieldIssue>) {
    if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
        issues.push(FieldIssue::new(field, format!("\"{value}\" is not a YYYY-MM-DD date")));
    }
}

fn check_body(body: &CardBody) -> Vec<FieldIssue> {
    let mut issues = Vec::new();
    match body {
        CardBody::LeadCard(_)
        | CardBody::NewCustomerInfo(_)
        | CardBody::ReturningCustomerLookup(_) => {}
        CardBody::DatePicker(picker) => {
            if picker.available_dates.is_empty() {
                issues.push(FieldIssue::new("availableDates", "must not be empty"));
            }
            for (i, option) in picker.available_dates.iter().enumerate() {
                check_date(format!("availableDates[{i}].date"), &option.date, &mut issues);
            }
        }
        CardBody::TimePicker(picker) => {
            check_date("date".to_string(), &picker.date, &mut issues);
            if picker.time_slots.is_empty() {
                issues.push(FieldIssue::new("timeSlots", "must not be empty"));
            }
        }
        CardBody::BookingConfirmation(confirmation) => {
            check_date(
                "booking.scheduledDate".to_string(),
                &confirmation.booking.scheduled_date,
                &mut issues,
            );
            if confirmation.booking.scheduled_time.trim().is_empty() {
                issues.push(FieldIssue::new("booking.scheduledTime", "must not be empty"));
            }
        }
        CardBody::ServiceRecommendation(rec) => {
            if rec.recommendations.is_empty() {
                issues.push(FieldIssue::new("recommendations", "must not be empty"));
            }
            for (i, item) in rec.recommendations.iter().enumerate() {
                if item.name.trim().is_empty() {
                    let field = format!("recommendations[{i}].name");
                    issues.push(FieldIssue::new(field, "must not be empty"));
                }
            }
        }
        CardBody::ServiceFee(fee) => {
            if !fee.amount.is_finite() || fee.amount < 0.0 {
                issues.push(FieldIssue::new("amount", "must be a non-negative number"));
            }
        }
        CardBody::EstimateRange(est) => {
            if est.low < 0.0 {
                issues.push(FieldIssue::new("low", "must be non-negative"));
            }
            if est.low > est.high {
                issues.push(FieldIssue::new("high", "must not be below low"));
            }
        }
        CardBody::EmergencyHelp(help) => {
            if help.instructions.is_empty() {
                issues.push(FieldIssue::new("instructions", "must not be empty"));
            }
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::card::Priority;
    use serde_json::json;

    fn base(card_type: &str) -> Value {
        json!({"id": "c-1", "createdAt": "2025-06-16T14:00:00Z", "type": card_type})
    }

    fn with(mut value: Value, extra: Value) -> Value {
        let obj = value.as_object_mut().unwrap();
        for (k, v) in extra.as_object().unwrap() {
            obj.insert(k.clone(), v.clone());
        }
        value
    }

    #[test]
    fn test_every_registered_type_has_a_body() {
        assert_eq!(registered_types().count(), 10);
        assert!(is_registered("emergency_help"));
        assert!(!is_registered("coupon"));
    }

    #[test]
    fn test_lead_card_fills_version_and_priority() {
        let card = validate_card(with(base("lead_card"), json!({"message": "hi"}))).unwrap();
        assert_eq!(card.version, "1");
        assert_eq!(card.priority, Priority::Medium);
        assert_eq!(card.card_type(), "lead_card");
    }

    #[test]
    fn test_unknown_type() {
        let err = validate_card(base("coupon")).unwrap_err();
        assert_eq!(err, ValidationFailure::UnknownType("coupon".to_string()));
    }

    #[test]
    fn test_missing_type_and_non_object() {
        assert_eq!(
            validate_card(json!({"id": "x"})).unwrap_err(),
            ValidationFailure::MissingType
        );
        assert_eq!(validate_card(json!([1, 2])).unwrap_err(), ValidationFailure::NotAnObject);
    }

    #[test]
    fn test_missing_required_fields_are_listed() {
        let err = validate_card(json!({"type": "estimate_range", "low": 100})).unwrap_err();
        assert_eq!(err.missing_fields(), ["id", "createdAt", "high", "serviceType"]);
        assert!(err.to_string().contains("missing: id, createdAt, high, serviceType"));
    }

    #[test]
    fn test_failure_messages() {
        let err = ValidationFailure::Fields {
            card_type: "service_fee".to_string(),
            missing_fields: vec!["amount".to_string()],
            invalid_fields: vec![FieldIssue::new("version", "expected \"1\"")],
        };
        assert_eq!(
            err.to_string(),
            "service_fee card failed validation; missing: amount; version: expected \"1\""
        );
        assert_eq!(
            ValidationFailure::UnknownType("coupon".to_string()).to_string(),
            "unknown card type \"coupon\""
        );
        let boxed: Box<dyn std::error::Error> = Box::new(ValidationFailure::MissingType);
        assert_eq!(boxed.to_string(), "card intent has no \"type\" field");
    }

    #[test]
    fn test_wrong_version_rejected() {
        let err = validate_card(with(base("lead_card"), json!({"version": "2"}))).unwrap_err();
        assert!(err.to_string().contains("version"));
    }

    #[test]
    fn test_booking_confirmation_requires_booking_record() {
        let err = validate_card(with(
            base("booking_confirmation"),
            json!({"booking": {"scheduledDate": "2025-06-17"}}),
        ))
        .unwrap_err();
        assert!(matches!(err, ValidationFailure::Fields { .. }));

        let card = validate_card(with(
            base("booking_confirmation"),
            json!({"booking": {"scheduledDate": "2025-06-17", "scheduledTime": "8:00 AM - 10:00 AM"}}),
        ))
        .unwrap();
        assert_eq!(card.card_type(), "booking_confirmation");
    }

    #[test]
    fn test_date_picker_rejects_empty_and_bad_dates() {
        let empty = with(base("date_picker"), json!({"availableDates": []}));
        let err = validate_card(empty).unwrap_err();
        assert!(err.to_string().contains("availableDates: must not be empty"));

        let err = validate_card(with(
            base("date_picker"),
            json!({"availableDates": [{"date": "June 17", "slotsAvailable": 2, "capacityState": "next_day"}]}),
        ))
        .unwrap_err();
        assert!(err.to_string().contains("availableDates[0].date"));
    }

    #[test]
    fn test_unknown_capacity_state_is_invalid() {
        let err = validate_card(with(
            base("date_picker"),
            json!({"availableDates": [{"date": "2025-06-17", "slotsAvailable": 2, "capacityState": "whenever"}]}),
        ))
        .unwrap_err();
        assert!(err.to_string().contains("payload"));
    }

    #[test]
    fn test_estimate_range_order() {
        let err = validate_card(with(
            base("estimate_range"),
            json!({"low": 500, "high": 100, "serviceType": "water heater"}),
        ))
        .unwrap_err();
        assert!(err.to_string().contains("high: must not be below low"));
    }

    #[test]
    fn test_emergency_help() {
        let card = validate_card(with(
            base("emergency_help"),
            json!({"severity": "critical", "instructions": ["Shut off the main water valve"]}),
        ))
        .unwrap();
        assert_eq!(card.card_type(), "emergency_help");
    }
}
