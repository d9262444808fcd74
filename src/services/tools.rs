//! Booking tools invoked by dispatched actions, either in-process or through
//! `POST /tools/{toolName}`.
//!
//! Business outcomes such as "outside the service area" or "nothing open" are
//! successful tool results with `booked: false`; only malformed requests and
//! storage failures are errors.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::db::queries;
use crate::errors::ToolError;
use crate::models::{Booking, BookingStatus, Customer, Lead, Preference, TimeWindow};
use crate::services::availability::AvailabilitySource;
use crate::services::clock::{Clock, IdGenerator};
use crate::services::normalize::{normalize_name, NormalizedPhone};
use crate::services::scheduling::{describe_window, select_window};
use crate::services::service_area::{normalize_zip, ServiceArea};

pub const TOOL_NAMES: &[&str] = &[
    "check_service_area",
    "lookup_customer",
    "get_availability",
    "book_service_call",
    "create_lead",
];

/// How many open windows `get_availability` lists.
const MAX_LISTED_WINDOWS: usize = 12;

pub struct BookingTools {
    db: Arc<Mutex<Connection>>,
    service_area: Arc<ServiceArea>,
    availability: AvailabilitySource,
    contact_phone: String,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

#[derive(Deserialize)]
struct ServiceAreaRequest {
    zip: Option<String>,
}

#[derive(Deserialize)]
struct LookupRequest {
    phone: Option<String>,
    name: Option<String>,
}

#[derive(Deserialize)]
struct AvailabilityRequest {
    preference: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookRequest {
    name: Option<String>,
    phone: Option<String>,
    zip: Option<String>,
    address: Option<String>,
    service_type: Option<String>,
    preference: Option<String>,
    notes: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LeadRequest {
    name: Option<String>,
    phone: Option<String>,
    zip: Option<String>,
    message: Option<String>,
    thread_id: Option<String>,
}

impl BookingTools {
    pub fn new(
        db: Arc<Mutex<Connection>>,
        service_area: Arc<ServiceArea>,
        availability: AvailabilitySource,
        contact_phone: String,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            db,
            service_area,
            availability,
            contact_phone,
            clock,
            ids,
        }
    }

    pub fn has_tool(name: &str) -> bool {
        TOOL_NAMES.contains(&name)
    }

    pub fn call(&self, name: &str, payload: &Value) -> Result<Value, ToolError> {
        tracing::info!(tool = name, "invoking tool");
        let result = self.run(name, payload);
        if let Err(e) = &result {
            tracing::warn!(tool = name, error = %e, "tool failed");
        }
        result
    }

    fn run(&self, name: &str, payload: &Value) -> Result<Value, ToolError> {
        match name {
            "check_service_area" => self.check_service_area(parse_payload(payload)?),
            "lookup_customer" => self.lookup_customer(parse_payload(payload)?),
            "get_availability" => self.get_availability(parse_payload(payload)?),
            "book_service_call" => self.book_service_call(parse_payload(payload)?),
            "create_lead" => self.create_lead(parse_payload(payload)?),
            other => Err(ToolError::UnknownTool(other.to_string())),
        }
    }

    fn db(&self) -> Result<MutexGuard<'_, Connection>, ToolError> {
        self.db
            .lock()
            .map_err(|_| ToolError::Storage(anyhow::anyhow!("database lock poisoned")))
    }

    fn call_us(&self) -> String {
        format!("Call us at {} and we'll take care of it.", self.contact_phone)
    }

    fn check_service_area(&self, req: ServiceAreaRequest) -> Result<Value, ToolError> {
        let raw = required(&[("zip", &req.zip)])?.remove(0);
        let zip = normalize_zip(raw)
            .ok_or_else(|| ToolError::invalid("zip", "must start with a 5-digit ZIP code"))?;
        let in_area = self.service_area.contains(&zip);

        let summary = if in_area {
            format!("Good news, we serve {zip}.")
        } else {
            format!("Sorry, {zip} is outside our service area.")
        };
        Ok(json!({
            "zip": zip,
            "inServiceArea": in_area,
            "summary": summary,
        }))
    }

    fn lookup_customer(&self, req: LookupRequest) -> Result<Value, ToolError> {
        let phone = present(&req.phone);
        let name = present(&req.name);
        if phone.is_none() && name.is_none() {
            return Err(ToolError::invalid("phone", "provide a phone number or a name"));
        }

        let db = self.db()?;
        let matches = match phone {
            Some(raw) => {
                let phone = NormalizedPhone::parse(raw);
                if !phone.is_valid() {
                    return Err(ToolError::invalid("phone", "must contain a 10-digit phone number"));
                }
                queries::find_customer_by_phone(&db, phone.as_str())?
                    .into_iter()
                    .collect::<Vec<_>>()
            }
            None => {
                let folded = normalize_name(name.unwrap_or_default());
                if folded.is_empty() {
                    Vec::new()
                } else {
                    queries::find_customers_by_name(&db, &folded)?
                }
            }
        };

        match matches.as_slice() {
            [customer] => Ok(json!({
                "found": true,
                "customer": {
                    "id": customer.id,
                    "name": customer.name,
                    "maskedPhone": NormalizedPhone::parse(&customer.phone).masked(),
                    "zip": customer.zip,
                },
                "summary": format!("Welcome back, {}!", customer.name),
                "correlationId": customer.id,
            })),
            [] => Ok(json!({
                "found": false,
                "summary": "We couldn't find you in our records. Let's set you up as a new customer.",
            })),
            many => Ok(json!({
                "found": false,
                "matches": many.len(),
                "summary": "A few customers share that name. What phone number is on the account?",
            })),
        }
    }

    fn get_availability(&self, req: AvailabilityRequest) -> Result<Value, ToolError> {
        let preference = Preference::parse(req.preference.as_deref().unwrap_or_default());
        let windows = self.current_windows()?;
        let tz = self.availability.timezone();

        let listed: Vec<Value> = windows
            .iter()
            .filter(|w| w.available)
            .take(MAX_LISTED_WINDOWS)
            .map(|w| window_json(w, tz))
            .collect();

        let Some(selection) = select_window(&windows, preference, tz) else {
            return Ok(json!({
                "windows": listed,
                "summary": "We don't have any openings right now.",
                "nextSteps": self.call_us(),
            }));
        };

        let (date, time) = describe_window(&selection.window, tz);
        Ok(json!({
            "windows": listed,
            "suggested": window_json(&selection.window, tz),
            "matchedPreference": selection.matched_preference,
            "summary": format!("The next opening is {date}, {time}."),
        }))
    }

    fn book_service_call(&self, req: BookRequest) -> Result<Value, ToolError> {
        let fields = required(&[("name", &req.name), ("phone", &req.phone), ("zip", &req.zip)])?;
        let (name, raw_phone, raw_zip) = (fields[0].trim(), fields[1], fields[2]);

        let phone = NormalizedPhone::parse(raw_phone);
        if !phone.is_valid() {
            return Err(ToolError::invalid("phone", "must contain a 10-digit phone number"));
        }
        let zip = normalize_zip(raw_zip)
            .ok_or_else(|| ToolError::invalid("zip", "must start with a 5-digit ZIP code"))?;

        if !self.service_area.contains(&zip) {
            tracing::info!(zip = %zip, "booking refused: outside service area");
            return Ok(json!({
                "booked": false,
                "inServiceArea": false,
                "summary": format!("Sorry, {zip} is outside our service area."),
                "nextSteps": self.call_us(),
            }));
        }

        let preference = Preference::parse(req.preference.as_deref().unwrap_or_default());
        let tz = self.availability.timezone();
        let now = self.clock.now();

        // Window selection and the insert happen under one lock so two
        // bookings cannot take the same window.
        let db = self.db()?;
        let (from, to) = self.availability.horizon(now);
        let existing = queries::get_bookings_in_range(&db, &from, &to)?;
        let windows = self.availability.windows(now, &existing);

        let Some(selection) = select_window(&windows, preference, tz) else {
            tracing::info!("booking refused: no open windows");
            return Ok(json!({
                "booked": false,
                "inServiceArea": true,
                "summary": "We don't have any openings in the next couple of weeks.",
                "nextSteps": self.call_us(),
            }));
        };

        let customer = queries::save_customer(
            &db,
            &Customer {
                id: self.ids.next_id(),
                name: name.to_string(),
                name_normalized: normalize_name(name),
                phone: phone.as_str().to_string(),
                zip: Some(zip.clone()),
                created_at: now,
            },
        )?;

        let booking = Booking {
            id: self.ids.next_id(),
            customer_id: customer.id.clone(),
            customer_name: customer.name.clone(),
            customer_phone: customer.phone.clone(),
            zip: zip.clone(),
            address: present(&req.address).map(str::to_string),
            service_type: present(&req.service_type).map(str::to_string),
            window_start: selection.window.start,
            window_end: selection.window.end,
            status: BookingStatus::Confirmed,
            notes: present(&req.notes).map(str::to_string),
            created_at: now,
            updated_at: now,
        };
        queries::create_booking(&db, &booking)?;
        drop(db);

        let (date, time) = describe_window(&selection.window, tz);
        let confirmation = confirmation_number(&booking.id);
        tracing::info!(
            booking_id = %booking.id,
            date = %date,
            matched = selection.matched_preference,
            "service call booked"
        );

        let summary = if selection.matched_preference || preference == Preference::Any {
            format!("You're booked for {date} between {time}.")
        } else {
            format!(
                "We didn't have a {} opening, so you're booked for {date} between {time}.",
                preference.as_str()
            )
        };

        Ok(json!({
            "booked": true,
            "summary": summary,
            "nextSteps": format!(
                "Your technician will call {} before arriving. Confirmation number {confirmation}.",
                phone.masked()
            ),
            "correlationId": booking.id,
            "matchedPreference": selection.matched_preference,
            "booking": {
                "scheduledDate": date,
                "scheduledTime": time,
                "windowStart": booking.window_start,
                "windowEnd": booking.window_end,
                "confirmationNumber": confirmation,
                "serviceType": booking.service_type,
                "address": booking.address,
                "customerName": booking.customer_name,
            },
        }))
    }

    fn create_lead(&self, req: LeadRequest) -> Result<Value, ToolError> {
        let raw_phone = required(&[("phone", &req.phone)])?.remove(0);
        let phone = NormalizedPhone::parse(raw_phone);
        if !phone.is_valid() {
            return Err(ToolError::invalid("phone", "must contain a 10-digit phone number"));
        }

        let lead = Lead {
            id: self.ids.next_id(),
            name: present(&req.name).map(str::to_string),
            phone: phone.as_str().to_string(),
            zip: req.zip.as_deref().and_then(normalize_zip),
            message: present(&req.message).map(str::to_string),
            thread_id: present(&req.thread_id).map(str::to_string),
            created_at: self.clock.now(),
        };
        queries::create_lead(&*self.db()?, &lead)?;
        tracing::info!(lead_id = %lead.id, "lead captured");

        Ok(json!({
            "summary": format!("Thanks! We'll call you back shortly at {}.", phone.masked()),
            "correlationId": lead.id,
            "leadId": lead.id,
        }))
    }

    fn current_windows(&self) -> Result<Vec<TimeWindow>, ToolError> {
        let now = self.clock.now();
        let (from, to) = self.availability.horizon(now);
        let existing = queries::get_bookings_in_range(&*self.db()?, &from, &to)?;
        Ok(self.availability.windows(now, &existing))
    }
}

fn parse_payload<T: DeserializeOwned>(payload: &Value) -> Result<T, ToolError> {
    let payload = if payload.is_null() { json!({}) } else { payload.clone() };
    serde_json::from_value(payload).map_err(|e| ToolError::invalid("payload", e.to_string()))
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// The values of every named field, or `MissingFields` listing the blank ones.
fn required<'a>(fields: &[(&str, &'a Option<String>)]) -> Result<Vec<&'a str>, ToolError> {
    let missing: Vec<String> = fields
        .iter()
        .filter(|(_, value)| present(value).is_none())
        .map(|(name, _)| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ToolError::MissingFields(missing));
    }
    Ok(fields.iter().filter_map(|(_, value)| present(value)).collect())
}

fn window_json(window: &TimeWindow, tz: chrono_tz::Tz) -> Value {
    let (date, time) = describe_window(window, tz);
    json!({
        "start": window.start,
        "end": window.end,
        "date": date,
        "time": time,
    })
}

fn confirmation_number(booking_id: &str) -> String {
    booking_id
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(8)
        .collect::<String>()
        .to_uppercase()
}
