use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::models::{Booking, BookingStatus, Customer, Lead};

fn ts(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_ts(s: &str) -> anyhow::Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}

// ── Customers ──

/// Inserts the customer, or refreshes name and ZIP for an existing phone.
/// Returns the stored row, which keeps its original id.
pub fn save_customer(conn: &Connection, customer: &Customer) -> anyhow::Result<Customer> {
    conn.execute(
        "INSERT INTO customers (id, name, name_normalized, phone, zip, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(phone) DO UPDATE SET
           name = excluded.name,
           name_normalized = excluded.name_normalized,
           zip = COALESCE(excluded.zip, customers.zip)",
        params![
            customer.id,
            customer.name,
            customer.name_normalized,
            customer.phone,
            customer.zip,
            ts(&customer.created_at),
        ],
    )?;

    find_customer_by_phone(conn, &customer.phone)?
        .ok_or_else(|| anyhow::anyhow!("customer {} vanished after save", customer.id))
}

pub fn find_customer_by_phone(conn: &Connection, phone: &str) -> anyhow::Result<Option<Customer>> {
    let row = conn
        .query_row(
            "SELECT id, name, name_normalized, phone, zip, created_at
             FROM customers WHERE phone = ?1",
            params![phone],
            |row| Ok(parse_customer_row(row)),
        )
        .optional()?;
    row.transpose()
}

pub fn find_customers_by_name(
    conn: &Connection,
    name_normalized: &str,
) -> anyhow::Result<Vec<Customer>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, name_normalized, phone, zip, created_at
         FROM customers WHERE name_normalized = ?1 ORDER BY created_at ASC",
    )?;

    let rows = stmt.query_map(params![name_normalized], |row| Ok(parse_customer_row(row)))?;

    let mut customers = vec![];
    for row in rows {
        customers.push(row??);
    }
    Ok(customers)
}

fn parse_customer_row(row: &Row) -> anyhow::Result<Customer> {
    let created_at: String = row.get(5)?;
    Ok(Customer {
        id: row.get(0)?,
        name: row.get(1)?,
        name_normalized: row.get(2)?,
        phone: row.get(3)?,
        zip: row.get(4)?,
        created_at: parse_ts(&created_at)?,
    })
}

// ── Bookings ──

pub fn create_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO bookings (id, customer_id, customer_name, customer_phone, zip, address,
                               service_type, window_start, window_end, status, notes,
                               created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            booking.id,
            booking.customer_id,
            booking.customer_name,
            booking.customer_phone,
            booking.zip,
            booking.address,
            booking.service_type,
            ts(&booking.window_start),
            ts(&booking.window_end),
            booking.status.as_str(),
            booking.notes,
            ts(&booking.created_at),
            ts(&booking.updated_at),
        ],
    )?;
    Ok(())
}

pub fn get_bookings_in_range(
    conn: &Connection,
    start: &DateTime<Utc>,
    end: &DateTime<Utc>,
) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(
        "SELECT id, customer_id, customer_name, customer_phone, zip, address, service_type,
                window_start, window_end, status, notes, created_at, updated_at
         FROM bookings
         WHERE window_start < ?2 AND window_end > ?1 AND status != 'cancelled'
         ORDER BY window_start ASC",
    )?;

    let rows = stmt.query_map(params![ts(start), ts(end)], |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn get_booking_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Booking>> {
    let row = conn
        .query_row(
            "SELECT id, customer_id, customer_name, customer_phone, zip, address, service_type,
                    window_start, window_end, status, notes, created_at, updated_at
             FROM bookings WHERE id = ?1",
            params![id],
            |row| Ok(parse_booking_row(row)),
        )
        .optional()?;
    row.transpose()
}

fn parse_booking_row(row: &Row) -> anyhow::Result<Booking> {
    let window_start: String = row.get(7)?;
    let window_end: String = row.get(8)?;
    let status: String = row.get(9)?;
    let created_at: String = row.get(11)?;
    let updated_at: String = row.get(12)?;

    Ok(Booking {
        id: row.get(0)?,
        customer_id: row.get(1)?,
        customer_name: row.get(2)?,
        customer_phone: row.get(3)?,
        zip: row.get(4)?,
        address: row.get(5)?,
        service_type: row.get(6)?,
        window_start: parse_ts(&window_start)?,
        window_end: parse_ts(&window_end)?,
        status: BookingStatus::parse(&status),
        notes: row.get(10)?,
        created_at: parse_ts(&created_at)?,
        updated_at: parse_ts(&updated_at)?,
    })
}

// ── Leads ──

pub fn create_lead(conn: &Connection, lead: &Lead) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO leads (id, name, phone, zip, message, thread_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            lead.id,
            lead.name,
            lead.phone,
            lead.zip,
            lead.message,
            lead.thread_id,
            ts(&lead.created_at),
        ],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use chrono::{Duration, TimeZone};

    fn count_leads_for_phone(conn: &Connection, phone: &str) -> i64 {
        conn.query_row(
            "SELECT COUNT(*) FROM leads WHERE phone = ?1",
            params![phone],
            |row| row.get(0),
        )
        .unwrap()
    }

    fn setup_db() -> Connection {
        db::init_db(":memory:").unwrap()
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 16, hour, 0, 0).unwrap()
    }

    fn customer(id: &str, name: &str, phone: &str) -> Customer {
        Customer {
            id: id.to_string(),
            name: name.to_string(),
            name_normalized: crate::services::normalize::normalize_name(name),
            phone: phone.to_string(),
            zip: Some("02169".to_string()),
            created_at: at(9),
        }
    }

    fn booking(
        id: &str,
        customer_id: &str,
        start: DateTime<Utc>,
        status: BookingStatus,
    ) -> Booking {
        Booking {
            id: id.to_string(),
            customer_id: customer_id.to_string(),
            customer_name: "Alice".to_string(),
            customer_phone: "6175551234".to_string(),
            zip: "02169".to_string(),
            address: Some("1 Main St".to_string()),
            service_type: Some("drain cleaning".to_string()),
            window_start: start,
            window_end: start + Duration::hours(2),
            status,
            notes: None,
            created_at: at(9),
            updated_at: at(9),
        }
    }

    #[test]
    fn test_save_customer_keeps_original_id() {
        let conn = setup_db();
        save_customer(&conn, &customer("c-1", "Alice Smith", "6175551234")).unwrap();
        let mut renamed = customer("c-2", "Alice Jones", "6175551234");
        renamed.zip = None;
        let stored = save_customer(&conn, &renamed).unwrap();

        assert_eq!(stored.id, "c-1");
        assert_eq!(stored.name, "Alice Jones");
        assert_eq!(stored.zip.as_deref(), Some("02169"));
    }

    #[test]
    fn test_find_customers_by_name() {
        let conn = setup_db();
        save_customer(&conn, &customer("c-1", "José Núñez", "6175551234")).unwrap();
        save_customer(&conn, &customer("c-2", "Bob Ray", "6175550000")).unwrap();

        let found = find_customers_by_name(&conn, "jose nunez").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "c-1");
        assert!(find_customer_by_phone(&conn, "0000000000").unwrap().is_none());
    }

    #[test]
    fn test_bookings_in_range_overlap() {
        let conn = setup_db();
        save_customer(&conn, &customer("c-1", "Alice", "6175551234")).unwrap();
        create_booking(&conn, &booking("b-1", "c-1", at(12), BookingStatus::Confirmed)).unwrap();
        create_booking(&conn, &booking("b-2", "c-1", at(16), BookingStatus::Cancelled)).unwrap();

        assert_eq!(get_bookings_in_range(&conn, &at(13), &at(20)).unwrap().len(), 1);
        assert!(get_bookings_in_range(&conn, &at(14), &at(20)).unwrap().is_empty());

        let loaded = get_booking_by_id(&conn, "b-1").unwrap().unwrap();
        assert_eq!(loaded.window_start, at(12));
        assert_eq!(loaded.status, BookingStatus::Confirmed);
        assert!(get_booking_by_id(&conn, "missing").unwrap().is_none());
    }

    #[test]
    fn test_create_lead() {
        let conn = setup_db();
        let lead = Lead {
            id: "l-1".to_string(),
            name: None,
            phone: "6175551234".to_string(),
            zip: None,
            message: Some("Leaking pipe".to_string()),
            thread_id: Some("t-1".to_string()),
            created_at: at(9),
        };
        create_lead(&conn, &lead).unwrap();
        assert_eq!(count_leads_for_phone(&conn, "6175551234"), 1);
    }
}
