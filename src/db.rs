//! Database module for the intake service
//!
//! Provides persistence for leads. The most recent lead of a contact is the
//! one with the highest id.

mod schema;

pub use schema::*;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, ToSql};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type DbResult<T> = Result<T, DbError>;

/// Thread-safe database handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    #[allow(dead_code)] // Used in tests
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn run_migrations(&self) -> DbResult<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // ==================== Conversation Operations ====================

    /// Insert a new lead with every field at its sentinel default
    pub fn create_lead(&self, new_lead: &NewLead) -> DbResult<Lead> {
        let conn = self.conn();
        let lead = new_lead.clone().into_lead(0);

        conn.execute(
            "INSERT INTO leads (created_at, contact_id, name, email, address, device_model,
                                manufacture_year, storage_type, selected_items, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                lead.created_at.to_rfc3339(),
                lead.contact_id,
                lead.name,
                lead.email,
                lead.address,
                lead.device_model,
                lead.manufacture_year,
                lead.storage_type,
                lead.selected_items,
                lead.status.as_str(),
            ],
        )?;

        Ok(Lead {
            id: conn.last_insert_rowid(),
            ..lead
        })
    }

    /// Status of the contact's most recent lead. Unknown status strings
    /// count as no active lead.
    pub fn latest_status(&self, contact_id: &str) -> DbResult<Option<LeadStatus>> {
        let conn = self.conn();
        let raw: Option<String> = conn
            .query_row(
                "SELECT status FROM leads WHERE contact_id = ?1 ORDER BY id DESC LIMIT 1",
                params![contact_id],
                |row| row.get(0),
            )
            .optional()?;

        Ok(raw.and_then(|s| parse_status(&s)))
    }

    /// The contact's most recent lead
    pub fn latest_lead(&self, contact_id: &str) -> DbResult<Option<Lead>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {LEAD_COLUMNS} FROM leads WHERE contact_id = ?1 ORDER BY id DESC LIMIT 1"
        ))?;

        let lead = stmt
            .query_row(params![contact_id], parse_lead_row)
            .optional()?;
        Ok(lead.flatten())
    }

    /// Write fields and status of the contact's most recent lead in one
    /// statement. Finished leads are never touched.
    ///
    /// Returns whether a row was updated.
    pub fn update_latest_lead(
        &self,
        contact_id: &str,
        status: LeadStatus,
        fields: &[LeadField],
    ) -> DbResult<bool> {
        let conn = self.conn();

        let mut assignments: Vec<String> = fields
            .iter()
            .enumerate()
            .map(|(i, f)| format!("{} = ?{}", f.column(), i + 1))
            .collect();
        let status_idx = fields.len() + 1;
        let contact_idx = fields.len() + 2;
        assignments.push(format!("status = ?{status_idx}"));

        let sql = format!(
            "UPDATE leads SET {}
             WHERE id = (SELECT MAX(id) FROM leads WHERE contact_id = ?{contact_idx})
               AND status != 'DONE'",
            assignments.join(", ")
        );

        let status_str = status.as_str();
        let mut values: Vec<&dyn ToSql> = fields.iter().map(LeadField::value).collect();
        values.push(&status_str);
        values.push(&contact_id);

        let updated = conn.execute(&sql, values.as_slice())?;
        Ok(updated > 0)
    }

    // ==================== Reporting Operations ====================

    /// All leads, newest first, optionally filtered by status
    pub fn list_leads(&self, status: Option<LeadStatus>) -> DbResult<Vec<Lead>> {
        let conn = self.conn();
        let status_str = status.map(LeadStatus::as_str);
        let (filter, args): (&str, Vec<&dyn ToSql>) = match &status_str {
            Some(s) => ("WHERE status = ?1", vec![s as &dyn ToSql]),
            None => ("", vec![]),
        };

        let mut stmt = conn.prepare(&format!(
            "SELECT {LEAD_COLUMNS} FROM leads {filter} ORDER BY id DESC"
        ))?;
        let rows = stmt.query_map(args.as_slice(), parse_lead_row)?;

        let mut leads = Vec::new();
        for row in rows {
            if let Some(lead) = row? {
                leads.push(lead);
            }
        }
        Ok(leads)
    }

    pub fn lead_count(&self) -> DbResult<i64> {
        let conn = self.conn();
        conn.query_row("SELECT COUNT(*) FROM leads", [], |row| row.get(0))
            .map_err(DbError::from)
    }

    /// Creation time of the newest lead
    pub fn last_created_at(&self) -> DbResult<Option<DateTime<Utc>>> {
        let conn = self.conn();
        let raw: Option<String> = conn
            .query_row(
                "SELECT created_at FROM leads ORDER BY id DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(raw.and_then(|s| parse_datetime(&s)))
    }
}

/// Parse a lead row. Rows with an unknown status or an unreadable
/// timestamp are skipped.
fn parse_lead_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Option<Lead>> {
    let Some(status) = parse_status(&row.get::<_, String>(10)?) else {
        return Ok(None);
    };
    let Some(created_at) = parse_datetime(&row.get::<_, String>(1)?) else {
        return Ok(None);
    };

    Ok(Some(Lead {
        id: row.get(0)?,
        created_at,
        contact_id: row.get(2)?,
        name: row.get(3)?,
        email: row.get(4)?,
        address: row.get(5)?,
        device_model: row.get(6)?,
        manufacture_year: row.get(7)?,
        storage_type: row.get(8)?,
        selected_items: row.get(9)?,
        status,
    }))
}

fn parse_status(s: &str) -> Option<LeadStatus> {
    match s.parse() {
        Ok(status) => Some(status),
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring lead with unknown status");
            None
        }
    }
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(s) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(e) => {
            tracing::warn!(value = s, error = %e, "Ignoring lead with invalid created_at");
            None
        }
    }
}
