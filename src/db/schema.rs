//! Database schema and types

pub use crate::state_machine::LeadStatus;
use chrono::{DateTime, Utc};
use rusqlite::ToSql;
use serde::{Deserialize, Serialize};

/// SQL schema for initialization
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS leads (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at TEXT NOT NULL,
    contact_id TEXT NOT NULL,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    address TEXT NOT NULL,
    device_model TEXT NOT NULL,
    manufacture_year INTEGER NOT NULL DEFAULT 0,
    storage_type TEXT NOT NULL,
    selected_items TEXT NOT NULL,
    status TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_leads_contact ON leads(contact_id, id DESC);
CREATE INDEX IF NOT EXISTS idx_leads_created ON leads(created_at);
";

/// Column list shared by every lead query, in `parse_lead_row` order
pub const LEAD_COLUMNS: &str = "id, created_at, contact_id, name, email, address, device_model, \
     manufacture_year, storage_type, selected_items, status";

/// Placeholder for text fields not yet collected
pub const NOT_PROVIDED: &str = "not provided";

/// Placeholder for a manufacture year not yet collected
pub const YEAR_NOT_PROVIDED: i32 = 0;

/// Stored in `selected_items` when the customer continued without storage
pub const NO_ITEMS_SELECTED: &str = "None (no storage available)";

/// Separator used when joining selected item labels
pub const ITEM_SEPARATOR: &str = ", ";

/// One customer intake record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub contact_id: String,
    pub name: String,
    pub email: String,
    pub address: String,
    pub device_model: String,
    pub manufacture_year: i32,
    pub storage_type: String,
    pub selected_items: String,
    pub status: LeadStatus,
}

impl Lead {
    /// Selected item labels, empty while the field holds a sentinel
    pub fn item_labels(&self) -> Vec<&str> {
        if self.selected_items == NOT_PROVIDED || self.selected_items == NO_ITEMS_SELECTED {
            return vec![];
        }
        self.selected_items
            .split(ITEM_SEPARATOR)
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn has_model(&self) -> bool {
        self.device_model != NOT_PROVIDED
    }

    /// Apply a field update in memory
    #[allow(dead_code)] // Used by the in-memory store
    pub fn apply(&mut self, field: &LeadField) {
        match field {
            LeadField::Name(v) => self.name.clone_from(v),
            LeadField::Email(v) => self.email.clone_from(v),
            LeadField::Address(v) => self.address.clone_from(v),
            LeadField::DeviceModel(v) => self.device_model.clone_from(v),
            LeadField::ManufactureYear(y) => self.manufacture_year = *y,
            LeadField::StorageType(v) => self.storage_type.clone_from(v),
            LeadField::SelectedItems(v) => self.selected_items.clone_from(v),
        }
    }
}

/// A lead about to be inserted; the store assigns the id
#[derive(Debug, Clone, PartialEq)]
pub struct NewLead {
    pub contact_id: String,
    pub created_at: DateTime<Utc>,
}

impl NewLead {
    pub fn new(contact_id: impl Into<String>) -> Self {
        Self {
            contact_id: contact_id.into(),
            created_at: Utc::now(),
        }
    }

    /// The full record with every field at its sentinel default
    pub fn into_lead(self, id: i64) -> Lead {
        Lead {
            id,
            created_at: self.created_at,
            contact_id: self.contact_id,
            name: NOT_PROVIDED.to_string(),
            email: NOT_PROVIDED.to_string(),
            address: NOT_PROVIDED.to_string(),
            device_model: NOT_PROVIDED.to_string(),
            manufacture_year: YEAR_NOT_PROVIDED,
            storage_type: NOT_PROVIDED.to_string(),
            selected_items: NOT_PROVIDED.to_string(),
            status: LeadStatus::INITIAL,
        }
    }
}

/// A single column write, typed per field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeadField {
    Name(String),
    Email(String),
    Address(String),
    DeviceModel(String),
    ManufactureYear(i32),
    StorageType(String),
    SelectedItems(String),
}

impl LeadField {
    pub fn column(&self) -> &'static str {
        match self {
            LeadField::Name(_) => "name",
            LeadField::Email(_) => "email",
            LeadField::Address(_) => "address",
            LeadField::DeviceModel(_) => "device_model",
            LeadField::ManufactureYear(_) => "manufacture_year",
            LeadField::StorageType(_) => "storage_type",
            LeadField::SelectedItems(_) => "selected_items",
        }
    }

    pub fn value(&self) -> &dyn ToSql {
        match self {
            LeadField::Name(v)
            | LeadField::Email(v)
            | LeadField::Address(v)
            | LeadField::DeviceModel(v)
            | LeadField::StorageType(v)
            | LeadField::SelectedItems(v) => v,
            LeadField::ManufactureYear(y) => y,
        }
    }
}
