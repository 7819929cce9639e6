//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the runtime with in-memory implementations.

use crate::db::{Database, DbError, Lead, LeadField, LeadStatus, NewLead};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// The persistence layer failed; the request is aborted
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Storage error: {0}")]
pub struct StoreError(pub String);

impl StoreError {
    /// The contact has no lead that can still be written
    pub fn no_open_lead(contact_id: &str) -> Self {
        StoreError(format!("no open lead for {contact_id}"))
    }
}

impl From<DbError> for StoreError {
    fn from(e: DbError) -> Self {
        StoreError(e.to_string())
    }
}

/// Storage for leads, keyed by contact
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Status of the contact's most recent lead
    async fn get_active_status(&self, contact_id: &str) -> Result<Option<LeadStatus>, StoreError>;

    /// The contact's most recent lead
    async fn get_active_record(&self, contact_id: &str) -> Result<Option<Lead>, StoreError>;

    /// Insert a new lead with every field at its sentinel default
    async fn create(&self, lead: &NewLead) -> Result<Lead, StoreError>;

    /// Write fields and status of the most recent lead as one unit
    async fn update_fields_and_status(
        &self,
        contact_id: &str,
        status: LeadStatus,
        fields: &[LeadField],
    ) -> Result<(), StoreError>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: LeadStore + ?Sized> LeadStore for Arc<T> {
    async fn get_active_status(&self, contact_id: &str) -> Result<Option<LeadStatus>, StoreError> {
        (**self).get_active_status(contact_id).await
    }

    async fn get_active_record(&self, contact_id: &str) -> Result<Option<Lead>, StoreError> {
        (**self).get_active_record(contact_id).await
    }

    async fn create(&self, lead: &NewLead) -> Result<Lead, StoreError> {
        (**self).create(lead).await
    }

    async fn update_fields_and_status(
        &self,
        contact_id: &str,
        status: LeadStatus,
        fields: &[LeadField],
    ) -> Result<(), StoreError> {
        (**self)
            .update_fields_and_status(contact_id, status, fields)
            .await
    }
}

// ============================================================================
// Production Adapter
// ============================================================================

/// Adapter to use Database as a `LeadStore`
#[derive(Clone)]
pub struct DatabaseStore {
    db: Database,
}

impl DatabaseStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    #[allow(dead_code)] // Useful for tests
    pub fn inner(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl LeadStore for DatabaseStore {
    async fn get_active_status(&self, contact_id: &str) -> Result<Option<LeadStatus>, StoreError> {
        Ok(self.db.latest_status(contact_id)?)
    }

    async fn get_active_record(&self, contact_id: &str) -> Result<Option<Lead>, StoreError> {
        Ok(self.db.latest_lead(contact_id)?)
    }

    async fn create(&self, lead: &NewLead) -> Result<Lead, StoreError> {
        Ok(self.db.create_lead(lead)?)
    }

    async fn update_fields_and_status(
        &self,
        contact_id: &str,
        status: LeadStatus,
        fields: &[LeadField],
    ) -> Result<(), StoreError> {
        if self.db.update_latest_lead(contact_id, status, fields)? {
            Ok(())
        } else {
            tracing::warn!(contact_id, status = %status, "No open lead to update");
            Err(StoreError::no_open_lead(contact_id))
        }
    }
}
