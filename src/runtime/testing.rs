//! Mock implementations for testing
//!
//! These mocks enable runtime testing without a database.

use super::traits::*;
use crate::db::{Lead, LeadField, LeadStatus, NewLead};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

// ============================================================================
// In-Memory Lead Store
// ============================================================================

/// In-memory store keeping every lead per contact, oldest first
#[derive(Default)]
pub struct InMemoryLeadStore {
    leads: Mutex<HashMap<String, Vec<Lead>>>,
    next_id: Mutex<i64>,
}

impl InMemoryLeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of leads across all contacts
    pub fn lead_count(&self) -> usize {
        self.leads.lock().unwrap().values().map(Vec::len).sum()
    }

    /// Every lead of one contact, oldest first
    pub fn history(&self, contact_id: &str) -> Vec<Lead> {
        self.leads
            .lock()
            .unwrap()
            .get(contact_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl LeadStore for InMemoryLeadStore {
    async fn get_active_status(&self, contact_id: &str) -> Result<Option<LeadStatus>, StoreError> {
        Ok(self
            .leads
            .lock()
            .unwrap()
            .get(contact_id)
            .and_then(|history| history.last())
            .map(|lead| lead.status))
    }

    async fn get_active_record(&self, contact_id: &str) -> Result<Option<Lead>, StoreError> {
        Ok(self
            .leads
            .lock()
            .unwrap()
            .get(contact_id)
            .and_then(|history| history.last())
            .cloned())
    }

    async fn create(&self, lead: &NewLead) -> Result<Lead, StoreError> {
        let id = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            *next
        };
        let lead = lead.clone().into_lead(id);
        self.leads
            .lock()
            .unwrap()
            .entry(lead.contact_id.clone())
            .or_default()
            .push(lead.clone());
        Ok(lead)
    }

    async fn update_fields_and_status(
        &self,
        contact_id: &str,
        status: LeadStatus,
        fields: &[LeadField],
    ) -> Result<(), StoreError> {
        let mut leads = self.leads.lock().unwrap();
        let lead = leads
            .get_mut(contact_id)
            .and_then(|history| history.last_mut())
            .filter(|lead| !lead.status.is_terminal())
            .ok_or_else(|| StoreError::no_open_lead(contact_id))?;
        for field in fields {
            lead.apply(field);
        }
        lead.status = status;
        Ok(())
    }
}

// ============================================================================
// Failing Store
// ============================================================================

/// Store whose every operation fails
pub struct FailingLeadStore;

#[async_trait]
impl LeadStore for FailingLeadStore {
    async fn get_active_status(&self, _contact_id: &str) -> Result<Option<LeadStatus>, StoreError> {
        Err(StoreError("database unavailable".to_string()))
    }

    async fn get_active_record(&self, _contact_id: &str) -> Result<Option<Lead>, StoreError> {
        Err(StoreError("database unavailable".to_string()))
    }

    async fn create(&self, _lead: &NewLead) -> Result<Lead, StoreError> {
        Err(StoreError("database unavailable".to_string()))
    }

    async fn update_fields_and_status(
        &self,
        _contact_id: &str,
        _status: LeadStatus,
        _fields: &[LeadField],
    ) -> Result<(), StoreError> {
        Err(StoreError("database unavailable".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_store_round_trip() {
        let store = InMemoryLeadStore::new();
        let created = store.create(&NewLead::new("c")).await.unwrap();
        assert_eq!(created.id, 1);

        store
            .update_fields_and_status(
                "c",
                LeadStatus::AwaitingYear,
                &[LeadField::DeviceModel("Xbox 360 Slim".to_string())],
            )
            .await
            .unwrap();

        let lead = store.get_active_record("c").await.unwrap().unwrap();
        assert_eq!(lead.device_model, "Xbox 360 Slim");
        assert_eq!(lead.status, LeadStatus::AwaitingYear);
        assert_eq!(lead.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_in_memory_store_keeps_done_immutable() {
        let store = InMemoryLeadStore::new();
        store.create(&NewLead::new("c")).await.unwrap();
        store
            .update_fields_and_status("c", LeadStatus::Done, &[])
            .await
            .unwrap();
        let result = store
            .update_fields_and_status("c", LeadStatus::AwaitingEmail, &[])
            .await;
        assert_eq!(result, Err(StoreError::no_open_lead("c")));

        assert_eq!(
            store.get_active_status("c").await.unwrap(),
            Some(LeadStatus::Done)
        );
    }

    #[tokio::test]
    async fn test_most_recent_lead_wins() {
        let store = InMemoryLeadStore::new();
        store.create(&NewLead::new("c")).await.unwrap();
        store
            .update_fields_and_status("c", LeadStatus::Done, &[])
            .await
            .unwrap();
        let second = store.create(&NewLead::new("c")).await.unwrap();

        let active = store.get_active_record("c").await.unwrap().unwrap();
        assert_eq!(active.id, second.id);
        assert_eq!(store.history("c").len(), 2);
    }

    #[tokio::test]
    async fn test_failing_store() {
        let store = FailingLeadStore;
        assert!(store.get_active_status("c").await.is_err());
        assert!(store.create(&NewLead::new("c")).await.is_err());
    }
}
