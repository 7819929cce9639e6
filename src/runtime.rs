//! Runtime for handling inbound messages
//!
//! Reads what the store knows about a contact, runs the pure transition,
//! then executes the resulting effects. Messages from the same contact are
//! serialized; different contacts proceed independently.

pub mod traits;

#[cfg(test)]
pub mod testing;

pub use traits::*;

use crate::db::NewLead;
use crate::state_machine::{transition, Effect, Event, IntakeContext, Snapshot};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Mutex as AsyncMutex;

/// Message handler generic over the lead store
pub struct IntakeRuntime<S: LeadStore> {
    context: IntakeContext,
    store: S,
    /// One async lock per contact with a message in flight
    contact_locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl<S: LeadStore> IntakeRuntime<S> {
    pub fn new(context: IntakeContext, store: S) -> Self {
        Self {
            context,
            store,
            contact_locks: Mutex::new(HashMap::new()),
        }
    }

    #[allow(dead_code)] // Used in tests
    pub fn store(&self) -> &S {
        &self.store
    }

    #[allow(dead_code)] // Used in tests
    pub fn context(&self) -> &IntakeContext {
        &self.context
    }

    /// Handle one inbound message and return the reply text
    ///
    /// A `StoreError` aborts the request; effects after the failing one
    /// are not executed.
    pub async fn handle_message(&self, contact_id: &str, text: &str) -> Result<String, StoreError> {
        let lock = self.acquire_contact_lock(contact_id);
        let result = {
            let _guard = lock.lock().await;
            self.process_message(contact_id, text).await
        };
        self.release_contact_lock(contact_id, lock);
        result
    }

    async fn process_message(&self, contact_id: &str, text: &str) -> Result<String, StoreError> {
        let event = Event::classify(text, &self.context.settings);
        tracing::debug!(contact_id, ?event, "Inbound message");

        let status = self.store.get_active_status(contact_id).await?;
        let record = match status {
            Some(s) if !s.is_terminal() => self.store.get_active_record(contact_id).await?,
            _ => None,
        };

        let result = transition(&Snapshot { status, record }, &self.context, event);

        tracing::info!(
            contact_id,
            from = ?status,
            to = ?result.new_status,
            effects = result.effects.len(),
            "Transition"
        );

        for effect in result.effects {
            self.execute_effect(contact_id, effect).await?;
        }

        Ok(result.reply)
    }

    async fn execute_effect(&self, contact_id: &str, effect: Effect) -> Result<(), StoreError> {
        match effect {
            Effect::CreateLead => {
                let lead = self.store.create(&NewLead::new(contact_id)).await?;
                tracing::info!(contact_id, lead_id = lead.id, "Created lead");
            }
            Effect::UpdateLead { status, fields } => {
                self.store
                    .update_fields_and_status(contact_id, status, &fields)
                    .await?;
            }
        }
        Ok(())
    }

    fn acquire_contact_lock(&self, contact_id: &str) -> Arc<AsyncMutex<()>> {
        let mut locks = self
            .contact_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(contact_id.to_string()).or_default())
    }

    /// Drop our handle and forget the lock once nobody else holds it
    fn release_contact_lock(&self, contact_id: &str, lock: Arc<AsyncMutex<()>>) {
        drop(lock);
        let mut locks = self
            .contact_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if locks
            .get(contact_id)
            .is_some_and(|l| Arc::strong_count(l) == 1)
        {
            locks.remove(contact_id);
        }
    }

    #[cfg(test)]
    fn tracked_contacts(&self) -> usize {
        self.contact_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
