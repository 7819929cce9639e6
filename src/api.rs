//! HTTP API for the intake service
//!
//! The messaging webhook plus the JSON and CSV reporting endpoints.

mod handlers;
mod twiml;
mod types;

pub use handlers::create_router;

use crate::db::Database;
use crate::runtime::{DatabaseStore, IntakeRuntime, LeadStore};
use crate::state_machine::IntakeContext;
use std::sync::Arc;

/// Runtime as shared by the handlers
pub type SharedRuntime = IntakeRuntime<Arc<dyn LeadStore>>;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<SharedRuntime>,
    /// Read side for reporting
    pub db: Database,
}

impl AppState {
    pub fn new(db: Database, context: IntakeContext) -> Self {
        let store: Arc<dyn LeadStore> = Arc::new(DatabaseStore::new(db.clone()));
        Self::with_store(store, db, context)
    }

    pub fn with_store(store: Arc<dyn LeadStore>, db: Database, context: IntakeContext) -> Self {
        Self {
            runtime: Arc::new(IntakeRuntime::new(context, store)),
            db,
        }
    }
}
