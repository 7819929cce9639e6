//! Effects produced by state transitions

use super::state::LeadStatus;
use crate::db::LeadField;

/// Effects to be executed by the runtime after a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Insert a fresh lead for the contact, all fields at sentinel defaults
    CreateLead,

    /// Write fields and status of the contact's most recent lead as one unit
    UpdateLead {
        status: LeadStatus,
        fields: Vec<LeadField>,
    },
}

impl Effect {
    pub fn advance(status: LeadStatus, field: LeadField) -> Self {
        Effect::UpdateLead {
            status,
            fields: vec![field],
        }
    }

    pub fn finish() -> Self {
        Effect::UpdateLead {
            status: LeadStatus::Done,
            fields: vec![],
        }
    }

    /// Status this effect leaves the lead in
    pub fn resulting_status(&self) -> LeadStatus {
        match self {
            Effect::CreateLead => LeadStatus::INITIAL,
            Effect::UpdateLead { status, .. } => *status,
        }
    }
}
