//! Intake conversation state types

use crate::content::Catalog;
use crate::db::Lead;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

// ============================================================================
// Lead Status
// ============================================================================

/// Conversation state of a lead, in flow order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeadStatus {
    AwaitingName,
    AwaitingEmail,
    AwaitingAddress,
    AwaitingModel,
    AwaitingYear,
    AwaitingStorage,
    /// Only entered when the customer has no storage
    AwaitingContinue,
    AwaitingItems,
    AwaitingLocationConsent,
    /// Terminal: the record is closed and never mutated again
    Done,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 10] = [
        LeadStatus::AwaitingName,
        LeadStatus::AwaitingEmail,
        LeadStatus::AwaitingAddress,
        LeadStatus::AwaitingModel,
        LeadStatus::AwaitingYear,
        LeadStatus::AwaitingStorage,
        LeadStatus::AwaitingContinue,
        LeadStatus::AwaitingItems,
        LeadStatus::AwaitingLocationConsent,
        LeadStatus::Done,
    ];

    /// Status a freshly created lead starts in
    pub const INITIAL: LeadStatus = LeadStatus::AwaitingName;

    pub fn as_str(self) -> &'static str {
        match self {
            LeadStatus::AwaitingName => "AWAITING_NAME",
            LeadStatus::AwaitingEmail => "AWAITING_EMAIL",
            LeadStatus::AwaitingAddress => "AWAITING_ADDRESS",
            LeadStatus::AwaitingModel => "AWAITING_MODEL",
            LeadStatus::AwaitingYear => "AWAITING_YEAR",
            LeadStatus::AwaitingStorage => "AWAITING_STORAGE",
            LeadStatus::AwaitingContinue => "AWAITING_CONTINUE",
            LeadStatus::AwaitingItems => "AWAITING_ITEMS",
            LeadStatus::AwaitingLocationConsent => "AWAITING_LOCATION_CONSENT",
            LeadStatus::Done => "DONE",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, LeadStatus::Done)
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown lead status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for LeadStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LeadStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

// ============================================================================
// Storage Menu
// ============================================================================

/// Fixed storage menu offered after the manufacture year
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageChoice {
    InternalHd,
    ExternalHd,
    PenDrive,
    NoStorage,
}

impl StorageChoice {
    pub const ALL: [StorageChoice; 4] = [
        StorageChoice::InternalHd,
        StorageChoice::ExternalHd,
        StorageChoice::PenDrive,
        StorageChoice::NoStorage,
    ];

    pub fn from_code(code: &str) -> Option<Self> {
        StorageChoice::ALL.into_iter().find(|c| c.code() == code)
    }

    pub fn code(self) -> &'static str {
        match self {
            StorageChoice::InternalHd => "1",
            StorageChoice::ExternalHd => "2",
            StorageChoice::PenDrive => "3",
            StorageChoice::NoStorage => "4",
        }
    }

    /// Label persisted in `storage_type`
    pub fn label(self) -> &'static str {
        match self {
            StorageChoice::InternalHd => "Internal HD",
            StorageChoice::ExternalHd => "External HD",
            StorageChoice::PenDrive => "Pen drive 16GB+",
            StorageChoice::NoStorage => "No storage",
        }
    }
}

// ============================================================================
// Flow Settings and Context
// ============================================================================

/// Tunable business rules of the flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowSettings {
    /// Lower-cased keywords that open a new lead
    pub greeting_keywords: Vec<String>,
    /// Lower-cased keywords that close the conversation from any state
    pub exit_keywords: Vec<String>,
    pub min_items: usize,
    pub max_items: usize,
    pub location_url: String,
    pub shop_name: String,
}

pub const DEFAULT_MIN_ITEMS: usize = 1;
pub const DEFAULT_MAX_ITEMS: usize = 15;
pub const DEFAULT_LOCATION_URL: &str = "https://maps.app.goo.gl/G4HYUhf9JqWPkJoT7";
pub const DEFAULT_SHOP_NAME: &str = "Da Hora Games";

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            greeting_keywords: vec!["hi".to_string()],
            exit_keywords: vec!["9".to_string()],
            min_items: DEFAULT_MIN_ITEMS,
            max_items: DEFAULT_MAX_ITEMS,
            location_url: DEFAULT_LOCATION_URL.to_string(),
            shop_name: DEFAULT_SHOP_NAME.to_string(),
        }
    }
}

impl FlowSettings {
    /// The keyword shown to customers when asking them to restart
    pub fn greeting(&self) -> &str {
        self.greeting_keywords.first().map_or("hi", String::as_str)
    }

    /// The keyword shown in the `[9 - Exit]` footer
    pub fn exit(&self) -> &str {
        self.exit_keywords.first().map_or("9", String::as_str)
    }
}

/// Immutable configuration shared by every transition
#[derive(Debug, Clone)]
pub struct IntakeContext {
    pub catalog: Arc<Catalog>,
    pub settings: FlowSettings,
}

impl IntakeContext {
    pub fn new(catalog: Arc<Catalog>, settings: FlowSettings) -> Self {
        Self { catalog, settings }
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// What the store knows about a contact right before a message is handled
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// Status of the contact's most recent lead; `None` when there is no
    /// lead or its stored status is not a known state
    pub status: Option<LeadStatus>,
    /// Full most-recent record, loaded when the status is non-terminal
    pub record: Option<Lead>,
}

#[allow(dead_code)] // Used in tests
impl Snapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn of(lead: Lead) -> Self {
        Self {
            status: Some(lead.status),
            record: Some(lead),
        }
    }
}
