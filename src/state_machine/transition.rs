//! Pure state transition function
//!
//! Given what the store knows about a contact and a classified message,
//! decide the effects to persist and the reply to send. No I/O happens here.

use super::replies;
use super::state::{IntakeContext, LeadStatus, Snapshot, StorageChoice};
use super::validate::{self, YearError};
use super::{Effect, Event};
use crate::db::{Lead, LeadField, ITEM_SEPARATOR, NO_ITEMS_SELECTED};

/// Result of a state transition
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionResult {
    /// Status after the effects are applied; `None` when no lead is active
    pub new_status: Option<LeadStatus>,
    pub effects: Vec<Effect>,
    pub reply: String,
}

impl TransitionResult {
    /// Reply without touching the store
    pub fn reply_only(status: Option<LeadStatus>, reply: impl Into<String>) -> Self {
        Self {
            new_status: status,
            effects: vec![],
            reply: reply.into(),
        }
    }

    pub fn with_effect(effect: Effect, reply: impl Into<String>) -> Self {
        Self {
            new_status: Some(effect.resulting_status()),
            effects: vec![effect],
            reply: reply.into(),
        }
    }

    #[allow(dead_code)] // Used in tests
    pub fn is_noop(&self) -> bool {
        self.effects.is_empty()
    }
}

/// Pure transition function
///
/// Global rules are checked first, in order: exit, greeting without an
/// active lead, finished lead, no lead. Everything else goes to the handler
/// for the current status.
pub fn transition(snapshot: &Snapshot, ctx: &IntakeContext, event: Event) -> TransitionResult {
    let settings = &ctx.settings;

    match (snapshot.status, event) {
        // Exit from an active conversation closes it
        (Some(status), Event::Exit) if !status.is_terminal() => {
            TransitionResult::with_effect(Effect::finish(), replies::exited(settings))
        }

        // Exit with nothing active: finished leads stay immutable
        (status, Event::Exit) => TransitionResult::reply_only(status, replies::exited(settings)),

        // Greeting opens a new lead when none is active
        (None | Some(LeadStatus::Done), Event::Greeting { .. }) => {
            TransitionResult::with_effect(Effect::CreateLead, replies::welcome(settings))
        }

        (Some(LeadStatus::Done), Event::Answer { .. }) => TransitionResult::reply_only(
            Some(LeadStatus::Done),
            replies::already_finished(settings),
        ),

        (None, Event::Answer { .. }) => {
            TransitionResult::reply_only(None, replies::say_greeting(settings))
        }

        // Active lead: the greeting is an ordinary answer here
        (Some(status), event) => {
            let Some(lead) = &snapshot.record else {
                tracing::warn!(status = %status, "Status present but record missing, closing lead");
                return TransitionResult::with_effect(
                    Effect::finish(),
                    replies::record_missing(settings),
                );
            };
            handle_answer(status, lead, &event.into_text(), ctx)
        }
    }
}

/// Per-state handlers. Invalid input yields a corrective reply and no effects.
fn handle_answer(
    status: LeadStatus,
    lead: &Lead,
    text: &str,
    ctx: &IntakeContext,
) -> TransitionResult {
    let settings = &ctx.settings;
    let catalog = &ctx.catalog;
    let stay = |reply: String| TransitionResult::reply_only(Some(status), reply);

    match status {
        LeadStatus::AwaitingName => match validate::name(text) {
            Some(name) => TransitionResult::with_effect(
                Effect::advance(LeadStatus::AwaitingEmail, LeadField::Name(name.clone())),
                replies::ask_email(&name, settings),
            ),
            None => stay(replies::invalid_name()),
        },

        LeadStatus::AwaitingEmail => match validate::email(text) {
            Some(email) => TransitionResult::with_effect(
                Effect::advance(LeadStatus::AwaitingAddress, LeadField::Email(email)),
                replies::ask_address(&lead.name, settings),
            ),
            None => stay(replies::invalid_email()),
        },

        LeadStatus::AwaitingAddress => match validate::address(text) {
            Some(address) => TransitionResult::with_effect(
                Effect::advance(LeadStatus::AwaitingModel, LeadField::Address(address)),
                replies::model_menu(&catalog.device_models, settings),
            ),
            None => stay(replies::invalid_address()),
        },

        LeadStatus::AwaitingModel => match catalog.device_models.get(text) {
            Some(label) => TransitionResult::with_effect(
                Effect::advance(
                    LeadStatus::AwaitingYear,
                    LeadField::DeviceModel(label.to_string()),
                ),
                replies::ask_year(settings),
            ),
            None => stay(replies::invalid_model(&catalog.device_models)),
        },

        LeadStatus::AwaitingYear => match validate::year(text) {
            Ok(year) => TransitionResult::with_effect(
                Effect::advance(LeadStatus::AwaitingStorage, LeadField::ManufactureYear(year)),
                replies::storage_menu(year, settings),
            ),
            Err(YearError::NotNumeric) => stay(replies::year_not_numeric()),
            Err(YearError::OutOfRange) => stay(replies::year_out_of_range()),
        },

        LeadStatus::AwaitingStorage => match StorageChoice::from_code(text) {
            Some(StorageChoice::NoStorage) => TransitionResult::with_effect(
                Effect::advance(
                    LeadStatus::AwaitingContinue,
                    LeadField::StorageType(StorageChoice::NoStorage.label().to_string()),
                ),
                replies::no_storage_warning(settings),
            ),
            Some(choice) => TransitionResult::with_effect(
                Effect::advance(
                    LeadStatus::AwaitingItems,
                    LeadField::StorageType(choice.label().to_string()),
                ),
                replies::items_menu(&catalog.items, settings),
            ),
            None => stay(replies::invalid_storage()),
        },

        LeadStatus::AwaitingContinue => match text {
            "1" => TransitionResult::with_effect(
                Effect::advance(
                    LeadStatus::AwaitingLocationConsent,
                    LeadField::SelectedItems(NO_ITEMS_SELECTED.to_string()),
                ),
                replies::ask_location(settings),
            ),
            "2" => TransitionResult::with_effect(Effect::finish(), replies::thanks_goodbye()),
            _ => stay(replies::invalid_continue()),
        },

        LeadStatus::AwaitingItems => {
            match validate::items(text, &catalog.items, settings.min_items, settings.max_items) {
                Some(labels) => TransitionResult::with_effect(
                    Effect::advance(
                        LeadStatus::AwaitingLocationConsent,
                        LeadField::SelectedItems(labels.join(ITEM_SEPARATOR)),
                    ),
                    replies::ask_location(settings),
                ),
                None => stay(replies::invalid_items(settings)),
            }
        }

        LeadStatus::AwaitingLocationConsent => {
            let closing = match text {
                "1" => replies::location_link(settings),
                "2" => replies::registered_goodbye(),
                _ => return stay(replies::invalid_location()),
            };
            TransitionResult::with_effect(
                Effect::finish(),
                format!("{closing}{}", replies::summary(lead)),
            )
        }

        // Routed before dispatch; kept for exhaustiveness
        LeadStatus::Done => stay(replies::already_finished(settings)),
    }
}
