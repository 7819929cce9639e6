//! Core intake conversation state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions:
//! `(snapshot, context, event) -> (effects, reply)`. All I/O lives in the
//! runtime, which executes the effects against a `LeadStore`.

mod effect;
pub mod event;
pub mod replies;
pub mod state;
pub(crate) mod transition;
mod validate;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use state::{FlowSettings, IntakeContext, LeadStatus, Snapshot};
pub use transition::{transition, TransitionResult};
