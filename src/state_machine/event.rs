//! Classified inbound messages

use super::state::FlowSettings;

/// Inbound message after keyword classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Exit keyword: closes the conversation from any state
    Exit,
    /// Greeting keyword: opens a new lead when none is active.
    /// Mid-conversation it is an ordinary answer, so the text is kept.
    Greeting { text: String },
    /// Anything else: an answer to the current question
    Answer { text: String },
}

impl Event {
    /// Classify a raw message body. Keywords match case-insensitively on the
    /// trimmed text; exit wins over greeting when a keyword is configured as both.
    pub fn classify(raw: &str, settings: &FlowSettings) -> Self {
        let text = raw.trim();
        let folded = text.to_lowercase();

        if settings.exit_keywords.contains(&folded) {
            Event::Exit
        } else if settings.greeting_keywords.contains(&folded) {
            Event::Greeting {
                text: text.to_string(),
            }
        } else {
            Event::Answer {
                text: text.to_string(),
            }
        }
    }

    /// The text to hand to a per-state handler
    pub fn into_text(self) -> String {
        match self {
            Event::Exit => String::new(),
            Event::Greeting { text } | Event::Answer { text } => text,
        }
    }
}
