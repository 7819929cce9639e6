//! Reply texts sent back to the customer

use super::state::{FlowSettings, StorageChoice};
use super::validate::{LOCKED_YEAR, MAX_YEAR, MIN_YEAR};
use crate::content::OptionTable;
use crate::db::{Lead, NOT_PROVIDED, NO_ITEMS_SELECTED};
use std::fmt::Write;

/// Sent by the transport adapter when the store fails
pub const APOLOGY: &str = "Sorry, something went wrong on our side. Please try again in a moment.";

fn footer(settings: &FlowSettings) -> String {
    format!("[{} - Exit]", settings.exit())
}

fn menu(table: &OptionTable, separator: &str) -> String {
    let mut out = String::new();
    for option in table.iter() {
        let _ = writeln!(out, "{}{separator}{}", option.code, option.label);
    }
    out
}

// ==================== Global ====================

pub fn welcome(settings: &FlowSettings) -> String {
    format!(
        "Hello! 👋 Welcome to {}! To get started, please tell us your name. 🎮",
        settings.shop_name
    )
}

pub fn exited(settings: &FlowSettings) -> String {
    format!(
        "Conversation closed. To start a new one, type '{}'.",
        settings.greeting()
    )
}

pub fn already_finished(settings: &FlowSettings) -> String {
    format!(
        "Your request has already been registered. To start a new one, type '{}'.",
        settings.greeting()
    )
}

pub fn say_greeting(settings: &FlowSettings) -> String {
    format!(
        "Sorry, I didn't understand. Please type '{}' to get started.",
        settings.greeting()
    )
}

pub fn record_missing(settings: &FlowSettings) -> String {
    format!(
        "Sorry, we couldn't find your details. Please restart the conversation by typing '{}'.",
        settings.greeting()
    )
}

pub fn thanks_goodbye() -> String {
    "Understood. Thank you for using our service! Your request has been registered. \
     If you have any questions, feel free to contact us. 👍"
        .to_string()
}

// ==================== Name / Email / Address ====================

pub fn invalid_name() -> String {
    "Invalid name. Please type your name using only letters and spaces. ✍️".to_string()
}

pub fn ask_email(name: &str, settings: &FlowSettings) -> String {
    format!(
        "Great, {name}! Now, please tell us your email: {}",
        footer(settings)
    )
}

pub fn invalid_email() -> String {
    "Invalid email. Please type an email in the correct format (e.g. your.name@domain.com). 📧"
        .to_string()
}

pub fn ask_address(name: &str, settings: &FlowSettings) -> String {
    format!(
        "Thank you, {name}! What is your full address? 🏡 {}",
        footer(settings)
    )
}

pub fn invalid_address() -> String {
    "Please type your full address. 🏡".to_string()
}

// ==================== Model / Year ====================

pub fn model_menu(models: &OptionTable, settings: &FlowSettings) -> String {
    format!(
        "Thanks! Which console model do you have? Please type the option number:\n{}\n{}",
        menu(models, " - "),
        footer(settings)
    )
}

pub fn invalid_model(models: &OptionTable) -> String {
    let codes = models.codes();
    let listed = match codes.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{} or {last}", rest.join(", ")),
        _ => codes.join(""),
    };
    format!("Please type one of the valid numbers: {listed}.")
}

pub fn ask_year(settings: &FlowSettings) -> String {
    format!(
        "Got it. What year was your console manufactured? (e.g. 2008, 2012). {}",
        footer(settings)
    )
}

pub fn year_not_numeric() -> String {
    "Please type only the manufacture year (e.g. 2010). 🔢".to_string()
}

pub fn year_out_of_range() -> String {
    format!("Please type a year between {MIN_YEAR} and {MAX_YEAR}. 🗓️")
}

// ==================== Storage ====================

pub fn storage_menu(year: i32, settings: &FlowSettings) -> String {
    let mut out = String::new();
    if year == LOCKED_YEAR {
        let _ = write!(
            out,
            "Warning: consoles manufactured in {LOCKED_YEAR} cannot be permanently unlocked! ⚠️\n\n"
        );
    }
    out.push_str("Does your console have storage?\n");
    for choice in StorageChoice::ALL {
        let label = match choice {
            StorageChoice::NoStorage => "I don't have any",
            other => other.label(),
        };
        let _ = writeln!(out, "{} - {label}", choice.code());
    }
    let _ = write!(out, "\n{}", footer(settings));
    out
}

pub fn invalid_storage() -> String {
    "Invalid option. Please type a number from 1 to 4. ❌".to_string()
}

pub fn no_storage_warning(settings: &FlowSettings) -> String {
    format!(
        "Warning: without storage it won't be possible to play or copy games. \
         Do you want to continue?\n1 - Yes\n2 - No\n\n{}",
        footer(settings)
    )
}

pub fn invalid_continue() -> String {
    "Invalid option. Please type '1' to continue or '2' to finish. ❌".to_string()
}

// ==================== Items ====================

fn item_count_phrase(settings: &FlowSettings) -> String {
    if settings.min_items == settings.max_items {
        format!("exactly {}", settings.max_items)
    } else {
        format!("between {} and {}", settings.min_items, settings.max_items)
    }
}

pub fn items_menu(items: &OptionTable, settings: &FlowSettings) -> String {
    format!(
        "Choose {} games from the list below, separated by commas:\n{}\n{}",
        item_count_phrase(settings),
        menu(items, ". "),
        footer(settings)
    )
}

pub fn invalid_items(settings: &FlowSettings) -> String {
    format!(
        "Invalid selection. Please choose {} different games from the list, separated by commas.",
        item_count_phrase(settings)
    )
}

// ==================== Location / Summary ====================

pub fn ask_location(settings: &FlowSettings) -> String {
    format!(
        "All set! ✅ Would you like to receive the link to our location? (1 - Yes / 2 - No)\n\n{}",
        footer(settings)
    )
}

pub fn invalid_location() -> String {
    "Invalid option. Please type '1' for Yes or '2' for No. ❌".to_string()
}

pub fn location_link(settings: &FlowSettings) -> String {
    format!(
        "Thank you! Here is the link to our location: {}\n",
        settings.location_url
    )
}

pub fn registered_goodbye() -> String {
    "Understood. Thank you for using our service! Your request has been registered. 👋\n"
        .to_string()
}

/// Fixed-order listing of everything collected for the lead
pub fn summary(lead: &Lead) -> String {
    let items = if lead.selected_items == NO_ITEMS_SELECTED || lead.selected_items == NOT_PROVIDED
    {
        format!("{}\n", lead.selected_items)
    } else {
        lead.item_labels()
            .iter()
            .fold(String::new(), |mut out, item| {
                let _ = writeln!(out, "• {item}");
                out
            })
    };

    format!(
        "\n--- Summary of your request ---\n\
         ID: {}\n\
         Name: {}\n\
         Email: {}\n\
         Address: {}\n\
         Console model: {}\n\
         Manufacture year: {}\n\
         Storage: {}\n\
         Selected games:\n{items}\
         --- End of summary ---",
        lead.id,
        lead.name,
        lead.email,
        lead.address,
        lead.device_model,
        lead.manufacture_year,
        lead.storage_type,
    )
}
