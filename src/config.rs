//! Service configuration from environment variables

use crate::state_machine::FlowSettings;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_PORT: u16 = 8000;

/// Everything the service reads at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub port: u16,
    /// Catalog JSON file; the bundled catalog is used when unset
    pub content_path: Option<PathBuf>,
    pub flow: FlowSettings,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Invalid values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let db_path = lookup("INTAKE_DB_PATH").map_or_else(
            || {
                let home = lookup("HOME").unwrap_or_else(|| "/tmp".to_string());
                PathBuf::from(format!("{home}/.repair-intake/intake.db"))
            },
            PathBuf::from,
        );

        let defaults = FlowSettings::default();
        let mut min_items = parse_or(&lookup, "INTAKE_MIN_ITEMS", defaults.min_items);
        let mut max_items = parse_or(&lookup, "INTAKE_MAX_ITEMS", defaults.max_items);
        if min_items == 0 {
            tracing::warn!("INTAKE_MIN_ITEMS must be at least 1, using 1");
            min_items = 1;
        }
        if min_items > max_items {
            tracing::warn!(min_items, max_items, "Item bounds inverted, clamping max to min");
            max_items = min_items;
        }

        let flow = FlowSettings {
            greeting_keywords: keywords_or(
                &lookup,
                "INTAKE_GREETING_KEYWORDS",
                defaults.greeting_keywords,
            ),
            exit_keywords: keywords_or(&lookup, "INTAKE_EXIT_KEYWORDS", defaults.exit_keywords),
            min_items,
            max_items,
            location_url: lookup("INTAKE_LOCATION_URL").unwrap_or(defaults.location_url),
            shop_name: lookup("INTAKE_SHOP_NAME").unwrap_or(defaults.shop_name),
        };

        Self {
            db_path,
            port: parse_or(&lookup, "INTAKE_PORT", DEFAULT_PORT),
            content_path: lookup("INTAKE_CONTENT_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            flow,
        }
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Invalid value, using default");
            default
        }),
    }
}

/// Comma-separated keywords, trimmed and lower-cased
fn keywords_or(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: Vec<String>,
) -> Vec<String> {
    let Some(raw) = lookup(key) else {
        return default;
    };
    let keywords: Vec<String> = raw
        .split(',')
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();
    if keywords.is_empty() {
        tracing::warn!(key, "No keywords given, using default");
        default
    } else {
        keywords
    }
}
