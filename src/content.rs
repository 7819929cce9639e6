//! Menu catalog for the intake flow
//!
//! Device models and selectable items are data, not code: each is an ordered
//! `{code -> label}` table, rendered as a menu in the order it was written.
//! A catalog ships embedded in the binary and can be replaced with a JSON file.

use crate::db::ITEM_SEPARATOR;
use rust_embed::Embed;
use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;
use thiserror::Error;

#[derive(Embed)]
#[folder = "content/"]
struct BundledContent;

const BUNDLED_CATALOG: &str = "catalog.json";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Catalog table is empty: {0}")]
    EmptyTable(&'static str),
    #[error("Bundled catalog is missing")]
    MissingBundle,
    #[error("Label for {table} code {code:?} contains the item separator: {label:?}")]
    SeparatorInLabel {
        table: &'static str,
        code: String,
        label: String,
    },
    #[error("{table} code {code:?} is also an exit keyword")]
    ExitKeywordCode { table: &'static str, code: String },
}

/// One menu entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuOption {
    pub code: String,
    pub label: String,
}

/// Ordered lookup table keyed by menu code
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionTable {
    options: Vec<MenuOption>,
}

impl OptionTable {
    #[allow(dead_code)] // Used in tests
    pub fn new<C, L>(pairs: impl IntoIterator<Item = (C, L)>) -> Self
    where
        C: Into<String>,
        L: Into<String>,
    {
        Self {
            options: pairs
                .into_iter()
                .map(|(code, label)| MenuOption {
                    code: code.into(),
                    label: label.into(),
                })
                .collect(),
        }
    }

    /// Look up the label for a code
    pub fn get(&self, code: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.code == code)
            .map(|o| o.label.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &MenuOption> {
        self.options.iter()
    }

    pub fn codes(&self) -> Vec<&str> {
        self.options.iter().map(|o| o.code.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

impl<'de> Deserialize<'de> for OptionTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // serde_json is built with preserve_order, so the map keeps file order
        let map = Map::<String, Value>::deserialize(deserializer)?;
        let mut options = Vec::with_capacity(map.len());
        for (code, value) in map {
            match value {
                Value::String(label) => options.push(MenuOption { code, label }),
                other => {
                    return Err(de::Error::custom(format!(
                        "label for code {code:?} must be a string, got {other}"
                    )))
                }
            }
        }
        Ok(Self { options })
    }
}

/// Both menus used by the conversation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Catalog {
    pub device_models: OptionTable,
    pub items: OptionTable,
}

impl Catalog {
    /// Load from a JSON file, or the bundled catalog when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self, CatalogError> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                Self::from_json_str(&raw)
            }
            None => Self::bundled(),
        }
    }

    pub fn bundled() -> Result<Self, CatalogError> {
        let file = BundledContent::get(BUNDLED_CATALOG).ok_or(CatalogError::MissingBundle)?;
        let catalog: Catalog = serde_json::from_slice(&file.data)?;
        catalog.validated()
    }

    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_str(raw)?;
        catalog.validated()
    }

    fn validated(self) -> Result<Self, CatalogError> {
        for (table, options) in self.tables() {
            if options.is_empty() {
                return Err(CatalogError::EmptyTable(table));
            }
            // Stored selections are joined with the separator and split on read
            if let Some(o) = options.iter().find(|o| o.label.contains(ITEM_SEPARATOR)) {
                return Err(CatalogError::SeparatorInLabel {
                    table,
                    code: o.code.clone(),
                    label: o.label.clone(),
                });
            }
        }
        Ok(self)
    }

    /// Reject menu codes that the conversation would read as an exit.
    /// Keywords are expected lower-cased, as `AppConfig` stores them.
    pub fn check_exit_keywords(&self, exit_keywords: &[String]) -> Result<(), CatalogError> {
        for (table, options) in self.tables() {
            if let Some(o) = options
                .iter()
                .find(|o| exit_keywords.contains(&o.code.trim().to_lowercase()))
            {
                return Err(CatalogError::ExitKeywordCode {
                    table,
                    code: o.code.clone(),
                });
            }
        }
        Ok(())
    }

    fn tables(&self) -> [(&'static str, &OptionTable); 2] {
        [("device_models", &self.device_models), ("items", &self.items)]
    }
}
