//! Input validators for each question

use crate::content::OptionTable;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

pub const MIN_YEAR: i32 = 2007;
pub const MAX_YEAR: i32 = 2015;

/// Consoles from this year cannot be permanently unlocked
pub const LOCKED_YEAR: i32 = 2015;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"))
}

/// First character upper-cased, the rest lower-cased
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Letters and spaces only, at least one letter. Returns the stored form.
pub fn name(text: &str) -> Option<String> {
    let text = text.trim();
    let valid = text.chars().any(char::is_alphabetic)
        && text.chars().all(|c| c.is_alphabetic() || c == ' ');
    valid.then(|| capitalize(text))
}

/// `local@domain.tld` with no whitespace. Returns the stored (lower-cased) form.
pub fn email(text: &str) -> Option<String> {
    let text = text.trim();
    email_regex().is_match(text).then(|| text.to_lowercase())
}

/// Any non-empty text. Returns the stored form.
pub fn address(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| capitalize(text))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearError {
    NotNumeric,
    OutOfRange,
}

pub fn year(text: &str) -> Result<i32, YearError> {
    let year: i32 = text.trim().parse().map_err(|_| YearError::NotNumeric)?;
    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
        Ok(year)
    } else {
        Err(YearError::OutOfRange)
    }
}

/// Comma-separated codes, each in the table, no repeats, count within bounds.
/// Returns the mapped labels in the order given.
pub fn items(text: &str, table: &OptionTable, min: usize, max: usize) -> Option<Vec<String>> {
    let codes: Vec<&str> = text.split(',').map(str::trim).collect();
    if codes.len() < min || codes.len() > max {
        return None;
    }

    let mut seen = HashSet::new();
    let mut labels = Vec::with_capacity(codes.len());
    for code in codes {
        if !seen.insert(code) {
            return None;
        }
        labels.push(table.get(code)?.to_string());
    }
    Some(labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> OptionTable {
        OptionTable::new([("1", "Halo 4"), ("2", "GTA V"), ("3", "Minecraft")])
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("maria SILVA"), "Maria silva");
        assert_eq!(capitalize("élan"), "Élan");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_name() {
        assert_eq!(name("maria"), Some("Maria".to_string()));
        assert_eq!(name("  joão da silva "), Some("João da silva".to_string()));
        assert_eq!(name("r2d2"), None);
        assert_eq!(name("   "), None);
        assert_eq!(name(""), None);
        assert_eq!(name("ana!"), None);
    }

    #[test]
    fn test_email() {
        assert_eq!(email("M@X.com"), Some("m@x.com".to_string()));
        assert_eq!(email("first.last@mail.co.uk"), Some("first.last@mail.co.uk".to_string()));
        assert_eq!(email("no-at-sign.com"), None);
        assert_eq!(email("a@b"), None);
        assert_eq!(email("a@@b.com"), None);
        assert_eq!(email("a b@c.com"), None);
        assert_eq!(email("@b.com"), None);
    }

    #[test]
    fn test_address() {
        assert_eq!(address("rua 1"), Some("Rua 1".to_string()));
        assert_eq!(address("  "), None);
    }

    #[test]
    fn test_year_errors_are_distinct() {
        assert_eq!(year("2007"), Ok(2007));
        assert_eq!(year(" 2015 "), Ok(2015));
        assert_eq!(year("2006"), Err(YearError::OutOfRange));
        assert_eq!(year("2016"), Err(YearError::OutOfRange));
        assert_eq!(year("two thousand"), Err(YearError::NotNumeric));
        assert_eq!(year("2010.5"), Err(YearError::NotNumeric));
        assert_eq!(year(""), Err(YearError::NotNumeric));
    }

    #[test]
    fn test_items() {
        let table = table();
        assert_eq!(
            items("1, 3", &table, 1, 15),
            Some(vec!["Halo 4".to_string(), "Minecraft".to_string()])
        );
        assert_eq!(items("1,4", &table, 1, 15), None);
        assert_eq!(items("1,,2", &table, 1, 15), None);
        assert_eq!(items("1,1", &table, 1, 15), None);
        assert_eq!(items("", &table, 1, 15), None);
    }

    #[test]
    fn test_items_bounds() {
        let table = table();
        assert_eq!(items("1,2", &table, 3, 3), None);
        assert!(items("1,2,3", &table, 3, 3).is_some());
        assert_eq!(items("1,2,3", &table, 1, 2), None);
    }
}
