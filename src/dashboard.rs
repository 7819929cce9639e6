//! Reporting over stored leads
//!
//! Pure functions over `&[Lead]`: the API layer loads the leads and passes
//! the current time in. Dates are UTC.

use crate::db::{Lead, LeadStatus};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Write;
use std::hash::Hash;

/// Which leads a report covers
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DashboardFilter {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Manufacture year; takes precedence over the date range
    pub year: Option<i32>,
}

impl DashboardFilter {
    pub fn matches(&self, lead: &Lead) -> bool {
        if let Some(year) = self.year {
            return lead.manufacture_year == year;
        }
        match (self.start, self.end) {
            (Some(start), Some(end)) => {
                let day = lead.created_at.date_naive();
                start <= day && day <= end
            }
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Kpis {
    pub total_leads: usize,
    pub leads_with_model: usize,
    pub leads_today: usize,
    pub leads_last_7_days: usize,
    pub completed_leads: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket<K> {
    pub key: K,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunnelStage {
    pub stage: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardReport {
    pub kpis: Kpis,
    pub by_model: Vec<Bucket<String>>,
    pub by_year: Vec<Bucket<i32>>,
    pub by_item: Vec<Bucket<String>>,
    pub by_day: Vec<Bucket<NaiveDate>>,
    pub funnel: Vec<FunnelStage>,
}

impl DashboardReport {
    pub fn build(leads: &[Lead], filter: &DashboardFilter, now: DateTime<Utc>) -> Self {
        let leads: Vec<&Lead> = leads.iter().filter(|l| filter.matches(l)).collect();

        let today = now.date_naive();
        let week_start = today - Duration::days(7);

        let kpis = Kpis {
            total_leads: leads.len(),
            leads_with_model: leads.iter().filter(|l| l.has_model()).count(),
            leads_today: leads
                .iter()
                .filter(|l| l.created_at.date_naive() == today)
                .count(),
            leads_last_7_days: leads
                .iter()
                .filter(|l| l.created_at.date_naive() >= week_start)
                .count(),
            completed_leads: leads
                .iter()
                .filter(|l| l.status == LeadStatus::Done)
                .count(),
        };

        let by_model = ranked(
            leads
                .iter()
                .filter(|l| l.has_model())
                .map(|l| l.device_model.clone()),
        );
        let by_year = ranked(
            leads
                .iter()
                .map(|l| l.manufacture_year)
                .filter(|y| *y != 0),
        );
        let by_item = ranked(
            leads
                .iter()
                .copied()
                .flat_map(Lead::item_labels)
                .map(str::to_string),
        );

        let mut by_day = ranked(leads.iter().map(|l| l.created_at.date_naive()));
        by_day.sort_by_key(|b| b.key);

        let funnel = vec![
            FunnelStage {
                stage: "Total leads",
                count: kpis.total_leads,
            },
            FunnelStage {
                stage: "Model selected",
                count: kpis.leads_with_model,
            },
        ];

        Self {
            kpis,
            by_model,
            by_year,
            by_item,
            by_day,
            funnel,
        }
    }
}

/// Count occurrences, most frequent first, ties by key
fn ranked<K: Hash + Eq + Ord>(keys: impl Iterator<Item = K>) -> Vec<Bucket<K>> {
    let mut counts: HashMap<K, usize> = HashMap::new();
    for key in keys {
        *counts.entry(key).or_default() += 1;
    }
    let mut buckets: Vec<Bucket<K>> = counts
        .into_iter()
        .map(|(key, count)| Bucket { key, count })
        .collect();
    buckets.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    buckets
}

// ==================== CSV Export ====================

const CSV_HEADER: &str = "id,created_at,contact_id,name,email,address,device_model,\
                          manufacture_year,storage_type,selected_items,status";

/// RFC 4180 CSV of the given leads, header first, CRLF line endings
pub fn leads_to_csv(leads: &[Lead]) -> String {
    let mut out = String::new();
    out.push_str(CSV_HEADER);
    out.push_str("\r\n");

    for lead in leads {
        let fields = [
            lead.id.to_string(),
            lead.created_at.to_rfc3339(),
            csv_field(&lead.contact_id),
            csv_field(&lead.name),
            csv_field(&lead.email),
            csv_field(&lead.address),
            csv_field(&lead.device_model),
            lead.manufacture_year.to_string(),
            csv_field(&lead.storage_type),
            csv_field(&lead.selected_items),
            lead.status.as_str().to_string(),
        ];
        let _ = write!(out, "{}\r\n", fields.join(","));
    }
    out
}

/// Quote a field when it contains a delimiter, quote or line break
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
