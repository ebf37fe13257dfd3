use crate::errors::{TrackerError, TrackerResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DEFAULT_DESCRIPTION: &str = "No description";

// Offered as suggestions only, any category string is stored as given.
pub const SUGGESTED_CATEGORIES: &[&str] = &[
    "Food",
    "Entertainment",
    "Transport",
    "Bills",
    "Income",
    "Other",
];

/// Identifies a record for the lifetime of a store. Not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(pub u64);

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: Option<RecordId>,
    pub date: NaiveDate,
    pub amount: f64,
    pub category: String,
    pub description: String,
}

impl Record {
    /// Validates user-entered fields and builds a record that is not yet in any store.
    pub fn create(
        date_str: &str,
        amount_str: &str,
        category: &str,
        description: &str,
    ) -> TrackerResult<Record> {
        Ok(Record {
            id: None,
            date: parse_date(date_str)?,
            amount: parse_amount(amount_str)?,
            category: category.to_string(),
            description: normalize_description(description),
        })
    }

    pub fn is_income(&self) -> bool {
        self.amount > 0.0
    }

    pub fn is_expense(&self) -> bool {
        self.amount < 0.0
    }
}

fn parse_date(date_str: &str) -> TrackerResult<NaiveDate> {
    NaiveDate::parse_from_str(date_str.trim(), DATE_FORMAT).map_err(|e| {
        TrackerError::Validation(format!("'{date_str}' is not a YYYY-MM-DD date ({e})"))
    })
}

fn parse_amount(amount_str: &str) -> TrackerResult<f64> {
    match amount_str.trim().parse::<f64>() {
        Ok(amount) if amount.is_finite() => Ok(amount),
        _ => Err(TrackerError::Validation(format!(
            "'{amount_str}' is not a number"
        ))),
    }
}

fn normalize_description(description: &str) -> String {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        DEFAULT_DESCRIPTION.to_string()
    } else {
        trimmed.to_string()
    }
}

/// One transaction as it appears in the persisted document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub date: String,
    pub amount: f64,
    pub category: String,
    pub desc: String,
}

impl From<&Record> for RawRecord {
    fn from(record: &Record) -> Self {
        RawRecord {
            date: record.date.format(DATE_FORMAT).to_string(),
            amount: record.amount,
            category: record.category.clone(),
            desc: record.description.clone(),
        }
    }
}

impl TryFrom<RawRecord> for Record {
    type Error = String;

    fn try_from(raw: RawRecord) -> Result<Self, Self::Error> {
        let date = NaiveDate::parse_from_str(&raw.date, DATE_FORMAT)
            .map_err(|e| format!("bad date '{}': {e}", raw.date))?;
        Ok(Record {
            id: None,
            date,
            amount: raw.amount,
            category: raw.category,
            description: raw.desc,
        })
    }
}
