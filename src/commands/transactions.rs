use crate::errors::{TrackerError, TrackerResult};
use crate::output::format::ToOutputFormat;
use crate::output::table::TableOutput;
use crate::output::{Output, OutputForTesting};
use crate::store::model::Record;
use crate::store::TransactionStore;
use anyhow::{Context, Result};
use std::io::Write;

/// Validates the user's input and stores it. Validation errors come back
/// unwrapped so the caller can tell them apart from persistence failures.
pub fn command_add(
    store: &mut TransactionStore,
    date: &str,
    amount: &str,
    category: &str,
    description: &str,
) -> TrackerResult<Record> {
    let record = Record::create(date, amount, category, description)?;
    let id = store.add(record)?;
    store.get(id).cloned().ok_or(TrackerError::UnknownRecord(id))
}

pub fn command_list<W>(store: &TransactionStore, writer: &mut W) -> Result<OutputForTesting>
where
    W: Write,
{
    let records = store.list_sorted_by_date_desc();
    TableOutput::new(writer).render_transactions(&records)
}

/// The record that `command_delete` would remove, for confirmation prompts.
pub fn record_at(store: &TransactionStore, position: usize) -> Option<&Record> {
    store.list_sorted_by_date_desc().get(position).copied()
}

pub fn command_delete(store: &mut TransactionStore, position: usize) -> Result<Record> {
    store
        .delete_at(position)
        .with_context(|| format!("failed to delete transaction #{position}"))
}

pub fn describe(record: &Record) -> String {
    format!(
        "{} {} {} ({})",
        record.date.to_output_format(),
        record.amount.to_output_format(),
        record.category,
        record.description
    )
}
