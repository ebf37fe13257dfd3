use crate::aggregate::{CategoryShare, Month, MonthSummary};
use crate::store::model::Record;
use anyhow::Result;
use std::io::Write;

pub mod chart;
pub mod format;
pub mod table;

/// What was rendered, so tests don't have to parse terminal output.
#[derive(Debug)]
pub enum OutputForTesting {
    Table((Vec<String>, Vec<Vec<String>>)),
    Chart(String),
    /// Nothing to draw, e.g. a month without expenses.
    Nothing,
}

pub trait Output<W>
where
    W: Write,
{
    fn new(writer: W) -> Self;
    /// `records` must already be in display order; positions are derived from it.
    fn render_transactions(&mut self, records: &[&Record]) -> Result<OutputForTesting>;
    fn render_months(&mut self, months: &[Month]) -> Result<OutputForTesting>;
    fn render_summary(&mut self, summary: &MonthSummary) -> Result<OutputForTesting>;
    fn render_breakdown(
        &mut self,
        month: Month,
        shares: &[CategoryShare],
    ) -> Result<OutputForTesting>;
}
