use crate::aggregate::{self, Month};
use crate::output::chart::ChartOutput;
use crate::output::table::TableOutput;
use crate::output::{Output, OutputForTesting};
use crate::store::TransactionStore;
use anyhow::Result;
use std::io::Write;
use std::path::PathBuf;

/// The month to report on: the one asked for, else the most recent one with records.
pub fn selected_month(store: &TransactionStore, requested: Option<Month>) -> Option<Month> {
    requested.or_else(|| aggregate::default_month(store.all()))
}

pub fn command_months<W>(store: &TransactionStore, writer: &mut W) -> Result<OutputForTesting>
where
    W: Write,
{
    let months = aggregate::distinct_months(store.all());
    TableOutput::new(writer).render_months(&months)
}

/// Renders the month's totals followed by its expense breakdown. Nothing is
/// rendered when there are no transactions at all.
pub fn command_summary<W>(
    store: &TransactionStore,
    writer: &mut W,
    month: Option<Month>,
) -> Result<Vec<OutputForTesting>>
where
    W: Write,
{
    let Some(month) = selected_month(store, month) else {
        return Ok(Vec::new());
    };
    let Some(summary) = aggregate::summarize(store.all(), month) else {
        return Ok(Vec::new());
    };
    let shares = aggregate::category_shares(&aggregate::category_breakdown(store.all(), month));

    let mut output = TableOutput::new(writer);
    let mut rendered = vec![output.render_summary(&summary)?];
    if !shares.is_empty() {
        rendered.push(output.render_breakdown(month, &shares)?);
    }
    Ok(rendered)
}

pub fn command_chart<W>(
    store: &TransactionStore,
    writer: &mut W,
    month: Option<Month>,
    svg_path: Option<PathBuf>,
) -> Result<OutputForTesting>
where
    W: Write,
{
    let Some(month) = selected_month(store, month) else {
        return Ok(OutputForTesting::Nothing);
    };
    let shares = aggregate::category_shares(&aggregate::category_breakdown(store.all(), month));
    ChartOutput::new(writer)
        .with_svg_path(svg_path)
        .render_breakdown(month, &shares)
}
