use crate::aggregate::{CategoryShare, Month, MonthSummary};
use crate::output::format::ToOutputFormat;
use crate::output::{Output, OutputForTesting};
use crate::store::model::Record;
use anyhow::{bail, Result};
use pager::Pager;
use std::cmp::{max, min};
use std::io::Write;

const CELL_PADDING: usize = 4;

fn termwidth() -> usize {
    #[cfg(test)]
    return 40;
    #[allow(unreachable_code)]
    textwrap::termwidth()
}

fn setup_pager() {
    #[cfg(test)]
    return;
    #[allow(unreachable_code)]
    Pager::with_pager("less --quit-if-one-screen --no-init").setup()
}

fn wrap_cell(text: &str, width: usize) -> Vec<String> {
    let lines: Vec<String> = textwrap::wrap(text, width)
        .into_iter()
        .map(|line| line.into_owned())
        .collect();
    if lines.is_empty() {
        vec![String::new()]
    } else {
        lines
    }
}

fn widest_line(lines: &[String]) -> usize {
    lines
        .iter()
        .map(|line| textwrap::core::display_width(line))
        .max()
        .unwrap_or(0)
}

/// Writes one logical row, which spans as many lines as its tallest cell.
/// Continuation lines use `:` instead of `|` as the column separator.
fn write_row<W>(writer: &mut W, cells: &[Vec<String>], widths: &[usize]) -> Result<()>
where
    W: Write,
{
    let height = cells.iter().map(|lines| lines.len()).max().unwrap_or(1);
    for line_number in 0..height {
        let separator = if line_number == 0 { "|" } else { ":" };
        for (lines, width) in cells.iter().zip(widths) {
            write!(writer, "{separator}")?;
            let text = lines.get(line_number).map(String::as_str).unwrap_or("");
            let pad = width.saturating_sub(textwrap::core::display_width(text));
            let left = pad / 2;
            write!(writer, "{:left$}{text}{:right$}", "", "", right = pad - left)?;
        }
        writeln!(writer, "{separator}")?;
    }
    Ok(())
}

pub fn render_table<W, C, R, S>(writer: &mut W, columns: &[C], rows: &[R]) -> Result<()>
where
    W: Write,
    C: AsRef<str>,
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    if columns.is_empty() {
        bail!("A table needs at least one column.");
    }
    // Each column also takes one character of border.
    let max_cell_width = (termwidth().saturating_sub(1) / columns.len()).saturating_sub(1);
    if max_cell_width == 0 {
        bail!("Not enough space to render {} columns.", columns.len());
    }

    let header: Vec<Vec<String>> = columns
        .iter()
        .map(|column| wrap_cell(column.as_ref(), max_cell_width))
        .collect();
    let body: Vec<Vec<Vec<String>>> = rows
        .iter()
        .map(|row| {
            row.as_ref()
                .iter()
                .take(columns.len())
                .map(|cell| wrap_cell(cell.as_ref(), max_cell_width))
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|lines| widest_line(lines)).collect();
    for row in &body {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = max(*width, widest_line(cell));
        }
    }
    for width in widths.iter_mut() {
        *width = min(*width + CELL_PADDING, max_cell_width);
    }
    let table_width = 1 + widths.len() + widths.iter().sum::<usize>();

    setup_pager();
    writeln!(writer, "{:=<table_width$}", "")?;
    write_row(writer, &header, &widths)?;
    writeln!(writer, "{:=<table_width$}", "")?;
    for row in &body {
        write_row(writer, row, &widths)?;
    }
    let count = format!("{:02}", body.len());
    writeln!(
        writer,
        "{:=<width$}{count}",
        "",
        width = table_width.saturating_sub(count.len())
    )?;
    Ok(())
}

pub struct TableOutput<W> {
    writer: W,
}

impl<W> TableOutput<W>
where
    W: Write,
{
    fn render(&mut self, columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<OutputForTesting> {
        render_table(&mut self.writer, &columns, &rows)?;
        Ok(OutputForTesting::Table((columns, rows)))
    }
}

fn strings<const N: usize>(columns: [&str; N]) -> Vec<String> {
    columns.iter().map(|c| c.to_string()).collect()
}

impl<W> Output<W> for TableOutput<W>
where
    W: Write,
{
    fn new(writer: W) -> TableOutput<W> {
        TableOutput { writer }
    }

    fn render_transactions(&mut self, records: &[&Record]) -> Result<OutputForTesting> {
        let columns = strings(["#", "Date ↓", "Amount", "Category", "Description"]);
        let rows = records
            .iter()
            .enumerate()
            .map(|(position, r)| {
                vec![
                    position.to_output_format(),
                    r.date.to_output_format(),
                    r.amount.to_output_format(),
                    r.category.to_output_format(),
                    r.description.to_output_format(),
                ]
            })
            .collect();
        self.render(columns, rows)
    }

    fn render_months(&mut self, months: &[Month]) -> Result<OutputForTesting> {
        let columns = strings(["Month ↓"]);
        let rows = months.iter().map(|m| vec![m.to_output_format()]).collect();
        self.render(columns, rows)
    }

    fn render_summary(&mut self, summary: &MonthSummary) -> Result<OutputForTesting> {
        let columns = strings(["Month", "Income", "Expenses", "Balance"]);
        let rows = vec![vec![
            summary.month.to_output_format(),
            summary.income.to_output_format(),
            summary.expense.to_output_format(),
            summary.balance.to_output_format(),
        ]];
        self.render(columns, rows)
    }

    fn render_breakdown(
        &mut self,
        _month: Month,
        shares: &[CategoryShare],
    ) -> Result<OutputForTesting> {
        let columns = strings(["Category", "Expenses ↓", "%"]);
        let rows = shares
            .iter()
            .map(|s| {
                vec![
                    s.category.to_output_format(),
                    s.expense.to_output_format(),
                    s.pct.to_output_format(),
                ]
            })
            .collect();
        self.render(columns, rows)
    }
}

#[cfg(test)]
mod table_tests {
    use super::*;
    use std::io::Cursor;

    fn rendered_lines<C, R, S>(columns: &[C], rows: &[R]) -> Vec<String>
    where
        C: AsRef<str>,
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let mut cursor = Cursor::new(Vec::new());
        render_table(cursor.get_mut(), columns, rows).unwrap();
        let output = String::from_utf8(cursor.into_inner()).unwrap();
        output.split('\n').map(String::from).collect()
    }

    #[test]
    fn single_cell() {
        let lines = rendered_lines(&["Amount"], &[["12.50"]]);
        assert_eq!(lines[0], "============");
        assert_eq!(lines[1], "|  Amount  |");
        assert_eq!(lines[2], "============");
        assert_eq!(lines[3], "|  12.50   |");
        assert_eq!(lines[4], "==========01");
        assert_eq!(lines[5], "");
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn wrapped_cell_uses_continuation_separator() {
        let lines = rendered_lines(
            &["Description", "Amount"],
            &[["Weekly groceries at the corner shop", "-42.00"]],
        );
        assert_eq!(lines[0], "=".repeat(31));
        assert_eq!(lines[1], "|   Description    |  Amount  |");
        assert_eq!(lines[3], "| Weekly groceries |  -42.00  |");
        assert_eq!(lines[4], ":at the corner shop:          :");
        assert_eq!(lines[5], format!("{}01", "=".repeat(29)));
    }

    #[test]
    fn no_rows() {
        let rows: [[&str; 1]; 0] = [];
        let lines = rendered_lines(&["Month"], &rows);
        assert_eq!(lines.len(), 5);
        assert!(lines[3].ends_with("00"));
    }

    #[test]
    fn empty_cell() {
        let lines = rendered_lines(&["A", "B"], &[["", "x"]]);
        assert_eq!(lines[3], "|     |  x  |");
    }

    #[test]
    fn unicode_width() {
        let lines = rendered_lines(&["Date ↓"], &[["✅"]]);
        assert_eq!(lines[1], "|  Date ↓  |");
        assert_eq!(lines[3], "|    ✅    |");
    }

    #[test]
    fn too_many_columns() {
        let columns: Vec<String> = (0..21).map(|n| n.to_string()).collect();
        let rows: Vec<Vec<String>> = vec![];
        let mut cursor = Cursor::new(Vec::new());
        assert!(render_table(cursor.get_mut(), &columns, &rows).is_err());
    }

    #[test]
    fn breakdown_columns() {
        let mut output = TableOutput::new(Cursor::new(Vec::new()));
        let shares = vec![CategoryShare {
            category: "Food".to_string(),
            expense: 250.0,
            pct: 100.0,
        }];
        let month = Month::new(2024, 6).unwrap();
        match output.render_breakdown(month, &shares).unwrap() {
            OutputForTesting::Table((columns, rows)) => {
                assert_eq!(columns, vec!["Category", "Expenses ↓", "%"]);
                assert_eq!(rows, vec![vec!["Food", "250.00", "100.00"]]);
            }
            other => panic!("unexpected output {other:?}"),
        }
    }
}
