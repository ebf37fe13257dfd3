use anyhow::{bail, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

use crate::aggregate::{CategoryShare, Month, MonthSummary};
use crate::output::{Output, OutputForTesting};
use crate::store::model::Record;

const FONT_SIZE: f64 = 25.0;
const TITLE_FONT_SIZE: f64 = FONT_SIZE * 1.5;
const WIDTH: u32 = 1600;
const HEIGHT: u32 = 1200;

fn chart_to_sixel<W>(writer: &mut W, chart: &charming::Chart) -> Result<()>
where
    W: Write,
{
    let mut renderer = charming::ImageRenderer::new(WIDTH, HEIGHT);
    let png = renderer.render_format(charming::ImageFormat::Png, chart)?;

    let mut child = process::Command::new("sh")
        .arg("-c")
        .arg("magick png:- sixel:-")
        .stdin(process::Stdio::piped())
        .stdout(process::Stdio::piped())
        .spawn()?;

    let Some(mut stdin) = child.stdin.take() else {
        child.kill()?;
        bail!("failed to take handle to child process stdin");
    };
    // Feed from another thread so a full stdout pipe can't deadlock us.
    let feeder = std::thread::spawn(move || stdin.write_all(&png));
    let output = child.wait_with_output()?;
    if feeder.join().is_err() {
        bail!("failed to send the chart to the sixel converter");
    }
    if !output.status.success() {
        bail!("converting the chart to sixel failed, is ImageMagick installed?");
    }
    Ok(writer.write_all(&output.stdout)?)
}

fn chart_to_svg(path: &Path, chart: &charming::Chart) -> Result<()> {
    let mut renderer = charming::ImageRenderer::new(WIDTH, HEIGHT);
    let svg = renderer.render(chart)?;
    fs::write(path, svg)?;
    Ok(())
}

fn default_chart() -> charming::Chart {
    charming::Chart::new().background_color("#ffffff")
}

fn default_title() -> charming::component::Title {
    charming::component::Title::new()
        .padding((20, 0))
        .text_style(charming::element::TextStyle::new().font_size(TITLE_FONT_SIZE))
        .text_align(charming::element::TextAlign::Center)
}

fn default_label() -> charming::element::Label {
    charming::element::Label::new().font_size(FONT_SIZE)
}

fn default_label_line() -> charming::element::LabelLine {
    charming::element::LabelLine::new().line_style(charming::element::LineStyle::new().width(3))
}

fn default_legend() -> charming::component::Legend {
    charming::component::Legend::new()
        .padding((20, 0))
        .text_style(charming::element::TextStyle::new().font_size(FONT_SIZE))
}

/// A donut with one slice per category, labelled with its share of the month's
/// expenses, and a legend listing the categories.
pub fn breakdown_to_chart(month: Month, shares: &[CategoryShare]) -> charming::Chart {
    let categories: Vec<String> = shares.iter().map(|s| s.category.clone()).collect();
    let data: Vec<(f64, String)> = shares
        .iter()
        .map(|s| (s.expense, s.category.clone()))
        .collect();
    default_chart()
        .title(
            default_title()
                .text(format!("Expenses by Category – {month}"))
                .left("50%")
                .top("2%"),
        )
        .legend(
            default_legend()
                .data(categories)
                .orient(charming::element::Orient::Vertical)
                .left("2%")
                .top("middle"),
        )
        .series(
            charming::series::Pie::new()
                .name("Categories")
                .radius(vec!["40%", "70%"])
                .center(vec!["55%", "55%"])
                .label(default_label().formatter("{b}\n{d}%"))
                .label_line(default_label_line())
                .data(data),
        )
}

pub struct ChartOutput<W> {
    writer: W,
    svg_path: Option<PathBuf>,
}

impl<W> ChartOutput<W>
where
    W: Write,
{
    /// Save charts as SVG files instead of writing sixel to the terminal.
    pub fn with_svg_path(mut self, path: Option<PathBuf>) -> Self {
        self.svg_path = path;
        self
    }
}

impl<W> Output<W> for ChartOutput<W>
where
    W: Write,
{
    fn new(writer: W) -> ChartOutput<W> {
        ChartOutput {
            writer,
            svg_path: None,
        }
    }

    fn render_breakdown(
        &mut self,
        month: Month,
        shares: &[CategoryShare],
    ) -> Result<OutputForTesting> {
        if shares.is_empty() {
            return Ok(OutputForTesting::Nothing);
        }
        let chart = breakdown_to_chart(month, shares);
        match &self.svg_path {
            Some(path) => chart_to_svg(path, &chart)?,
            None => chart_to_sixel(&mut self.writer, &chart)?,
        }
        Ok(OutputForTesting::Chart(chart.to_string()))
    }

    fn render_transactions(&mut self, _: &[&Record]) -> Result<OutputForTesting> {
        bail!("transactions can only be listed as a table")
    }

    fn render_months(&mut self, _: &[Month]) -> Result<OutputForTesting> {
        bail!("months can only be listed as a table")
    }

    fn render_summary(&mut self, _: &MonthSummary) -> Result<OutputForTesting> {
        bail!("summaries can only be shown as a table")
    }
}

#[cfg(test)]
mod chart_tests {
    use super::*;
    use std::io::Cursor;

    fn shares() -> Vec<CategoryShare> {
        vec![
            CategoryShare {
                category: "Food".to_string(),
                expense: 75.0,
                pct: 75.0,
            },
            CategoryShare {
                category: "Transport".to_string(),
                expense: 25.0,
                pct: 25.0,
            },
        ]
    }

    #[test]
    fn donut_series() {
        let month = Month::new(2024, 6).unwrap();
        let chart = breakdown_to_chart(month, &shares());
        let chart = serde_json::from_str::<serde_json::Value>(&chart.to_string()).unwrap();

        let series = chart.get("series").unwrap().as_array().unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0]["type"], "pie");
        assert_eq!(series[0]["radius"], serde_json::json!(["40%", "70%"]));

        let data = series[0]["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["value"], 75.0);
        assert_eq!(data[0]["name"], "Food");
        assert_eq!(series[0]["label"]["formatter"], "{b}\n{d}%");
    }

    #[test]
    fn legend_lists_categories() {
        let month = Month::new(2024, 6).unwrap();
        let chart = breakdown_to_chart(month, &shares());
        let chart = serde_json::from_str::<serde_json::Value>(&chart.to_string()).unwrap();

        let names: Vec<&str> = chart["legend"]["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Food", "Transport"]);
        assert_eq!(chart["legend"]["orient"], "vertical");
    }

    #[test]
    fn title_names_the_month() {
        let month = Month::new(2024, 6).unwrap();
        let chart = breakdown_to_chart(month, &shares());
        let chart = serde_json::from_str::<serde_json::Value>(&chart.to_string()).unwrap();
        let title = &chart.get("title").unwrap().as_array().unwrap()[0];
        assert_eq!(title["text"], "Expenses by Category – 2024-06");
    }

    #[test]
    fn no_chart_without_expenses() {
        let mut output = ChartOutput::new(Cursor::new(Vec::new()));
        let month = Month::new(2024, 6).unwrap();
        assert!(matches!(
            output.render_breakdown(month, &[]).unwrap(),
            OutputForTesting::Nothing
        ));
    }

    #[test]
    fn tables_are_not_charted() {
        let mut output = ChartOutput::new(Cursor::new(Vec::new()));
        assert!(output.render_months(&[]).is_err());
        assert!(output.render_transactions(&[]).is_err());
    }
}
