use crate::aggregate::Month;
use crate::config::{Config, CorruptStatePolicy};
use crate::errors::TrackerError;
use crate::output::OutputForTesting;
use crate::store::model::{DATE_FORMAT, SUGGESTED_CATEGORIES};
use anyhow::{anyhow, Result};
use chrono::Datelike;
use clap::{Parser, Subcommand};
use regex::Regex;
use std::env;
use std::ffi::OsStr;
use std::io;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;
use tracing::debug;
use tracing_subscriber::filter::LevelFilter;

mod aggregate;
mod commands;
mod config;
mod errors;
mod fallible_print;
mod logging;
mod output;
mod store;

const TIP: &str = "💡";
const OK: &str = "✅";
const ERR: &str = "❗";
const WARN: &str = "⚠️ ";

/// Track income and expenses, and see where each month's money went.
#[derive(Debug, Parser)]
#[command(infer_subcommands = true)]
struct Thrifty {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Where transactions are stored.
    #[arg(long, global = true, env = "THRIFTY_DATA_FILE")]
    data_file: Option<PathBuf>,

    /// What to do if the data file can't be read.
    #[arg(long, global = true, env = "THRIFTY_ON_CORRUPT", value_enum, default_value_t)]
    on_corrupt: CorruptStatePolicy,

    /// Logging verbosity: off, error, warn, info, debug or trace. RUST_LOG takes precedence.
    #[arg(long, global = true, default_value_t = LevelFilter::WARN)]
    log_level: LevelFilter,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Record a transaction. Use a negative amount for expenses.
    Add {
        /// The amount, e.g. '-50' for an expense or '100' for income.
        #[arg(short, long, allow_negative_numbers = true)]
        amount: String,

        /// The date as YYYY-MM-DD. Defaults to today.
        #[arg(short, long)]
        date: Option<String>,

        /// Any text works; see 'categories' for the usual ones.
        #[arg(short, long, default_value = "Food")]
        category: String,

        #[arg(short = 'm', long, default_value = "")]
        description: String,
    },

    /// List transactions, newest first, numbered for 'delete'.
    List,

    /// Delete a transaction by its number in 'list'.
    Delete {
        position: usize,

        /// Don't ask for confirmation.
        #[arg(short, long)]
        yes: bool,
    },

    /// List the months that have transactions.
    Months,

    /// Income, expenses and balance for a month, with expenses by category.
    Summary {
        /// Examples: '2024-06', '2024/06', '06', 'june'. Defaults to the latest month.
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Donut chart of a month's expenses by category.
    Chart {
        /// Examples: '2024-06', '2024/06', '06', 'june'. Defaults to the latest month.
        #[arg(short, long)]
        month: Option<String>,

        /// Save the chart as an SVG file instead of drawing it in the terminal.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the suggested categories.
    Categories,

    /// Show where data is kept and which build this is.
    Info,
}

fn main() -> ExitCode {
    match thrifty_main() {
        Err(e) => {
            if let Some(io_error) = e.downcast_ref::<io::Error>() {
                if io_error.kind() == io::ErrorKind::BrokenPipe {
                    return ExitCode::SUCCESS;
                }
            } else if let Some(clap_error) = e.downcast_ref::<clap::error::Error>() {
                clap_error.exit();
            }
            let _ = eprintln!("{ERR} Error: {e:#}");
            if let Some(TrackerError::PersistedStateCorrupt { .. }) =
                e.downcast_ref::<TrackerError>()
            {
                let _ = eprintln!(
                    "{TIP} Pass '--on-corrupt start-empty' to move the file aside and start over."
                );
            }
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn thrifty_main() -> Result<()> {
    let cli = Thrifty::try_parse()?;
    logging::init_logger(cli.log_level);
    debug!(?cli, "parsed command line");

    // https://stackoverflow.com/a/36848555
    let binary_name = env::args()
        .next()
        .as_ref()
        .map(Path::new)
        .and_then(Path::file_name)
        .and_then(OsStr::to_str)
        .map(String::from)
        .unwrap_or(String::from("thrifty"));

    let config = Config::new(cli.data_file, cli.on_corrupt)?;
    let mut store = store::open_store(config.data_file, config.on_corrupt)?;

    let needs_transactions = !matches!(
        &cli.command,
        Some(Commands::Add { .. }) | Some(Commands::Categories) | Some(Commands::Info)
    );
    if store.is_empty() && needs_transactions {
        println!("No transactions yet!")?;
        return println!("{TIP} Run '{binary_name} help add' to learn how to record one.");
    }

    match cli.command {
        // On empty invocation, show the latest month.
        None => show_summary(&store, None),
        Some(Commands::Add {
            amount,
            date,
            category,
            description,
        }) => {
            let date = date.unwrap_or_else(|| now().format(DATE_FORMAT).to_string());
            match commands::transactions::command_add(
                &mut store,
                &date,
                &amount,
                &category,
                &description,
            ) {
                Ok(record) => println!(
                    "{OK} Added {}.",
                    commands::transactions::describe(&record)
                ),
                Err(TrackerError::Validation(reason)) => {
                    println!("{ERR} Invalid input: {reason}")?;
                    println!("{TIP} Check date (YYYY-MM-DD) and amount (e.g. -50 or 100) format.")
                }
                Err(e) => Err(e.into()),
            }
        }
        Some(Commands::List) => {
            commands::transactions::command_list(&store, &mut io::stdout())?;
            Ok(())
        }
        Some(Commands::Delete { position, yes }) => {
            let Some(record) = commands::transactions::record_at(&store, position) else {
                println!("{ERR} There is no transaction #{position}.")?;
                return println!("{TIP} Use '{binary_name} list' to see transaction numbers.");
            };
            let prompt = format!(
                "{WARN} Delete {}?",
                commands::transactions::describe(record)
            );
            if yes || confirm(&prompt)? {
                let deleted = commands::transactions::command_delete(&mut store, position)?;
                println!(
                    "{OK} Deleted {}.",
                    commands::transactions::describe(&deleted)
                )
            } else {
                println!("Canceled.")
            }
        }
        Some(Commands::Months) => {
            commands::report::command_months(&store, &mut io::stdout())?;
            Ok(())
        }
        Some(Commands::Summary { month }) => {
            let month = parse_month_arg(month.as_deref())?;
            show_summary(&store, month)
        }
        Some(Commands::Chart { month, output }) => {
            let month = parse_month_arg(month.as_deref())?;
            let saved_to = output.clone();
            match commands::report::command_chart(&store, &mut io::stdout(), month, output)? {
                OutputForTesting::Nothing => {
                    println!("No expenses to chart for this month.")
                }
                _ => match saved_to {
                    Some(path) => println!("{OK} Chart saved to {}.", path.display()),
                    None => Ok(()),
                },
            }
        }
        Some(Commands::Categories) => {
            for category in SUGGESTED_CATEGORIES {
                println!("{category}")?;
            }
            println!("{TIP} These are suggestions, any category name can be used.")
        }
        Some(Commands::Info) => {
            let info = commands::info::command_info(&store);
            println!("Data file:    {}", info.data_file)?;
            println!("Transactions: {}", info.transactions)?;
            println!("Build:        {}", info.git_sha)
        }
    }
}

fn show_summary(store: &store::TransactionStore, month: Option<Month>) -> Result<()> {
    let rendered = commands::report::command_summary(store, &mut io::stdout(), month)?;
    if rendered.len() == 1 {
        println!("No expenses this month.")?;
    }
    Ok(())
}

fn parse_month_arg(month: Option<&str>) -> Result<Option<Month>> {
    month.map(parse_month).transpose()
}

#[cfg(not(test))]
fn now() -> chrono::DateTime<chrono::Local> {
    chrono::Local::now()
}

#[cfg(test)]
fn now() -> chrono::DateTime<chrono::Local> {
    return chrono::NaiveDate::from_ymd_opt(2024, 07, 15)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_local_timezone(chrono::Local)
        .unwrap();
}

/// Accepts `YYYY-MM`, `YYYY/MM`, a bare `MM` or a month name; the last two
/// mean that month of the current year.
fn parse_month(month: &str) -> Result<Month> {
    if let Ok(exact) = month.trim().parse::<Month>() {
        return Ok(exact);
    }
    let month_re = Regex::new(r"^((?P<year>\d{4})[-/])?(?P<month>(\d{1,2}|[A-Za-z]+))$")?;
    let capture = month_re
        .captures(month.trim())
        .ok_or(anyhow!("invalid month '{month}': try YYYY-MM."))?;

    let year = match capture.name("year") {
        Some(ys) => ys
            .as_str()
            .parse::<i32>()
            .map_err(|_| anyhow!("invalid year '{}'", ys.as_str()))?,
        None => now().year(),
    };
    let month_number = capture["month"].parse::<u32>().or_else(|_| {
        chrono::Month::from_str(&capture["month"])
            .map(|m| m.number_from_month())
            .map_err(|_| anyhow!("invalid month '{}'", &capture["month"]))
    })?;
    Month::new(year, month_number)
        .ok_or_else(|| anyhow!("month {month_number} is not in range 1-12!"))
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} Proceed? [y/N] ")?;
    io::stdout().flush()?;
    let mut yn = [0; 1];
    io::stdin().read(&mut yn)?;
    let yn = yn[0] as char;
    Ok(yn == 'y' || yn == 'Y')
}
