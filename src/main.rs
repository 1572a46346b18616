//! gamestat: query historical Steam player counts from the command line.
//!
//! # Commands
//!
//! - `popularity <title>`: monthly averages across the whole dataset
//! - `compare <title1> <title2> <start_year> <start_month> <end_year> <end_month>`
//! - `top <year> <month>`: the month's top games, most popular first

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use gamestat_service::config::load_config;
use gamestat_service::db::PgStore;
use gamestat_service::logging::{self, Component};
use gamestat_service::model::Record;
use gamestat_service::present::{table_rows, to_json};
use gamestat_service::service::StatsService;

/// Historical Steam player-count statistics
#[derive(Parser, Debug)]
#[command(name = "gamestat", version, long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./gamestat.toml if present)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Print JSON for an external renderer instead of plain text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Monthly average players for one game across the whole dataset
    Popularity { title: String },
    /// Monthly average players for two games over a range of months
    Compare {
        first: String,
        second: String,
        start_year: String,
        start_month: String,
        end_year: String,
        end_month: String,
    },
    /// Top games for a month by peak players
    Top { year: String, month: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    logging::init_logger(
        config.logging.level,
        config.logging.file.as_deref(),
        config.logging.console_timestamps,
    );

    let span = match config.dataset_span() {
        Ok(span) => span,
        Err(e) => {
            logging::error(Component::Config, None, &e.to_string());
            return ExitCode::FAILURE;
        }
    };

    let store = match config
        .database_url()
        .map_err(|e| e.to_string())
        .and_then(|url| PgStore::open(&url).map_err(|e| e.to_string()))
    {
        Ok(store) => store,
        Err(msg) => {
            logging::error(Component::Store, None, &msg);
            return ExitCode::FAILURE;
        }
    };
    let mut service = StatsService::new(store, span);

    let (first, last) = service.dataset_span();
    logging::debug(
        Component::System,
        None,
        &format!("dataset covers {} to {}", first.format("%Y-%m"), last.format("%Y-%m")),
    );

    let outcome = match &cli.command {
        Command::Popularity { title } => service
            .popularity_over_all_time(title)
            .map_err(|e| e.to_string())
            .and_then(|records| render_table(&records, cli.json)),
        Command::Compare { first, second, start_year, start_month, end_year, end_month } => service
            .compare_in_range(first, second, start_year, start_month, end_year, end_month)
            .map_err(|e| e.to_string())
            .and_then(|cmp| {
                if cli.json {
                    to_json(&cmp.chart).map_err(|e| e.to_string())
                } else {
                    let mut out = render_table(&cmp.first, false)?;
                    out.push('\n');
                    out.push_str(&render_table(&cmp.second, false)?);
                    Ok(out)
                }
            }),
        Command::Top { year, month } => service
            .monthly_top_games(year, month)
            .map_err(|e| e.to_string())
            .and_then(|titles| {
                if cli.json {
                    to_json(&titles).map_err(|e| e.to_string())
                } else {
                    Ok(titles
                        .iter()
                        .enumerate()
                        .map(|(i, t)| format!("{:>3}. {}", i + 1, t))
                        .collect::<Vec<_>>()
                        .join("\n"))
                }
            }),
    };

    match outcome {
        Ok(text) => {
            println!("{}", text);
            ExitCode::SUCCESS
        }
        Err(msg) => {
            eprintln!("{}", msg);
            ExitCode::FAILURE
        }
    }
}

fn render_table(records: &[Record], json: bool) -> Result<String, String> {
    let rows = table_rows(records);
    if json {
        return to_json(&rows).map_err(|e| e.to_string());
    }
    Ok(rows
        .iter()
        .map(|r| format!("{}\t{}\t{:.2}", r.title, r.month, r.stat))
        .collect::<Vec<_>>()
        .join("\n"))
}
