mod aggregate;
mod data_loader;
mod report;
mod report_context;
mod util;

use clap::Parser;
use log::{error, info};
use std::path::PathBuf;

use data_loader::*;
use report::*;
use report_context::*;

/*
    Loads the match table, then prints the report sections in order. The text goes to stdout,
    and with --json the same sections are written out for an external renderer.
    A table that can't be loaded prints a single error line and exits non-zero.
*/

#[derive(Parser, Debug)]
#[command(name = "intl_match_report")]
#[command(about = "Goal, tournament and date summaries for international football matches", long_about = None)]
struct Args {
    /// CSV file with the match table
    #[arg(short, long, default_value = "international_matches.csv")]
    data: PathBuf,

    /// Teams listed in the top scorers section
    #[arg(long, default_value_t = 5)]
    top: usize,

    /// Tournaments listed in the frequency section
    #[arg(long, default_value_t = 5)]
    top_tournaments: usize,

    /// Teams shown in the goals chart
    #[arg(long, default_value_t = 10)]
    chart_top: usize,

    /// Also write all report sections as JSON to this path
    #[arg(long)]
    json: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn report_context(&self) -> ReportContext {
        let mut ctx = ReportContext::default().with_source(self.data.clone());
        ctx.top_teams = self.top;
        ctx.top_tournaments = self.top_tournaments;
        ctx.chart_teams = self.chart_top;
        ctx.json_path = self.json.clone();
        ctx
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .init();

    let ctx = args.report_context();

    let (records, summary) = match load_data(&ctx.source_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("Failed to load {}: {e}", ctx.source_path.display());
            print!("{}", render_text(&load_failure_sections(&e), &ctx));
            return Err(e.into());
        }
    };

    let sections = build_report(&records, &summary, &ctx);
    print!("{}", render_text(&sections, &ctx));

    if let Some(path) = &ctx.json_path {
        write_json(&sections, path)?;
        info!("Wrote report sections to {}", path.display());
    }

    Ok(())
}
