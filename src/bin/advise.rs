//! Decision Advisor Binary
//!
//! Replays a scraped table state, profiles the opposition from a hand
//! log, and searches the hero's pending decision for the best line.

use clap::Parser;
use railbird::*;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Table state JSON, as pushed by a screen scraper
    #[arg(required = true)]
    table: std::path::PathBuf,
    /// Hand log built up by earlier sessions
    #[arg(short, long)]
    log: Option<std::path::PathBuf>,
    /// Pocket ranking table built by the rank binary
    #[arg(short, long)]
    rankings: Option<std::path::PathBuf>,
    /// Search budget in seconds
    #[arg(short, long, default_value_t = 5.0)]
    seconds: f32,
    /// Lines probed in parallel per search pass
    #[arg(short, long)]
    workers: Option<usize>,
    /// Freeze a content-addressed snapshot of the decision here
    #[arg(short, long)]
    freeze: Option<std::path::PathBuf>,
}

fn main() -> anyhow::Result<()> {
    log();
    let args = Args::parse();
    let rankings = match args.rankings {
        Some(ref path) => cards::rankings::Rankings::load(path)?,
        None => {
            log::warn!("{:<32}{}", "no ranking table", "growing a coarse one");
            cards::rankings::Rankings::grow(EQUITY_ROLLOUTS, rand::random())
        }
    };
    let ledger = match args.log {
        Some(ref path) => records::ledger::Ledger::load(path)?,
        None => records::ledger::Ledger::new(),
    };
    let state = std::fs::read_to_string(&args.table)?;
    let state = serde_json::from_str::<gameplay::table::TableState>(&state)?;
    let mut advisor = advisor::Advisor::new(rankings, Box::new(ledger))
        .workers(args.workers.unwrap_or_else(num_cpus::get));
    advisor.set_state(&state)?;
    if let Some(ref dir) = args.freeze {
        if let Some(snapshot) = advisor.snapshot() {
            std::fs::create_dir_all(dir)?;
            snapshot.save(&dir.join(format!("{}.json", snapshot.key())))?;
        }
    }
    let budget = std::time::Duration::from_secs_f32(args.seconds);
    println!("{}", advisor.run(budget)?);
    Ok(())
}
