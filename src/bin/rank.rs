//! Ranking Table Binary
//!
//! Rolls every starting pocket out against a random field and writes
//! the resulting strength ordering for the advisor to load at startup.

use clap::Parser;
use railbird::*;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Where to write the table
    #[arg(short, long, default_value = "rankings.prt")]
    out: std::path::PathBuf,
    /// Monte Carlo rollouts per pocket
    #[arg(short, long, default_value_t = RANKING_ROLLOUTS)]
    iterations: usize,
    /// Rollout seed, for reproducible tables
    #[arg(short, long, default_value_t = 0)]
    seed: u64,
}

fn main() -> anyhow::Result<()> {
    log();
    let args = Args::parse();
    let rankings = cards::rankings::Rankings::grow(args.iterations, args.seed);
    rankings.save(&args.out)?;
    Ok(())
}
