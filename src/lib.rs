//! Core type aliases, traits, and constants for railbird.
//!
//! Railbird is a real-time No-Limit Texas Hold-Em decision assistant. It
//! rebuilds a table state from scraped inputs, models the opponents from a
//! log of previously harvested hands, and searches the action tree for the
//! highest expected-value line available to the hero.

pub mod advisor;
pub mod cards;
pub mod equity;
pub mod error;
pub mod gameplay;
pub mod records;
pub mod search;

pub use error::Error;

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Stack sizes, bets, and pot amounts in chips.
pub type Chips = i32;
/// Seat index around the table.
pub type Position = usize;
/// Expected values and payoffs, signed, in chips.
pub type Utility = f32;
/// Action frequencies, equities, and reach probabilities.
pub type Probability = f32;

// ============================================================================
// TRAITS
// ============================================================================
/// Random instance generation for testing and Monte Carlo sampling.
pub trait Arbitrary {
    /// Generate a uniformly random instance.
    fn random() -> Self;
}

// ============================================================================
// TABLE PARAMETERS
// ============================================================================
/// Maximum seats at a table.
pub const MAX_SEATS: usize = 10;
/// Number of distinct two-card pockets, C(52, 2).
pub const N_POCKETS: usize = 1326;

// ============================================================================
// EQUITY ESTIMATION
// ============================================================================
/// Monte Carlo rollouts per pocket matchup at decision time.
pub const EQUITY_ROLLOUTS: usize = 128;
/// Monte Carlo rollouts per pocket when building the ranking table.
pub const RANKING_ROLLOUTS: usize = 10_000;
/// Cached showdown evaluations, keyed by board and pockets.
pub const EQUITY_CACHE_SIZE: usize = 0x40000;

// ============================================================================
// SIMILARITY QUERY
// Weights for scoring harvested hands against the live table context.
// ============================================================================
/// Hands retained per query, strongest matches first.
pub const QUERY_SAMPLE_SIZE: usize = 128;
/// Score contribution when the hand belongs to the same player.
pub const QUERY_PLAYER_BOOST: Probability = 5.0;
/// Score contribution when the hand comes from the same site.
pub const QUERY_SITE_BOOST: Probability = 1.0;
/// Score contribution per matching action in the betting line so far.
pub const QUERY_LINE_BOOST: Probability = 3.0;
/// Score contribution when the hand faced aggression in the same phase.
pub const QUERY_AGGRO_BOOST: Probability = 2.0;
/// Multiplier at zero distance for the pot-odds proximity curve.
pub const QUERY_ODDS_WEIGHT: Probability = 5.0;
/// Gaussian decay reached at one rival of distance from the live count.
pub const QUERY_RIVALS_DECAY: Probability = 0.4;
/// Gaussian decay reached at `QUERY_ODDS_SCALE` of pot-odds distance.
pub const QUERY_ODDS_DECAY: Probability = 0.9;
/// Pot-odds distance at which the decay multiplier applies.
pub const QUERY_ODDS_SCALE: Probability = 0.1;

// ============================================================================
// OPPONENT MODEL
// ============================================================================
/// Floor on any observed action frequency.
pub const STATS_FLOOR: Probability = 0.01;
/// Additive smoothing mass pulling small samples toward the flat prior.
pub const STATS_SMOOTHING: Probability = 3.0;
/// Percentiles reported for bet-to-pot sizings.
pub const STATS_PERCENTILES: [u8; 5] = [10, 30, 50, 70, 90];

// ============================================================================
// SEARCH
// ============================================================================
/// Recent best-action window used to report convergence confidence.
pub const CONFIDENCE_WINDOW: usize = 11;

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
pub fn log() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}
