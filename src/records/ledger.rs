use super::query::Query;
use super::record::Record;
use super::stats::Stats;
use crate::Probability;
use crate::gameplay::code::Code;

/// Where opponent history comes from. The advisor and the search only
/// ever ask for aggregated stats; a deployment backed by a real search
/// service implements this same trait.
pub trait Log: Send + Sync {
    /// Aggregate the most similar recorded decisions into a profile.
    /// `NoData` when nothing was ever recorded at the queried slot.
    fn stats(&self, query: &Query) -> Result<Stats, crate::Error>;
    /// Ingest a settled hand's records.
    fn absorb(&mut self, records: Vec<Record>);
}

/// The in-memory action log. Every record is scored against the query,
/// the best `QUERY_SAMPLE_SIZE` make the sample, and the sample is
/// aggregated into action frequencies and sizing percentiles.
#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Ledger {
    records: Vec<Record>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn len(&self) -> usize {
        self.records.len()
    }
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn save(&self, path: &std::path::Path) -> std::io::Result<()> {
        log::info!("{:<32}{}", "saving action log", path.display());
        let ref mut file = std::fs::File::create(path)?;
        serde_json::to_writer(file, self).map_err(std::io::Error::other)
    }

    pub fn load(path: &std::path::Path) -> std::io::Result<Self> {
        log::info!("{:<32}{}", "loading action log", path.display());
        let ref mut file = std::fs::File::open(path)?;
        serde_json::from_reader(file).map_err(std::io::Error::other)
    }

    /// Similarity of one record to the query. Additive boosts for player,
    /// site, matching line codes, and a matching heat of the moment; then
    /// damped by how far apart the table sizes and prices sit.
    fn score(record: &Record, query: &Query) -> f32 {
        let mut score = 0.;
        if record.player == query.player {
            score += crate::QUERY_PLAYER_BOOST;
        }
        if record.site == query.site {
            score += crate::QUERY_SITE_BOOST;
        }
        for (phase, ordinal, code) in &query.line {
            if record.entry(*phase, *ordinal).map(|e| e.code) == Some(*code) {
                score += crate::QUERY_LINE_BOOST;
            }
        }
        if query.facing && record.aggro(query.phase) {
            score += crate::QUERY_AGGRO_BOOST;
        }
        let gap = record.rivals.abs_diff(query.rivals) as f32;
        score *= crate::QUERY_RIVALS_DECAY.powf(gap * gap);
        let kept = record
            .entry(query.phase, query.ordinal)
            .and_then(|e| e.odds);
        if let (true, Some(asked), Some(kept)) = (query.facing, query.odds, kept) {
            let z = (kept - asked) / crate::QUERY_ODDS_SCALE;
            score *= crate::QUERY_ODDS_WEIGHT * crate::QUERY_ODDS_DECAY.powf(z * z);
        }
        score
    }
}

impl Log for Ledger {
    fn stats(&self, query: &Query) -> Result<Stats, crate::Error> {
        let mut sample = self
            .records
            .iter()
            .filter_map(|record| {
                let entry = record.entry(query.phase, query.ordinal)?;
                match entry.code.is_blind() {
                    true => None,
                    false => Some((Self::score(record, query), record.created, entry)),
                }
            })
            .collect::<Vec<_>>();
        if sample.is_empty() {
            return Err(crate::Error::NoData);
        }
        sample.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(b.1.cmp(&a.1))
        });
        sample.truncate(crate::QUERY_SAMPLE_SIZE);
        let codes = sample.iter().map(|(_, _, e)| e.code).collect::<Vec<Code>>();
        let sizes = sample
            .iter()
            .filter_map(|(_, _, e)| e.btp)
            .collect::<Vec<Probability>>();
        Ok(Stats::aggregate(&codes, &sizes))
    }

    fn absorb(&mut self, records: Vec<Record>) {
        self.records.extend(records);
    }
}
