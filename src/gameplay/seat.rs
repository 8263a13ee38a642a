use super::code::Code;
use super::phase::Phase;
use super::ply::Ply;
use crate::Chips;
use crate::Probability;
use crate::cards::hole::Hole;
use crate::records::stats::Stats;
use std::collections::BTreeMap;

/// Where a seat stands in the current hand.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Empty or sitting out.
    Out,
    /// Dealt in with chips behind.
    #[default]
    In,
    Fold,
    Allin,
}

impl Status {
    /// Live seats contest the pot at showdown.
    pub const fn is_live(&self) -> bool {
        matches!(self, Self::In | Self::Allin)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use colored::Colorize;
        match self {
            Self::Out => write!(f, " "),
            Self::In => write!(f, "P"),
            Self::Fold => write!(f, "{}", "F".red()),
            Self::Allin => write!(f, "{}", "A".yellow()),
        }
    }
}

/// One player's full situation within a hand: chips, cards, committed
/// actions, and the opponent model attached at state load. The stack stays
/// untouched while a round runs; contributions are carved out of it only
/// when the round's money is gathered into the pot.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Seat {
    name: String,
    stack: Chips,
    contrib: Chips,
    matched: Chips,
    status: Status,
    hole: Hole,
    lines: BTreeMap<Phase, Vec<Ply>>,
    stats: Stats,
    strength: Probability,
}

impl Seat {
    pub fn new(name: String, stack: Chips) -> Self {
        Self {
            name,
            stack,
            contrib: 0,
            matched: 0,
            status: Status::In,
            hole: Hole::Hidden,
            lines: BTreeMap::new(),
            stats: Stats::flat(),
            strength: 1.,
        }
    }
    pub fn sitting(mut self, status: Status) -> Self {
        self.status = status;
        self
    }
    pub fn dealt(mut self, hole: Hole) -> Self {
        self.hole = hole;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn stack(&self) -> Chips {
        self.stack
    }
    pub fn contrib(&self) -> Chips {
        self.contrib
    }
    pub fn matched(&self) -> Chips {
        self.matched
    }
    pub fn status(&self) -> Status {
        self.status
    }
    pub fn hole(&self) -> Hole {
        self.hole
    }
    pub fn stats(&self) -> &Stats {
        &self.stats
    }
    pub fn strength(&self) -> Probability {
        self.strength
    }
    /// Chips still available to put in this round.
    pub fn behind(&self) -> Chips {
        self.stack - self.contrib
    }
    pub fn line(&self, phase: Phase) -> &[Ply] {
        self.lines.get(&phase).map(Vec::as_slice).unwrap_or(&[])
    }
    pub fn lines(&self) -> &BTreeMap<Phase, Vec<Ply>> {
        &self.lines
    }
    /// The seat posted this blind during the preflop setup.
    pub fn posted(&self, blind: Code) -> bool {
        self.line(Phase::Preflop).iter().any(|p| p.code == blind)
    }

    /// The opponent model harvested for this player at state load.
    pub fn brief(&mut self, stats: Stats) {
        self.stats = stats;
    }
    /// An aggressive-or-calling action caps how weak this seat can be.
    pub fn narrow(&mut self, bound: Probability) {
        self.strength *= 1. - bound;
    }

    pub(crate) fn record(&mut self, phase: Phase, ply: Ply) {
        self.lines.entry(phase).or_default().push(ply);
    }
    pub(crate) fn commit(&mut self, amount: Chips) {
        self.contrib += amount;
    }
    /// Allin commits the whole stack, however short of the bet it falls.
    pub(crate) fn shove(&mut self) {
        self.contrib = self.stack;
        self.status = Status::Allin;
    }
    pub(crate) fn fold(&mut self) {
        self.status = Status::Fold;
        self.hole = Hole::Hidden;
    }
    /// Sweep this round's contribution out of the stack and into history.
    pub(crate) fn sweep(&mut self) {
        self.stack -= self.contrib;
        self.matched += self.contrib;
        self.contrib = 0;
    }
    pub(crate) fn refund(&mut self, amount: Chips) {
        self.contrib -= amount;
    }
    pub(crate) fn collect(&mut self, amount: Chips) {
        self.stack += amount;
    }
    /// Antes skip the contribution round and go straight to the pot.
    pub(crate) fn ante(&mut self, amount: Chips) -> Chips {
        let paid = amount.min(self.stack);
        self.stack -= paid;
        self.matched += paid;
        if self.stack == 0 {
            self.status = Status::Allin;
        }
        paid
    }
}

impl std::fmt::Display for Seat {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{:>10.10} {} {:>6} {:>5} {} ",
            self.name, self.status, self.stack, self.contrib, self.hole,
        )?;
        for phase in Phase::betting() {
            let line = self
                .line(*phase)
                .iter()
                .map(|p| p.to_string())
                .collect::<String>();
            write!(f, "{:<4}", line)?;
        }
        Ok(())
    }
}
