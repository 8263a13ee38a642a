use crate::Position;
use crate::Probability;
use crate::Utility;
use crate::gameplay::phase::Phase;

/// Per-node search state. The action that reached a spot lives on its
/// incoming edge; the spot itself remembers who chooses among its children
/// once it has been expanded, how likely the opponent model considers the
/// line, and what the walk-up has learned so far.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spot {
    /// Seat choosing among this spot's children. Unset until expansion;
    /// terminal spots never set it.
    seat: Option<Position>,
    /// Phase the incoming action was taken on.
    phase: Phase,
    /// Opponent-model probability of the incoming action's code, shared by
    /// sibling sizings of the same code.
    prior: Probability,
    /// Product of priors down from the root.
    cum: Probability,
    /// How many sizings split this spot's prior. One for unsized codes.
    divider: u32,
    traversals: usize,
    ev: Option<Utility>,
}

impl Spot {
    pub fn root(phase: Phase) -> Self {
        Self {
            seat: None,
            phase,
            prior: 1.,
            cum: 1.,
            divider: 1,
            traversals: 0,
            ev: None,
        }
    }
    pub fn child(phase: Phase, prior: Probability, cum: Probability, divider: u32) -> Self {
        Self {
            seat: None,
            phase,
            prior,
            cum,
            divider,
            traversals: 0,
            ev: None,
        }
    }

    pub fn seat(&self) -> Option<Position> {
        self.seat
    }
    pub fn phase(&self) -> Phase {
        self.phase
    }
    pub fn prior(&self) -> Probability {
        self.prior
    }
    pub fn cum(&self) -> Probability {
        self.cum
    }
    pub fn divider(&self) -> u32 {
        self.divider
    }
    pub fn traversals(&self) -> usize {
        self.traversals
    }
    pub fn ev(&self) -> Option<Utility> {
        self.ev
    }
    /// This spot's share of its parent's expectation.
    pub fn weight(&self) -> Probability {
        self.prior / self.divider as Probability
    }

    pub fn expand(&mut self, seat: Position) {
        self.seat = Some(seat);
    }
    pub fn evaluate(&mut self, ev: Utility) {
        self.ev = Some(ev);
        self.traversals = 1;
    }
    pub fn update(&mut self, ev: Utility, traversals: usize) {
        self.ev = Some(ev);
        self.traversals = traversals;
    }
}

impl std::fmt::Display for Spot {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} p={:.2} cum={:.3} n={} ev={}",
            self.phase,
            self.prior,
            self.cum,
            self.traversals,
            match self.ev {
                Some(ev) => format!("{:+.1}", ev),
                None => "?".to_string(),
            }
        )
    }
}
