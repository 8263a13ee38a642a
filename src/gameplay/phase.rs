#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Preflop = 0,
    Flop = 1,
    Turn = 2,
    River = 3,
    Showdown = 4,
    Gg = 5,
}

impl Phase {
    /// The four phases where chips go in.
    pub const fn betting() -> &'static [Self] {
        &[Self::Preflop, Self::Flop, Self::Turn, Self::River]
    }
    pub const fn next(&self) -> Self {
        match self {
            Self::Preflop => Self::Flop,
            Self::Flop => Self::Turn,
            Self::Turn => Self::River,
            Self::River => Self::Showdown,
            Self::Showdown => Self::Gg,
            Self::Gg => panic!("terminal"),
        }
    }
    pub const fn is_betting(&self) -> bool {
        matches!(self, Self::Preflop | Self::Flop | Self::Turn | Self::River)
    }
    /// Community cards on the table during this phase.
    pub const fn n_observed(&self) -> usize {
        match self {
            Self::Preflop => 0,
            Self::Flop => 3,
            Self::Turn => 4,
            Self::River | Self::Showdown | Self::Gg => 5,
        }
    }
    /// Betting rounds from here to showdown, this one included.
    /// Scales how deep a hand can still run.
    pub const fn rounds_left(&self) -> usize {
        match self {
            Self::Preflop => 4,
            Self::Flop => 3,
            Self::Turn => 2,
            Self::River => 1,
            Self::Showdown | Self::Gg => 0,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Preflop => write!(f, "preflop"),
            Self::Flop => write!(f, "flop"),
            Self::Turn => write!(f, "turn"),
            Self::River => write!(f, "river"),
            Self::Showdown => write!(f, "showdown"),
            Self::Gg => write!(f, "gg"),
        }
    }
}

impl crate::Arbitrary for Phase {
    fn random() -> Self {
        use rand::Rng;
        match rand::rng().random_range(0..4) {
            0 => Self::Preflop,
            1 => Self::Flop,
            2 => Self::Turn,
            _ => Self::River,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn betting_phases_step_toward_showdown() {
        assert!(Phase::Preflop.next() == Phase::Flop);
        assert!(Phase::River.next() == Phase::Showdown);
        assert!(Phase::betting().iter().all(|p| p.is_betting()));
        assert!(!Phase::Showdown.is_betting());
    }

    #[test]
    fn rounds_left_counts_down() {
        assert!(Phase::Preflop.rounds_left() == 4);
        assert!(Phase::River.rounds_left() == 1);
        assert!(Phase::Gg.rounds_left() == 0);
    }

    #[test]
    fn serde_lowercase_names() {
        assert!(serde_json::to_string(&Phase::Preflop).unwrap() == "\"preflop\"");
        assert!(Phase::Turn == serde_json::from_str("\"turn\"").unwrap());
    }
}
