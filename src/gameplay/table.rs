use super::code::Code;
use super::phase::Phase;
use super::seat::Status;
use crate::Chips;
use crate::Position;
use crate::cards::card::Card;
use crate::cards::hole::Hole;
use std::collections::BTreeMap;

/// One observed voluntary action. Blinds and antes are never listed; the
/// engine posts them from the table configuration. Bets and raises carry
/// the amount added to the seat's contribution; other codes need none.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Step {
    pub code: Code,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Chips>,
}

impl Step {
    pub fn of(code: Code) -> Self {
        Self { code, amount: None }
    }
    pub fn sized(code: Code, amount: Chips) -> Self {
        Self {
            code,
            amount: Some(amount),
        }
    }
}

/// A seat as the driver sees it. Balance is the seat's current stack,
/// already net of chips swept into the pot by earlier rounds. Folded and
/// allin statuses are derived from the action lists during replay; the
/// declared status only needs to be accurate for seats sitting out.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SeatState {
    pub name: String,
    pub balance: Chips,
    #[serde(default)]
    pub status: Status,
    #[serde(default, skip_serializing_if = "Hole::is_hidden")]
    pub hand: Hole,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub actions: BTreeMap<Phase, Vec<Step>>,
}

impl SeatState {
    pub fn new(name: &str, balance: Chips) -> Self {
        Self {
            name: name.to_string(),
            balance,
            status: Status::In,
            hand: Hole::Hidden,
            actions: BTreeMap::new(),
        }
    }
    pub fn dealt(mut self, hand: Hole) -> Self {
        self.hand = hand;
        self
    }
    pub fn sitting(mut self, status: Status) -> Self {
        self.status = status;
        self
    }
    pub fn acted(mut self, phase: Phase, step: Step) -> Self {
        self.actions.entry(phase).or_default().push(step);
        self
    }
    pub fn steps(&self, phase: Phase) -> &[Step] {
        self.actions.get(&phase).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// The driver-facing snapshot of a table. Replaying its action lists
/// through a fresh engine reproduces contributions, pot and statuses,
/// so none of those are part of the schema.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TableState {
    #[serde(default)]
    pub site: String,
    pub button: Position,
    pub sb: Chips,
    pub bb: Chips,
    #[serde(default)]
    pub ante: Chips,
    pub phase: Phase,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub board: Vec<Card>,
    pub seats: Vec<SeatState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero: Option<Position>,
}

impl TableState {
    /// The seat to advise for. Explicit when given, otherwise the single
    /// seat showing its hand.
    pub fn hero(&self) -> Option<Position> {
        self.hero.or_else(|| {
            let mut shown = self
                .seats
                .iter()
                .enumerate()
                .filter(|(_, s)| !s.hand.is_hidden())
                .map(|(i, _)| i);
            match (shown.next(), shown.next()) {
                (Some(seat), None) => Some(seat),
                _ => None,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_with_defaults() {
        let json = r#"{
            "button": 0,
            "sb": 10,
            "bb": 20,
            "phase": "preflop",
            "seats": [
                {"name": "alice", "balance": 1000, "hand": "AsKd"},
                {"name": "bob",   "balance":  800}
            ]
        }"#;
        let state = serde_json::from_str::<TableState>(json).unwrap();
        assert!(state.ante == 0);
        assert!(state.board.is_empty());
        assert!(state.seats[1].status == Status::In);
        assert!(state.seats[1].hand == Hole::Hidden);
        assert!(state.hero() == Some(0));
    }

    #[test]
    fn replays_actions_in_phase_order() {
        let json = r#"{
            "name": "carol",
            "balance": 500,
            "actions": {
                "flop": [{"code": "k"}],
                "preflop": [{"code": "r", "amount": 60}, {"code": "c"}]
            }
        }"#;
        let seat = serde_json::from_str::<SeatState>(json).unwrap();
        assert!(seat.steps(Phase::Preflop).len() == 2);
        assert!(seat.steps(Phase::Preflop)[0].amount == Some(60));
        assert!(seat.steps(Phase::Flop) == &[Step::of(Code::Check)][..]);
        assert!(seat.steps(Phase::Turn).is_empty());
    }

    #[test]
    fn hero_requires_a_single_shown_hand() {
        let mut state = TableState {
            site: String::new(),
            button: 0,
            sb: 10,
            bb: 20,
            ante: 0,
            phase: Phase::Preflop,
            board: vec![],
            seats: vec![
                SeatState::new("a", 100),
                SeatState::new("b", 100),
            ],
            hero: None,
        };
        assert!(state.hero().is_none());
        state.seats[0].hand = Hole::try_from("AsKd").unwrap();
        assert!(state.hero() == Some(0));
        state.hero = Some(1);
        assert!(state.hero() == Some(1));
    }
}
