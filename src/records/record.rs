use crate::Probability;
use crate::gameplay::code::Code;
use crate::gameplay::game::Game;
use crate::gameplay::phase::Phase;
use std::collections::BTreeMap;

/// A seat's action at one ordinal of one phase, with its sizing context.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Entry {
    pub code: Code,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub btp: Option<Probability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub odds: Option<Probability>,
}

/// What one phase of a hand looked like from one seat: the first two
/// recorded actions and whether the seat faced aggression at any point.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Trace {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<Entry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second: Option<Entry>,
    #[serde(default)]
    pub aggro: bool,
}

/// One player's path through one hand, flattened for similarity queries.
/// This is the unit the action log stores and the opponent model mines.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Record {
    pub site: String,
    pub game: String,
    pub player: String,
    pub rivals: usize,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub traces: BTreeMap<Phase, Trace>,
    pub created: u64,
}

impl Record {
    /// Flatten every seat that acted in a settled hand, all under one
    /// fresh game id.
    pub fn harvest(game: &Game) -> Vec<Record> {
        let id = Self::identify();
        let created = Self::now();
        game.seats()
            .iter()
            .filter(|seat| !seat.lines().is_empty())
            .map(|seat| {
                let traces = Phase::betting()
                    .iter()
                    .filter_map(|phase| {
                        let line = seat.line(*phase);
                        match line.is_empty() {
                            true => None,
                            false => Some((
                                *phase,
                                Trace {
                                    first: line.first().map(Self::flatten),
                                    second: line.get(1).map(Self::flatten),
                                    aggro: line.iter().any(|p| p.aggro),
                                },
                            )),
                        }
                    })
                    .collect();
                Record {
                    site: game.site().to_string(),
                    game: id.clone(),
                    player: seat.name().to_string(),
                    rivals: game.entrants(),
                    traces,
                    created,
                }
            })
            .collect()
    }

    fn flatten(ply: &crate::gameplay::ply::Ply) -> Entry {
        Entry {
            code: ply.code,
            btp: ply.btp,
            odds: ply.odds,
        }
    }

    pub fn entry(&self, phase: Phase, ordinal: u8) -> Option<&Entry> {
        let trace = self.traces.get(&phase)?;
        match ordinal {
            1 => trace.first.as_ref(),
            2 => trace.second.as_ref(),
            _ => None,
        }
    }

    pub fn aggro(&self, phase: Phase) -> bool {
        self.traces.get(&phase).map(|t| t.aggro).unwrap_or(false)
    }

    fn identify() -> String {
        use rand::Rng;
        rand::rng()
            .sample_iter(rand::distr::Alphanumeric)
            .take(8)
            .map(char::from)
            .collect()
    }

    fn now() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gameplay::action::Action;
    use crate::gameplay::seat::Seat;

    fn played_out() -> Game {
        let seats = vec![
            Seat::new("ann".to_string(), 1000),
            Seat::new("bob".to_string(), 1000),
        ];
        let mut game = Game::host("site", 0, 10, 20, 0, seats).unwrap();
        game.advance().unwrap();
        game.act(Action::Raise(60)).unwrap();
        game.advance().unwrap();
        game.act(Action::Fold).unwrap();
        game.advance().unwrap();
        game
    }

    #[test]
    fn harvest_keeps_the_first_two_ordinals() {
        let records = Record::harvest(&played_out());
        assert!(records.len() == 2);
        let ann = records.iter().find(|r| r.player == "ann").unwrap();
        assert!(ann.entry(Phase::Preflop, 1).unwrap().code == Code::SmallBlind);
        assert!(ann.entry(Phase::Preflop, 2).unwrap().code == Code::Raise);
        assert!(ann.entry(Phase::Flop, 1).is_none());
        assert!(ann.rivals == 2);
    }

    #[test]
    fn harvest_marks_faced_aggression() {
        let records = Record::harvest(&played_out());
        let bob = records.iter().find(|r| r.player == "bob").unwrap();
        // the fold came against a raise
        assert!(bob.aggro(Phase::Preflop));
        assert!(bob.entry(Phase::Preflop, 2).unwrap().code == Code::Fold);
        assert!(bob.entry(Phase::Preflop, 2).unwrap().odds.is_some());
    }

    #[test]
    fn records_share_one_game_id() {
        let records = Record::harvest(&played_out());
        assert!(records[0].game == records[1].game);
        assert!(records[0].game.len() == 8);
        assert!(records[0].game.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
