use super::cache::Cache;
use crate::Position;
use crate::Probability;
use crate::cards::hole::Hole;
use crate::cards::rankings::Rankings;
use crate::cards::rollout::Rollout;
use crate::gameplay::game::Game;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::collections::BTreeMap;

/// Showdown equity for every live seat of a game.
///
/// Two-way pots walk the product of both seats' ranges and lean on the
/// duel cache; wider pots hand the whole table to a single rollout with
/// random cards for whoever is hidden. A seat with a shown pocket is a
/// singleton range; a hidden seat ranges over the ranking table cut to
/// its folding frequency, then keeps only its strength's share.
pub struct Judge {
    rankings: Rankings,
    cache: Cache,
    seed: u64,
}

impl Judge {
    pub fn new(rankings: Rankings) -> Self {
        Self::seeded(rankings, rand::random())
    }
    pub fn seeded(rankings: Rankings, seed: u64) -> Self {
        Self {
            rankings,
            cache: Cache::new(),
            seed,
        }
    }
    pub fn rankings(&self) -> &Rankings {
        &self.rankings
    }

    pub fn equities(
        &self,
        game: &Game,
    ) -> Result<BTreeMap<Position, Probability>, crate::Error> {
        let live = game.live_positions();
        match live.len() {
            0 | 1 => Err(crate::Error::TooFewPlayers),
            2 => self.duel(game, live[0], live[1]),
            _ => self.melee(game, &live),
        }
    }

    fn rng(&self, game: &Game) -> SmallRng {
        SmallRng::seed_from_u64(self.seed ^ u64::from(game.board().pile()))
    }

    fn melee(
        &self,
        game: &Game,
        live: &[Position],
    ) -> Result<BTreeMap<Position, Probability>, crate::Error> {
        let ref mut rng = self.rng(game);
        let pockets = live
            .iter()
            .map(|p| game.seat(*p).hole())
            .collect::<Vec<_>>();
        let equities =
            Rollout::new(game.board(), &pockets)?.equities(rng, crate::EQUITY_ROLLOUTS);
        Ok(live.iter().copied().zip(equities).collect())
    }

    fn duel(
        &self,
        game: &Game,
        a: Position,
        b: Position,
    ) -> Result<BTreeMap<Position, Probability>, crate::Error> {
        let ref mut rng = self.rng(game);
        let board = game.board();
        let table = u64::from(board.pile());
        let range_a = self.range(game, a);
        let range_b = self.range(game, b);
        let mut eq_a = Vec::new();
        let mut eq_b = Vec::new();
        for ha in &range_a {
            let bits_a = u64::from(ha.pile());
            if bits_a & table != 0 {
                continue;
            }
            for hb in &range_b {
                let bits_b = u64::from(hb.pile());
                if bits_b & (table | bits_a) != 0 {
                    continue;
                }
                let (ea, eb) = match self.cache.peek(table, bits_a, bits_b) {
                    Some(hit) => hit,
                    None => {
                        let pockets = [*ha, *hb];
                        let eq = Rollout::new(board, &pockets)?
                            .equities(rng, crate::EQUITY_ROLLOUTS);
                        let mut eq = eq.into_iter();
                        let pair = (eq.next().unwrap_or(0.5), eq.next().unwrap_or(0.5));
                        self.cache.keep(table, bits_a, bits_b, pair);
                        pair
                    }
                };
                eq_a.push(ea);
                eq_b.push(eb);
            }
        }
        if eq_a.is_empty() {
            return Err(crate::Error::cards("no disjoint matchup in either range"));
        }
        let ea = Self::expect(eq_a, game, a);
        let eb = Self::expect(eq_b, game, b);
        let sum = ea + eb;
        match sum > 0. {
            true => Ok(BTreeMap::from([(a, ea / sum), (b, eb / sum)])),
            false => Ok(BTreeMap::from([(a, 0.5), (b, 0.5)])),
        }
    }

    /// Average of the strongest `strength` share of a seat's matchup
    /// equities. A shown pocket keeps them all.
    fn expect(mut equities: Vec<Probability>, game: &Game, pos: Position) -> Probability {
        equities.sort_by(|x, y| x.partial_cmp(y).unwrap_or(std::cmp::Ordering::Equal));
        let start = match game.seat(pos).hole() {
            Hole::Hidden => {
                (equities.len() as f32 * (1. - game.seat(pos).strength())).floor() as usize
            }
            _ => 0,
        };
        let top = &equities[start.min(equities.len() - 1)..];
        top.iter().sum::<Probability>() / top.len() as Probability
    }

    fn range(&self, game: &Game, pos: Position) -> Vec<Hole> {
        match game.seat(pos).hole() {
            Hole::Hidden => self
                .rankings
                .cut(game.seat(pos).stats().fold())
                .iter()
                .map(|(hole, _)| *hole)
                .collect(),
            known => vec![known],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gameplay::code::Code;
    use crate::gameplay::phase::Phase;
    use crate::gameplay::table::SeatState;
    use crate::gameplay::table::Step;
    use crate::gameplay::table::TableState;
    use crate::records::stats::Stats;
    use std::sync::OnceLock;

    fn rankings() -> Rankings {
        static TINY: OnceLock<Rankings> = OnceLock::new();
        TINY.get_or_init(|| Rankings::grow(32, 9)).clone()
    }

    fn checked_to_the_river(hands: &[&str]) -> Game {
        let state = TableState {
            site: String::new(),
            button: 0,
            sb: 10,
            bb: 20,
            ante: 0,
            phase: Phase::River,
            board: ["2c", "7d", "9h", "Js", "Qs"]
                .iter()
                .map(|s| crate::cards::card::Card::try_from(*s).unwrap())
                .collect(),
            seats: hands
                .iter()
                .enumerate()
                .map(|(i, hand)| {
                    let mut seat = SeatState::new(&format!("p{}", i), 1000);
                    if !hand.is_empty() {
                        seat = seat.dealt(Hole::try_from(*hand).unwrap());
                    }
                    // heads up: button completes, both check every street
                    let opener = match i {
                        0 => Code::Call,
                        _ => Code::Check,
                    };
                    seat.acted(Phase::Preflop, Step::of(opener))
                        .acted(Phase::Flop, Step::of(Code::Check))
                        .acted(Phase::Turn, Step::of(Code::Check))
                })
                .collect(),
            hero: Some(0),
        };
        let mut game = Game::seated(&state).unwrap();
        game.replay(&state).unwrap();
        game
    }

    #[test]
    fn walkovers_are_too_small_to_judge() {
        let judge = Judge::seeded(rankings(), 1);
        let seats = vec![
            crate::gameplay::seat::Seat::new("a".to_string(), 100),
            crate::gameplay::seat::Seat::new("b".to_string(), 100),
        ];
        let mut game = Game::host("", 0, 10, 20, 0, seats).unwrap();
        game.advance().unwrap();
        game.act(crate::gameplay::action::Action::Fold).unwrap();
        game.advance().unwrap();
        assert!(matches!(
            judge.equities(&game),
            Err(crate::Error::TooFewPlayers)
        ));
    }

    #[test]
    fn shown_duel_on_a_full_board_is_exact() {
        let judge = Judge::seeded(rankings(), 1);
        let game = checked_to_the_river(&["AhAd", "3c4d"]);
        let equities = judge.equities(&game).unwrap();
        assert!((equities[&0] - 1.0).abs() < 1e-6);
        assert!(equities[&1] == 0.0);
    }

    #[test]
    fn hidden_range_duel_normalizes() {
        let judge = Judge::seeded(rankings(), 1);
        let mut game = checked_to_the_river(&["AhAd", ""]);
        // a tight profile keeps the walked product small
        game.brief(1, Stats::aggregate(&vec![Code::Fold; 60], &[]));
        let equities = judge.equities(&game).unwrap();
        let sum = equities[&0] + equities[&1];
        assert!((sum - 1.0).abs() < 1e-5);
        assert!(equities[&0] > 0.3);
    }

    #[test]
    fn multiway_rollout_covers_every_live_seat() {
        let judge = Judge::seeded(rankings(), 1);
        let seats = (0..4)
            .map(|i| crate::gameplay::seat::Seat::new(format!("p{}", i), 1000))
            .collect();
        let mut game = Game::host("", 0, 10, 20, 0, seats).unwrap();
        game.advance().unwrap();
        let equities = judge.equities(&game).unwrap();
        assert!(equities.len() == 4);
        let sum = equities.values().sum::<Probability>();
        assert!((sum - 1.0).abs() < 1e-3);
    }
}
