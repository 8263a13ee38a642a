use crate::Position;
use crate::Probability;
use crate::gameplay::code::Code;
use crate::gameplay::game::Game;
use crate::gameplay::phase::Phase;

/// The context a stats lookup is asked in: who is acting, where in the
/// hand they are, what they have shown so far, and what they are up
/// against. The ledger scores records by similarity to this.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub player: String,
    pub site: String,
    pub rivals: usize,
    /// The phase and ordinal the upcoming decision will land on.
    pub phase: Phase,
    pub ordinal: u8,
    /// Everything already on the seat's line, in (phase, ordinal) order.
    pub line: Vec<(Phase, u8, Code)>,
    pub facing: bool,
    pub odds: Option<Probability>,
}

impl Query {
    /// Frame the seat's next decision as a similarity query. The bucket
    /// is the slot its next action would be recorded in: a third act in
    /// one phase spills into the next phase's opener, and the river has
    /// nowhere further to spill.
    pub fn resembling(game: &Game, pos: Position) -> Self {
        let seat = game.seat(pos);
        let here = game.phase();
        let (phase, ordinal) = match seat.line(here).len() {
            0 => (here, 1),
            1 => (here, 2),
            _ => match here {
                Phase::River => (Phase::River, 1),
                p => (p.next(), 1),
            },
        };
        let line = Phase::betting()
            .iter()
            .take_while(|p| **p <= here)
            .flat_map(|p| {
                seat.line(*p)
                    .iter()
                    .take(2)
                    .enumerate()
                    .map(|(i, ply)| (*p, i as u8 + 1, ply.code))
            })
            .collect();
        let (facing, odds) = game.facing(pos);
        Self {
            player: seat.name().to_string(),
            site: game.site().to_string(),
            rivals: game.rivals(),
            phase,
            ordinal,
            line,
            facing,
            odds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gameplay::action::Action;
    use crate::gameplay::seat::Seat;

    fn three_way() -> Game {
        let seats = (0..3)
            .map(|i| Seat::new(format!("p{}", i), 1000))
            .collect();
        let mut game = Game::host("site", 0, 10, 20, 0, seats).unwrap();
        game.advance().unwrap();
        game
    }

    #[test]
    fn fresh_seat_buckets_on_the_opener() {
        let game = three_way();
        let query = Query::resembling(&game, 0);
        assert!(query.phase == Phase::Preflop);
        assert!(query.ordinal == 1);
        assert!(query.line.is_empty());
        assert!(!query.facing);
    }

    #[test]
    fn blind_post_counts_as_the_first_ordinal() {
        let game = three_way();
        let query = Query::resembling(&game, 2);
        assert!(query.ordinal == 2);
        assert!(query.line == vec![(Phase::Preflop, 1, Code::BigBlind)]);
    }

    #[test]
    fn facing_a_raise_prices_the_query() {
        let mut game = three_way();
        game.act(Action::Raise(60)).unwrap();
        game.advance().unwrap();
        let query = Query::resembling(&game, 1);
        assert!(query.facing);
        let odds = query.odds.unwrap();
        // 50 more to call into 90 on the table
        assert!((odds - 50. / 90.).abs() < 1e-6);
    }

    #[test]
    fn a_third_act_spills_into_the_next_phase() {
        let mut game = three_way();
        game.act(Action::Raise(60)).unwrap();
        game.advance().unwrap();
        game.act(Action::Call(50)).unwrap();
        game.advance().unwrap();
        // the small blind's line holds its post and its call
        let query = Query::resembling(&game, 1);
        assert!(query.phase == Phase::Flop);
        assert!(query.ordinal == 1);
        assert!(query.line == vec![
            (Phase::Preflop, 1, Code::SmallBlind),
            (Phase::Preflop, 2, Code::Call),
        ]);
    }
}
