use super::board::Board;
use super::card::Card;
use super::hole::Hole;
use super::pile::Pile;
use crate::Probability;
use rand::Rng;
use rand::rngs::SmallRng;
use rs_poker::core::Rankable;

/// A Monte Carlo showdown between a fixed set of pockets on a fixed board.
/// Every iteration fills the board out to five cards and deals two fresh
/// cards to each hidden pocket, then ranks all seven-card hands and splits
/// a unit pot among the winners. Equities therefore include the tie share.
pub struct Rollout<'a> {
    board: &'a Board,
    pockets: &'a [Hole],
    known: Pile,
}

impl<'a> Rollout<'a> {
    pub fn new(board: &'a Board, pockets: &'a [Hole]) -> Result<Self, crate::Error> {
        let mut known = Pile::empty();
        for card in board.cards().iter().copied() {
            known.admit(card)?;
        }
        for hole in pockets.iter().flat_map(Hole::cards) {
            known.admit(hole.0)?;
            known.admit(hole.1)?;
        }
        Ok(Self {
            board,
            pockets,
            known,
        })
    }

    /// Per-pocket share of the pot, averaged over `iterations` deals.
    /// Collapses to a single deterministic pass when nothing is hidden.
    pub fn equities(&self, rng: &mut SmallRng, iterations: usize) -> Vec<Probability> {
        let iterations = match self.unknowns() {
            0 => 1,
            _ => iterations.max(1),
        };
        let mut shares = vec![0f32; self.pockets.len()];
        for _ in 0..iterations {
            let mut taken = self.known;
            let board = self.deal_board(rng, &mut taken);
            let ranks = self
                .pockets
                .iter()
                .map(|hole| self.deal_pocket(rng, &mut taken, hole))
                .map(|(a, b)| Self::rank(&board, a, b))
                .collect::<Vec<_>>();
            let best = ranks.iter().max().copied();
            let winners = ranks.iter().filter(|r| Some(**r) == best).count();
            for (share, rank) in shares.iter_mut().zip(ranks.iter()) {
                if Some(*rank) == best {
                    *share += 1. / winners as f32;
                }
            }
        }
        shares.iter().map(|s| s / iterations as f32).collect()
    }

    fn unknowns(&self) -> usize {
        let hidden = self.pockets.iter().filter(|h| h.cards().is_none()).count();
        5 - self.board.size() + hidden * 2
    }

    fn deal_board(&self, rng: &mut SmallRng, taken: &mut Pile) -> Vec<Card> {
        let mut board = self.board.cards().to_vec();
        while board.len() < 5 {
            board.push(Self::draw(rng, taken));
        }
        board
    }

    fn deal_pocket(&self, rng: &mut SmallRng, taken: &mut Pile, hole: &Hole) -> (Card, Card) {
        match hole.cards() {
            Some(cards) => cards,
            None => (Self::draw(rng, taken), Self::draw(rng, taken)),
        }
    }

    fn draw(rng: &mut SmallRng, taken: &mut Pile) -> Card {
        loop {
            let card = Card::from(rng.random_range(0..52) as u8);
            if !taken.holds(card) {
                *taken = taken.with(card);
                return card;
            }
        }
    }

    fn rank(board: &[Card], a: Card, b: Card) -> rs_poker::core::Rank {
        let mut hand = rs_poker::core::Hand::default();
        for card in board.iter().copied() {
            hand.insert(card.into());
        }
        hand.insert(a.into());
        hand.insert(b.into());
        hand.rank()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn board(s: &[&str]) -> Board {
        Board::try_from(
            s.iter()
                .map(|c| Card::try_from(*c).unwrap())
                .collect::<Vec<_>>(),
        )
        .unwrap()
    }

    #[test]
    fn rejects_colliding_pockets() {
        let board = board(&["As", "Kd", "7h"]);
        let pockets = vec![Hole::try_from("AsQc").unwrap(), Hole::Hidden];
        assert!(Rollout::new(&board, &pockets).is_err());
    }

    #[test]
    fn full_board_is_deterministic() {
        let ref mut rng = SmallRng::seed_from_u64(0);
        let board = board(&["As", "Kd", "7h", "7c", "2d"]);
        let pockets = vec![
            Hole::try_from("AhAc").unwrap(),
            Hole::try_from("3s3d").unwrap(),
        ];
        let rollout = Rollout::new(&board, &pockets).unwrap();
        let equities = rollout.equities(rng, 1000);
        assert!(equities[0] == 1.0);
        assert!(equities[1] == 0.0);
    }

    #[test]
    fn chopped_pot_splits_evenly() {
        let ref mut rng = SmallRng::seed_from_u64(0);
        let board = board(&["As", "Ks", "Qs", "Js", "Ts"]);
        let pockets = vec![
            Hole::try_from("2c2d").unwrap(),
            Hole::try_from("3c3d").unwrap(),
        ];
        let rollout = Rollout::new(&board, &pockets).unwrap();
        let equities = rollout.equities(rng, 1);
        assert!(equities == vec![0.5, 0.5]);
    }

    #[test]
    fn equities_sum_to_one() {
        let ref mut rng = SmallRng::seed_from_u64(42);
        let board = board(&["As", "Kd", "7h"]);
        let pockets = vec![Hole::try_from("QcQd").unwrap(), Hole::Hidden, Hole::Hidden];
        let rollout = Rollout::new(&board, &pockets).unwrap();
        let total = rollout.equities(rng, 256).iter().sum::<f32>();
        assert!((total - 1.0).abs() < 1e-3);
    }

    #[test]
    fn aces_beat_a_random_hand_heads_up() {
        let ref mut rng = SmallRng::seed_from_u64(7);
        let board = Board::empty();
        let pockets = vec![Hole::try_from("AsAh").unwrap(), Hole::Hidden];
        let rollout = Rollout::new(&board, &pockets).unwrap();
        let equities = rollout.equities(rng, 512);
        assert!(equities[0] > 0.7);
    }
}
