use super::lead::Lead;
use super::report::Halt;
use super::report::Report;
use super::report::Row;
use super::spot::Spot;
use super::tree::Tree;
use crate::Chips;
use crate::Position;
use crate::Probability;
use crate::Utility;
use crate::equity::judge::Judge;
use crate::gameplay::action::Action;
use crate::gameplay::code::Code;
use crate::gameplay::game::Game;
use crate::gameplay::seat::Status;
use crate::records::ledger::Log;
use crate::records::query::Query;
use crate::records::stats::Stats;
use petgraph::graph::NodeIndex;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::collections::BinaryHeap;
use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;
use std::time::Instant;

/// What probing a popped leaf found.
enum Outcome {
    /// Somebody still has a decision; expand from this state.
    Decision(Game),
    /// The hand is over as far as the hero is concerned.
    Terminal(Utility),
}

/// Selective expansion over the hero's decision tree.
///
/// The frontier is a priority queue of unexplored leaves, keyed so the
/// most probable line under the opponent model is processed first. Each
/// pass pops a batch, replays every popped line on a clone of the root
/// state in parallel, then applies the results serially: terminal leaves
/// take an EV and push it up the path, undecided leaves grow children
/// priced by the action log. Partially explored trees are always valid,
/// so a deadline or a cancel just stops the loop; the tree survives
/// between runs and later runs pick up where earlier ones left off.
pub struct Search {
    tree: Tree,
    root: Game,
    hero: Position,
    /// Hero chips already in the middle when the tree was planted. Leaf
    /// values count from here; everything before is sunk.
    committed: Chips,
    frontier: BinaryHeap<Lead>,
    /// Leaves probed per pass. Each popped line replays on its own clone
    /// of the root, so this is the width handed to the worker pool.
    workers: usize,
    seq: usize,
    history: BTreeMap<Position, Vec<Utility>>,
    snapshots: VecDeque<Action>,
}

impl Search {
    pub fn plant(root: Game, hero: Position) -> Result<Self, crate::Error> {
        match root.actor() {
            Some(actor) if actor == hero => {}
            _ => return Err(crate::Error::bad_action("hero is not on the clock")),
        }
        let committed = root.seat(hero).matched() + root.seat(hero).contrib();
        let tree = Tree::plant(Spot::root(root.phase()));
        let mut frontier = BinaryHeap::new();
        frontier.push(Lead::new(1., 1., 0, Tree::root()));
        Ok(Self {
            tree,
            root,
            hero,
            committed,
            frontier,
            workers: 1,
            seq: 0,
            history: BTreeMap::new(),
            snapshots: VecDeque::new(),
        })
    }

    pub fn workers(mut self, n: usize) -> Self {
        self.workers = n.max(1);
        self
    }

    pub fn hero(&self) -> Position {
        self.hero
    }
    pub fn size(&self) -> usize {
        self.tree.len()
    }
    /// Every reachable line has been valued; more budget changes nothing.
    pub fn exhausted(&self) -> bool {
        self.frontier.is_empty()
    }

    pub fn run(
        &mut self,
        judge: &Judge,
        log: &dyn Log,
        budget: Duration,
        cancel: &AtomicBool,
    ) -> Result<Report, crate::Error> {
        let deadline = Instant::now() + budget;
        let halt = loop {
            if cancel.load(Ordering::Relaxed) {
                break Some(Halt::Cancelled);
            }
            if Instant::now() >= deadline {
                break Some(Halt::Deadline);
            }
            let batch = self.pop();
            if batch.is_empty() {
                break None;
            }
            let outcomes = batch
                .par_iter()
                .map(|(_, line)| self.probe(judge, line))
                .collect::<Result<Vec<_>, crate::Error>>()?;
            for ((lead, _), outcome) in batch.into_iter().zip(outcomes) {
                match outcome {
                    Outcome::Decision(game) => self.expand(lead.node(), &game, log)?,
                    Outcome::Terminal(ev) => {
                        self.tree.spot_mut(lead.node()).evaluate(ev);
                        self.update(lead.node());
                    }
                }
            }
            self.snapshot();
        };
        Ok(self.report(halt))
    }

    fn pop(&mut self) -> Vec<(Lead, Vec<Action>)> {
        let mut batch = Vec::with_capacity(self.workers);
        while batch.len() < self.workers {
            match self.frontier.pop() {
                Some(lead) => {
                    let line = self.tree.line(lead.node());
                    batch.push((lead, line));
                }
                None => break,
            }
        }
        batch
    }

    /// Replay a line on a fresh clone and classify where it lands. Ends
    /// with the hero folded, a settled pot, or a contested showdown make
    /// a terminal leaf; anything else waits on a decision.
    fn probe(&self, judge: &Judge, line: &[Action]) -> Result<Outcome, crate::Error> {
        let mut game = self.root.clone();
        for action in line {
            game.act(*action)?;
            game.advance()?;
        }
        if game.seat(self.hero).status() == Status::Fold {
            let (_, losses) = game.stakes(self.hero, self.committed);
            return Ok(Outcome::Terminal(losses));
        }
        if let Some(winners) = game.winner() {
            let (winnings, losses) = game.stakes(self.hero, self.committed);
            return Ok(Outcome::Terminal(match winners.contains(&self.hero) {
                true => winnings,
                false => losses,
            }));
        }
        if game.actor().is_some() {
            return Ok(Outcome::Decision(game));
        }
        let equity = match judge.equities(&game) {
            Ok(equities) => equities.get(&self.hero).copied().unwrap_or(0.),
            Err(crate::Error::TooFewPlayers) => 1.,
            Err(e) => return Err(e),
        };
        let (winnings, losses) = game.stakes(self.hero, self.committed);
        Ok(Outcome::Terminal(winnings * equity + losses * (1. - equity)))
    }

    fn expand(
        &mut self,
        node: NodeIndex,
        game: &Game,
        log: &dyn Log,
    ) -> Result<(), crate::Error> {
        let Some(actor) = game.actor() else {
            return Err(crate::Error::invariant("expanding without a seat on the clock"));
        };
        let stats = match log.stats(&Query::resembling(game, actor)) {
            Ok(stats) => stats,
            Err(crate::Error::NoData) => Stats::flat(),
            Err(e) => {
                log::warn!("{:<32}{}", "action log unavailable", e);
                Stats::flat()
            }
        };
        let cum = self.tree.spot(node).cum();
        self.tree.spot_mut(node).expand(actor);
        for (action, prior, divider) in Self::grid(game, actor, &stats) {
            let spot = Spot::child(game.phase(), prior, cum * prior, divider);
            let child = self.tree.attach(node, action, spot);
            self.seq += 1;
            self.frontier.push(Lead::new(cum * prior, prior, self.seq, child));
        }
        Ok(())
    }

    /// Action children with opponent-model priors. Bets come in half-pot
    /// and full-pot sizings and raises double or triple the standing bet,
    /// all rounded to the nearest big blind; sizings past the stack fold
    /// their share into the allin child and duplicates collapse. Fold is
    /// dropped when checking is free, raising when the seat already
    /// aggressed this phase. Priors renormalize so the children's shares
    /// sum to one.
    fn grid(game: &Game, actor: Position, stats: &Stats) -> Vec<(Action, Probability, u32)> {
        let bb = game.bb();
        let pot = game.total_pot();
        let max = game.max_contrib();
        let owed = game.owed(actor);
        let contrib = game.seat(actor).contrib();
        let behind = game.seat(actor).behind();
        let aggressed = game
            .seat(actor)
            .line(game.phase())
            .iter()
            .any(|ply| matches!(ply.code, Code::Bet | Code::Raise));
        let freq = |code: Code| stats.freq(code).max(crate::STATS_FLOOR);
        let mut allin = freq(Code::Allin);
        let mut children: Vec<(Action, Probability, u32)> = Vec::new();
        for choice in game.choices() {
            match choice {
                Action::Fold if owed == 0 => continue,
                Action::Fold => children.push((choice, freq(Code::Fold), 1)),
                Action::Check => children.push((choice, freq(Code::Check), 1)),
                Action::Call(_) => children.push((choice, freq(Code::Call), 1)),
                Action::Raise(_) if aggressed => continue,
                Action::Bet(_) => {
                    let sizings = [pot / 2, pot]
                        .iter()
                        .map(|target| Self::nearest(*target, bb))
                        .collect();
                    Self::split(
                        &mut children,
                        &mut allin,
                        Action::Bet,
                        freq(Code::Bet),
                        sizings,
                        behind,
                    );
                }
                Action::Raise(_) => {
                    let sizings = [max * 2, max * 3]
                        .iter()
                        .map(|total| Self::nearest(*total, bb) - contrib)
                        .filter(|added| *added >= max)
                        .collect();
                    Self::split(
                        &mut children,
                        &mut allin,
                        Action::Raise,
                        freq(Code::Raise),
                        sizings,
                        behind,
                    );
                }
                Action::Shove(_) => continue,
            }
        }
        if behind > 0 {
            children.push((Action::Shove(behind), allin, 1));
        }
        let mass = children
            .iter()
            .map(|(_, prior, divider)| prior / *divider as Probability)
            .sum::<Probability>();
        if mass > 0. {
            for (_, prior, _) in children.iter_mut() {
                *prior /= mass;
            }
        }
        children
    }

    /// Split one code's prior across its surviving sizings. Duplicate
    /// amounts collapse first; amounts at or past the stack hand their
    /// share to the allin child instead of becoming children.
    fn split(
        children: &mut Vec<(Action, Probability, u32)>,
        allin: &mut Probability,
        wrap: fn(Chips) -> Action,
        prior: Probability,
        sizings: Vec<Chips>,
        behind: Chips,
    ) {
        let mut amounts: Vec<Chips> = Vec::new();
        for amount in sizings {
            if !amounts.contains(&amount) {
                amounts.push(amount);
            }
        }
        let divider = amounts.len() as u32;
        for amount in amounts {
            match amount >= behind {
                true => *allin += prior / divider as Probability,
                false => children.push((wrap(amount), prior, divider)),
            }
        }
    }

    fn nearest(amount: Chips, bb: Chips) -> Chips {
        ((amount + bb / 2) / bb).max(1) * bb
    }

    /// Refresh every ancestor of a freshly valued leaf. The hero takes
    /// the best traversed child; an opponent mixes children by prior over
    /// divider. Untraversed children are skipped, so partial trees stay
    /// well defined.
    fn update(&mut self, leaf: NodeIndex) {
        for node in self.tree.ancestry(leaf) {
            let Some(seat) = self.tree.spot(node).seat() else {
                continue;
            };
            let mut traversals = 0;
            let mut best: Option<Utility> = None;
            let mut mean = 0.;
            for child in self.tree.children(node) {
                let spot = self.tree.spot(child);
                let Some(ev) = spot.ev() else {
                    continue;
                };
                if spot.traversals() == 0 {
                    continue;
                }
                traversals += spot.traversals();
                best = Some(best.map_or(ev, |b: Utility| b.max(ev)));
                mean += ev * spot.weight();
            }
            if traversals == 0 {
                continue;
            }
            let ev = match seat == self.hero {
                true => best.unwrap_or(0.),
                false => mean,
            };
            self.tree.spot_mut(node).update(ev, traversals);
            self.history.entry(seat).or_default().push(ev);
        }
    }

    fn snapshot(&mut self) {
        let rows = self.rows();
        let best = rows
            .iter()
            .filter(|row| row.ev.is_some())
            .max_by(|a, b| a.ev.partial_cmp(&b.ev).unwrap_or(std::cmp::Ordering::Equal));
        if let Some(row) = best {
            if self.snapshots.len() == crate::CONFIDENCE_WINDOW {
                self.snapshots.pop_front();
            }
            self.snapshots.push_back(row.action);
        }
    }

    fn rows(&self) -> Vec<Row> {
        self.tree
            .children(Tree::root())
            .into_iter()
            .map(|child| {
                let spot = self.tree.spot(child);
                Row {
                    action: self.tree.action(child).expect("root child carries its action"),
                    ev: spot.ev(),
                    traversals: spot.traversals(),
                }
            })
            .collect()
    }

    fn report(&self, halt: Option<Halt>) -> Report {
        let snapshots = self.snapshots.iter().copied().collect::<Vec<_>>();
        Report::new(
            self.rows(),
            self.history.clone(),
            &snapshots,
            self.tree.spot(Tree::root()).traversals(),
            halt,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::card::Card;
    use crate::cards::hole::Hole;
    use crate::cards::rankings::Rankings;
    use crate::gameplay::phase::Phase;
    use crate::gameplay::seat::Seat;
    use crate::gameplay::table::SeatState;
    use crate::gameplay::table::Step;
    use crate::gameplay::table::TableState;
    use crate::records::ledger::Ledger;
    use std::sync::OnceLock;

    fn judge() -> Judge {
        static TINY: OnceLock<Rankings> = OnceLock::new();
        Judge::seeded(TINY.get_or_init(|| Rankings::grow(16, 5)).clone(), 7)
    }

    /// Heads up, checked down to the river with the board out. The big
    /// blind holds an unbeatable overpair against a shown bust and is
    /// first to act.
    fn lock_on_the_river() -> Game {
        let state = TableState {
            site: String::new(),
            button: 0,
            sb: 10,
            bb: 20,
            ante: 0,
            phase: Phase::River,
            board: ["2c", "7d", "9h", "Js", "Qs"]
                .iter()
                .map(|s| Card::try_from(*s).unwrap())
                .collect(),
            seats: vec![
                SeatState::new("button", 1000)
                    .dealt(Hole::try_from("3c4d").unwrap())
                    .acted(Phase::Preflop, Step::of(Code::Call))
                    .acted(Phase::Flop, Step::of(Code::Check))
                    .acted(Phase::Turn, Step::of(Code::Check)),
                SeatState::new("hero", 1000)
                    .dealt(Hole::try_from("AhAd").unwrap())
                    .acted(Phase::Preflop, Step::of(Code::Check))
                    .acted(Phase::Flop, Step::of(Code::Check))
                    .acted(Phase::Turn, Step::of(Code::Check)),
            ],
            hero: Some(1),
        };
        let mut game = Game::seated(&state).unwrap();
        game.replay(&state).unwrap();
        game
    }

    #[test]
    fn planting_needs_the_hero_on_the_clock() {
        assert!(matches!(
            Search::plant(lock_on_the_river(), 0),
            Err(crate::Error::BadAction(_))
        ));
    }

    #[test]
    fn a_lock_hand_exhausts_to_a_positive_ev() {
        let mut search = Search::plant(lock_on_the_river(), 1).unwrap();
        let cancel = AtomicBool::new(false);
        let report = search
            .run(&judge(), &Ledger::default(), Duration::from_secs(30), &cancel)
            .unwrap();
        assert!(search.exhausted());
        assert!(report.halt().is_none());
        assert!(report.rows().iter().all(|row| row.action != Action::Fold));
        // checking down wins the 40 already in the middle
        assert!(report.best().map(|row| row.ev).flatten().unwrap() >= 39.);
        let spread = report.rows().iter().map(|row| row.traversals).sum::<usize>();
        assert!(report.traversals() == spread);
        assert!(!report.history(1).is_empty());
        assert!(report.confidence() > 0);
    }

    #[test]
    fn reruns_resume_and_never_lose_traversals() {
        let mut search = Search::plant(lock_on_the_river(), 1).unwrap();
        let cancel = AtomicBool::new(false);
        let judge = judge();
        let log = Ledger::default();
        let first = search
            .run(&judge, &log, Duration::from_millis(5), &cancel)
            .unwrap();
        let second = search
            .run(&judge, &log, Duration::from_secs(30), &cancel)
            .unwrap();
        assert!(second.traversals() >= first.traversals());
        assert!(second.halt().is_none());
    }

    #[test]
    fn a_preset_cancel_stops_before_any_work() {
        let mut search = Search::plant(lock_on_the_river(), 1).unwrap();
        let cancel = AtomicBool::new(true);
        let report = search
            .run(&judge(), &Ledger::default(), Duration::from_secs(1), &cancel)
            .unwrap();
        assert!(report.halt() == Some(Halt::Cancelled));
        assert!(report.rows().is_empty());
        assert!(report.best().is_none());
    }

    #[test]
    fn sizings_collapse_and_overflow_into_allin() {
        let mut children = Vec::new();
        let mut allin = 0.1;
        Search::split(
            &mut children,
            &mut allin,
            Action::Bet,
            0.4,
            vec![40, 40, 980],
            500,
        );
        assert!(children == vec![(Action::Bet(40), 0.4, 2)]);
        assert!((allin - 0.3).abs() < 1e-6);
    }

    #[test]
    fn an_unopened_flop_bets_half_and_full_pot() {
        let seats = vec![
            Seat::new("button".to_string(), 1000),
            Seat::new("blind".to_string(), 1000),
        ];
        let mut game = Game::host("", 0, 10, 20, 0, seats).unwrap();
        game.advance().unwrap();
        game.act(Action::Call(10)).unwrap();
        game.act(Action::Check).unwrap();
        game.advance().unwrap();
        let grid = Search::grid(&game, 1, &Stats::flat());
        let actions = grid.iter().map(|(a, _, _)| *a).collect::<Vec<_>>();
        assert!(
            actions
                == vec![
                    Action::Check,
                    Action::Bet(20),
                    Action::Bet(40),
                    Action::Shove(980),
                ]
        );
        let mass = grid
            .iter()
            .map(|(_, prior, divider)| prior / *divider as Probability)
            .sum::<Probability>();
        assert!((mass - 1.0).abs() < 1e-6);
    }

    #[test]
    fn preflop_raises_double_and_triple_the_blind() {
        let seats = vec![
            Seat::new("button".to_string(), 1000),
            Seat::new("blind".to_string(), 1000),
        ];
        let mut game = Game::host("", 0, 10, 20, 0, seats).unwrap();
        game.advance().unwrap();
        let grid = Search::grid(&game, 0, &Stats::flat());
        let actions = grid.iter().map(|(a, _, _)| *a).collect::<Vec<_>>();
        assert!(
            actions
                == vec![
                    Action::Fold,
                    Action::Call(10),
                    Action::Raise(30),
                    Action::Raise(50),
                    Action::Shove(990),
                ]
        );
    }
}
