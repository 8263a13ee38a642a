use super::snapshot::Snapshot;
use crate::Position;
use crate::Utility;
use crate::cards::rankings::Rankings;
use crate::equity::judge::Judge;
use crate::gameplay::game::Game;
use crate::gameplay::table::TableState;
use crate::records::ledger::Log;
use crate::records::query::Query;
use crate::records::record::Record;
use crate::search::report::Report;
use crate::search::report::Row;
use crate::search::search::Search;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;

/// One loaded decision, keyed by the digest of the state it came from.
struct Session {
    digest: u64,
    hero: Position,
    game: Game,
    search: Search,
    report: Option<Report>,
}

/// The caller-facing surface of the crate. Owns the equity judge, the
/// opponent action log, and at most one live search tree.
///
/// A driver pushes whole table states in; the advisor replays each one,
/// profiles every seat from the log, and searches the hero's pending
/// decision for whatever budget each call affords. Pushing the same
/// state twice is free: the tree is addressed by the content digest of
/// the replayed state, so repeated pushes keep refining one tree
/// instead of starting over.
pub struct Advisor {
    judge: Judge,
    log: Box<dyn Log>,
    workers: usize,
    cancel: Arc<AtomicBool>,
    session: Option<Session>,
}

impl Advisor {
    pub fn new(rankings: Rankings, log: Box<dyn Log>) -> Self {
        Self {
            judge: Judge::new(rankings),
            log,
            workers: 1,
            cancel: Arc::new(AtomicBool::new(false)),
            session: None,
        }
    }

    /// Deterministic equity sampling, for reproducible runs.
    pub fn seeded(rankings: Rankings, log: Box<dyn Log>, seed: u64) -> Self {
        Self {
            judge: Judge::seeded(rankings, seed),
            log,
            workers: 1,
            cancel: Arc::new(AtomicBool::new(false)),
            session: None,
        }
    }

    /// Lines probed concurrently per search pass.
    pub fn workers(mut self, n: usize) -> Self {
        self.workers = n.max(1);
        self
    }

    /// Shared flag another thread can set to stop a running search
    /// early. Loading a state rearms it.
    pub fn interrupt(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Load the table as the hero faces it. The state replays from the
    /// blinds forward with every seat profiled from the action log, then
    /// a search tree is planted at the hero's pending decision. A state
    /// whose digest matches the one already loaded keeps the existing
    /// tree and everything it has learned; a state the advisor cannot
    /// act on (no hero, hero not on the clock, an action that will not
    /// replay) clears whatever was loaded before.
    pub fn set_state(&mut self, state: &TableState) -> Result<(), crate::Error> {
        self.cancel.store(false, Ordering::Relaxed);
        match self.load(state) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.session = None;
                Err(e)
            }
        }
    }

    fn load(&mut self, state: &TableState) -> Result<(), crate::Error> {
        let hero = state
            .hero()
            .ok_or(crate::Error::bad_action("no hero seat to advise"))?;
        let mut game = Game::seated(state)?;
        for pos in 0..state.seats.len() {
            match self.log.stats(&Query::resembling(&game, pos)) {
                Ok(stats) => game.brief(pos, stats),
                Err(crate::Error::NoData) => continue,
                Err(e) => {
                    log::warn!("{:<32}{}", "action log unavailable", e);
                    continue;
                }
            }
        }
        game.replay(state)?;
        let digest = game.digest();
        if let Some(ref session) = self.session {
            if session.digest == digest && session.hero == hero {
                log::debug!("{:<32}{:016x}", "state unchanged, tree kept", digest);
                return Ok(());
            }
        }
        log::info!("{:<32}{:016x}", "planting a search tree", digest);
        let search = Search::plant(game.clone(), hero)?.workers(self.workers);
        self.session = Some(Session {
            digest,
            hero,
            game,
            search,
            report: None,
        });
        Ok(())
    }

    /// Search until the budget runs out, the tree is exhausted, or the
    /// interrupt flag trips. Partial results are always usable and later
    /// calls pick up where this one stopped.
    pub fn run(&mut self, budget: Duration) -> Result<&Report, crate::Error> {
        let Some(ref mut session) = self.session else {
            return Err(crate::Error::bad_action("no table state loaded"));
        };
        let report = session
            .search
            .run(&self.judge, &*self.log, budget, &self.cancel)?;
        Ok(session.report.insert(report))
    }

    /// The highest-EV explored action so far, if any search has run.
    pub fn best_action(&self) -> Option<&Row> {
        self.report().and_then(Report::best)
    }

    /// Every explored root action with its EV and visit count, best
    /// first. Empty before any search.
    pub fn action_table(&self) -> &[Row] {
        self.report().map(Report::rows).unwrap_or(&[])
    }

    /// Best-EV trace for a seat, one entry per completed search pass.
    pub fn ev_history(&self, seat: Position) -> &[Utility] {
        self.report()
            .map(|report| report.history(seat))
            .unwrap_or(&[])
    }

    /// Freeze the loaded state for later inspection or replay.
    pub fn snapshot(&self) -> Option<Snapshot> {
        self.session
            .as_ref()
            .map(|session| Snapshot::freeze(session.game.clone(), Some(session.hero)))
    }

    /// Feed settled hands back into the opponent model. The tree already
    /// planted keeps its priors; the next state load re-profiles.
    pub fn absorb(&mut self, records: Vec<Record>) {
        self.log.absorb(records);
    }

    fn report(&self) -> Option<&Report> {
        self.session.as_ref().and_then(|s| s.report.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::card::Card;
    use crate::cards::hole::Hole;
    use crate::gameplay::action::Action;
    use crate::gameplay::code::Code;
    use crate::gameplay::phase::Phase;
    use crate::gameplay::table::SeatState;
    use crate::gameplay::table::Step;
    use crate::records::ledger::Ledger;
    use crate::search::report::Halt;
    use std::sync::OnceLock;

    fn advisor() -> Advisor {
        static TINY: OnceLock<Rankings> = OnceLock::new();
        let rankings = TINY.get_or_init(|| Rankings::grow(16, 5)).clone();
        Advisor::seeded(rankings, Box::new(Ledger::default()), 7)
    }

    /// Heads up, checked down to the river, hero first to act holding an
    /// unbeatable overpair against a shown bust.
    fn lock_on_the_river() -> TableState {
        TableState {
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
        }
    }

    /// Same lock, but the turn went bet and call, so six times the pot
    /// rides on the river.
    fn raised_lock_on_the_river() -> TableState {
        let mut state = lock_on_the_river();
        let turn = vec![Step::sized(Code::Bet, 100)];
        state.seats[1].actions.insert(Phase::Turn, turn);
        let turn = vec![Step::of(Code::Call)];
        state.seats[0].actions.insert(Phase::Turn, turn);
        state
    }

    #[test]
    fn resubmitting_the_same_state_keeps_the_tree() {
        let mut advisor = advisor();
        let state = lock_on_the_river();
        advisor.set_state(&state).unwrap();
        let first = advisor.run(Duration::from_secs(30)).unwrap().traversals();
        assert!(first > 0);
        advisor.set_state(&state).unwrap();
        // a zero budget cannot grow anything, so surviving rows prove
        // the second load reused the exhausted tree
        let report = advisor.run(Duration::ZERO).unwrap();
        assert!(report.halt() == Some(Halt::Deadline));
        assert!(report.traversals() == first);
        assert!(advisor.best_action().is_some());
        assert!(!advisor.ev_history(1).is_empty());
    }

    #[test]
    fn a_changed_state_replants_the_tree() {
        let mut advisor = advisor();
        advisor.set_state(&lock_on_the_river()).unwrap();
        let small = advisor.run(Duration::from_secs(30)).unwrap();
        let small = small.best().map(|row| row.ev).flatten().unwrap();
        advisor.set_state(&raised_lock_on_the_river()).unwrap();
        let blank = advisor.run(Duration::ZERO).unwrap();
        assert!(blank.traversals() == 0);
        let big = advisor.run(Duration::from_secs(30)).unwrap();
        let big = big.best().map(|row| row.ev).flatten().unwrap();
        // the same lock is worth the bigger pot
        assert!(small >= 39.);
        assert!(big >= 239.);
    }

    #[test]
    fn advice_before_any_state_is_refused() {
        let mut advisor = advisor();
        assert!(matches!(
            advisor.run(Duration::from_secs(1)),
            Err(crate::Error::BadAction(_))
        ));
        assert!(advisor.best_action().is_none());
        assert!(advisor.action_table().is_empty());
        assert!(advisor.ev_history(0).is_empty());
        assert!(advisor.snapshot().is_none());
    }

    #[test]
    fn a_rejected_state_clears_any_loaded_session() {
        let mut advisor = advisor();
        advisor.set_state(&lock_on_the_river()).unwrap();
        advisor.run(Duration::from_secs(30)).unwrap();
        assert!(advisor.best_action().is_some());
        // the button is not the seat on the clock
        let mut villain = lock_on_the_river();
        villain.hero = Some(0);
        assert!(advisor.set_state(&villain).is_err());
        assert!(advisor.best_action().is_none());
        assert!(advisor.snapshot().is_none());
    }

    #[test]
    fn a_state_with_no_resolvable_hero_is_refused() {
        let mut advisor = advisor();
        // both hands are shown, so nothing singles a hero out
        let mut state = lock_on_the_river();
        state.hero = None;
        assert!(matches!(
            advisor.set_state(&state),
            Err(crate::Error::BadAction(_))
        ));
    }

    #[test]
    fn the_interrupt_flag_stops_a_run_and_rearms_on_load() {
        let mut advisor = advisor();
        advisor.set_state(&lock_on_the_river()).unwrap();
        advisor.interrupt().store(true, Ordering::Relaxed);
        let report = advisor.run(Duration::from_secs(30)).unwrap();
        assert!(report.halt() == Some(Halt::Cancelled));
        advisor.set_state(&lock_on_the_river()).unwrap();
        let report = advisor.run(Duration::from_secs(30)).unwrap();
        assert!(report.halt().is_none());
        assert!(report.rows().iter().all(|row| row.action != Action::Fold));
    }

    #[test]
    fn snapshots_carry_the_loaded_decision() {
        let mut advisor = advisor();
        advisor.set_state(&lock_on_the_river()).unwrap();
        let snapshot = advisor.snapshot().unwrap();
        let (game, hero) = snapshot.thaw().unwrap();
        assert!(hero == Some(1));
        assert!(game.phase() == Phase::River);
        assert!(game.actor() == Some(1));
    }
}
