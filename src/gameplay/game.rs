use super::action::Action;
use super::code::Code;
use super::phase::Phase;
use super::ply::Ply;
use super::seat::Seat;
use super::seat::Status;
use super::table::Step;
use super::table::TableState;
use crate::Chips;
use crate::Position;
use crate::Probability;
use crate::Utility;
use crate::cards::board::Board;
use crate::records::stats::Stats;
use std::collections::VecDeque;

/// The rules engine for one hand of No-Limit Hold'em.
///
/// A Game owns the seats, the acting queue, the pot and the phase, and is
/// the only thing allowed to mutate them. Drive it by alternating `act`
/// with `advance`: `advance` runs the machine forward through everything
/// that needs no decision (posting blinds, closing rounds, dealing through
/// a runout, settling a walkover) and stops wherever a seat must act or a
/// showdown must be judged.
///
/// Search clones the whole thing per simulated line. Keep it flat.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Game {
    site: String,
    seats: Vec<Seat>,
    queue: VecDeque<Position>,
    button: Position,
    sb: Chips,
    bb: Chips,
    ante: Chips,
    pot: Chips,
    board: Board,
    phase: Phase,
    /// Seats dealt in when the hand began. Fixed for the hand.
    entrants: usize,
    /// Live seats at the last rotation. Stamped onto recorded plies.
    rivals: usize,
    started: bool,
    finished: bool,
    /// At most one seat can still bet. Remaining streets deal through.
    runout: bool,
    winner: Option<Vec<Position>>,
}

impl Game {
    pub fn host(
        site: &str,
        button: Position,
        sb: Chips,
        bb: Chips,
        ante: Chips,
        seats: Vec<Seat>,
    ) -> Result<Self, crate::Error> {
        if seats.len() < 2 || seats.len() > crate::MAX_SEATS {
            return Err(crate::Error::invariant(format!("{} seats", seats.len())));
        }
        if button >= seats.len() {
            return Err(crate::Error::invariant(format!("button at {}", button)));
        }
        if sb <= 0 || bb < sb || ante < 0 {
            return Err(crate::Error::invariant(format!(
                "blinds {}/{} ante {}",
                sb, bb, ante
            )));
        }
        if seats
            .iter()
            .any(|s| s.status() == Status::In && s.stack() <= 0)
        {
            return Err(crate::Error::invariant("seat dealt in without chips"));
        }
        let entrants = seats.iter().filter(|s| s.status() == Status::In).count();
        if entrants < 2 {
            return Err(crate::Error::invariant("fewer than two seats dealt in"));
        }
        Ok(Self {
            site: site.to_string(),
            seats,
            queue: VecDeque::new(),
            button,
            sb,
            bb,
            ante,
            pot: 0,
            board: Board::empty(),
            phase: Phase::Preflop,
            entrants,
            rivals: entrants,
            started: false,
            finished: false,
            runout: false,
            winner: None,
        })
    }

    /// Build the engine a driver snapshot describes, without replaying its
    /// action lists yet. Brief seat stats between this and `replay` so the
    /// replay narrows ranges with real profiles.
    pub fn seated(state: &TableState) -> Result<Self, crate::Error> {
        if !state.phase.is_betting() {
            return Err(crate::Error::bad_action(format!(
                "nothing to decide at {}",
                state.phase
            )));
        }
        let board = Board::try_from(state.board.clone())?;
        if board.size() != state.phase.n_observed() {
            return Err(crate::Error::cards(format!(
                "{} board cards on the {}",
                board.size(),
                state.phase
            )));
        }
        let mut dealt = board.pile();
        for seat in &state.seats {
            for card in seat.hand.pile() {
                dealt.admit(card)?;
            }
        }
        let seats = state
            .seats
            .iter()
            .map(|s| {
                let status = match s.status {
                    Status::Out => Status::Out,
                    _ => Status::In,
                };
                Seat::new(s.name.clone(), s.balance)
                    .sitting(status)
                    .dealt(s.hand)
            })
            .collect();
        let mut game = Self::host(&state.site, state.button, state.sb, state.bb, state.ante, seats)?;
        game.board = board;
        Ok(game)
    }

    /// Feed the snapshot's observed actions through the engine in queue
    /// order. Stops when the acting seat has no recorded step left, which
    /// is exactly the decision point the driver is asking about.
    pub fn replay(&mut self, state: &TableState) -> Result<(), crate::Error> {
        let mut cursors = vec![std::collections::BTreeMap::<Phase, usize>::new(); state.seats.len()];
        self.advance()?;
        loop {
            let Some(actor) = self.actor() else { break };
            let cursor = cursors[actor].entry(self.phase).or_insert(0);
            let Some(step) = state.seats[actor].steps(self.phase).get(*cursor) else {
                break;
            };
            *cursor += 1;
            let action = self.interpret(actor, step)?;
            self.act(action)?;
            self.advance()?;
        }
        for (pos, seat) in state.seats.iter().enumerate() {
            for phase in Phase::betting() {
                let consumed = cursors[pos].get(phase).copied().unwrap_or(0);
                if consumed < seat.steps(*phase).len() {
                    return Err(crate::Error::invariant(format!(
                        "seat {} has {} replays left on the {}",
                        pos,
                        seat.steps(*phase).len() - consumed,
                        phase
                    )));
                }
            }
        }
        if self.phase != state.phase {
            return Err(crate::Error::invariant(format!(
                "replay lands on the {}, snapshot claims the {}",
                self.phase, state.phase
            )));
        }
        Ok(())
    }

    fn interpret(&self, actor: Position, step: &Step) -> Result<Action, crate::Error> {
        match step.code {
            Code::Fold => Ok(Action::Fold),
            Code::Check => Ok(Action::Check),
            Code::Call => Ok(Action::Call(
                self.owed(actor).min(self.seats[actor].behind()),
            )),
            Code::Allin => Ok(Action::Shove(self.seats[actor].behind())),
            Code::Bet => step
                .amount
                .map(Action::Bet)
                .ok_or_else(|| crate::Error::bad_action("bet without an amount")),
            Code::Raise => step
                .amount
                .map(Action::Raise)
                .ok_or_else(|| crate::Error::bad_action("raise without an amount")),
            other => Err(crate::Error::bad_action(format!(
                "{} is not a replayable action",
                other
            ))),
        }
    }

    pub fn site(&self) -> &str {
        &self.site
    }
    pub fn phase(&self) -> Phase {
        self.phase
    }
    pub fn board(&self) -> &Board {
        &self.board
    }
    pub fn pot(&self) -> Chips {
        self.pot
    }
    pub fn button(&self) -> Position {
        self.button
    }
    pub fn sb(&self) -> Chips {
        self.sb
    }
    pub fn bb(&self) -> Chips {
        self.bb
    }
    pub fn entrants(&self) -> usize {
        self.entrants
    }
    pub fn rivals(&self) -> usize {
        self.rivals
    }
    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }
    pub fn seat(&self, pos: Position) -> &Seat {
        &self.seats[pos]
    }
    pub fn winner(&self) -> Option<&[Position]> {
        self.winner.as_deref()
    }
    pub fn brief(&mut self, pos: Position, stats: Stats) {
        self.seats[pos].brief(stats);
    }

    /// The seat on the clock, if the hand is waiting on one.
    pub fn actor(&self) -> Option<Position> {
        match self.phase.is_betting() && self.started && !self.finished && self.winner.is_none() {
            true => self
                .queue
                .front()
                .copied()
                .filter(|p| self.seats[*p].status() == Status::In),
            false => None,
        }
    }

    pub fn live(&self) -> usize {
        self.seats.iter().filter(|s| s.status().is_live()).count()
    }
    pub fn live_positions(&self) -> Vec<Position> {
        self.seats
            .iter()
            .enumerate()
            .filter(|(_, s)| s.status().is_live())
            .map(|(i, _)| i)
            .collect()
    }
    fn ins(&self) -> usize {
        self.seats
            .iter()
            .filter(|s| s.status() == Status::In)
            .count()
    }
    fn allins(&self) -> usize {
        self.seats
            .iter()
            .filter(|s| s.status() == Status::Allin)
            .count()
    }

    pub fn max_contrib(&self) -> Chips {
        self.seats.iter().map(|s| s.contrib()).max().unwrap_or(0)
    }
    /// Chips this seat must add to match the standing bet.
    pub fn owed(&self, pos: Position) -> Chips {
        self.max_contrib() - self.seats[pos].contrib()
    }
    /// Pot plus everything staked in the current round.
    pub fn total_pot(&self) -> Chips {
        self.pot + self.seats.iter().map(|s| s.contrib()).sum::<Chips>()
    }

    /// Whether the seat faces unmatched aggression, and at what price.
    /// A preflop pot nobody has raised does not count as aggression.
    pub fn facing(&self, pos: Position) -> (bool, Option<Probability>) {
        let owed = self.owed(pos);
        let limped = self.phase == Phase::Preflop && self.max_contrib() == self.bb;
        match owed > 0 && !limped {
            true => {
                let price = owed.min(self.seats[pos].behind());
                (true, Some(price as f32 / self.total_pot() as f32))
            }
            false => (false, None),
        }
    }

    /// Run the machine through everything that needs no decision. On
    /// return the hand is waiting on `actor`, on a showdown judgement,
    /// or is settled with `winner` populated.
    pub fn advance(&mut self) -> Result<(), crate::Error> {
        loop {
            if self.winner.is_some() {
                return Ok(());
            }
            self.conclude();
            if self.phase == Phase::Showdown {
                return self.resolve();
            }
            if !self.started {
                self.open()?;
                continue;
            }
            if self.finished {
                self.proceed();
                continue;
            }
            return Ok(());
        }
    }

    /// A hand with at most one live seat skips straight to settlement.
    fn conclude(&mut self) {
        if self.phase.is_betting() && self.live() <= 1 {
            self.gather();
            self.phase = Phase::Showdown;
        }
    }

    /// Walkovers settle themselves. Contested showdowns wait for `award`.
    fn resolve(&mut self) -> Result<(), crate::Error> {
        if self.winner.is_none() && self.live() == 1 {
            let last = self
                .seats
                .iter()
                .position(|s| s.status().is_live())
                .ok_or_else(|| crate::Error::invariant("no live seat to settle on"))?;
            self.award(&[last])?;
        }
        Ok(())
    }

    fn open(&mut self) -> Result<(), crate::Error> {
        self.queue = (self.button..self.seats.len())
            .chain(0..self.button)
            .collect();
        if self.phase == Phase::Preflop {
            self.collect_antes();
        }
        self.rotate();
        self.started = true;
        self.finished = false;
        if self.phase == Phase::Preflop {
            // heads up the button is the small blind and acts first
            if self.entrants == 2 {
                self.rotate();
            }
            self.post(Code::SmallBlind, self.sb)?;
            self.post(Code::BigBlind, self.bb)?;
        }
        self.close();
        self.audit()
    }

    fn proceed(&mut self) {
        self.phase = self.phase.next();
        self.started = false;
        self.finished = false;
        if self.runout && self.phase.is_betting() {
            // nobody left to bet; sweep through to showdown
            self.started = true;
            self.finished = true;
        }
    }

    fn collect_antes(&mut self) {
        if self.ante > 0 {
            let ante = self.ante;
            let mut collected = 0;
            for seat in self
                .seats
                .iter_mut()
                .filter(|s| s.status() == Status::In)
            {
                collected += seat.ante(ante);
            }
            self.pot += collected;
        }
    }

    fn post(&mut self, blind: Code, amount: Chips) -> Result<(), crate::Error> {
        let Some(actor) = self.queue.front().copied() else {
            return Ok(());
        };
        if self.seats[actor].status() != Status::In {
            return Ok(());
        }
        self.seats[actor].record(self.phase, Ply::blind(blind, self.rivals));
        match amount >= self.seats[actor].stack() {
            true => {
                let behind = self.seats[actor].behind();
                self.apply(actor, Action::Shove(behind)).map(|_| ())
            }
            false => {
                self.seats[actor].commit(amount);
                self.rotate();
                Ok(())
            }
        }
    }

    /// Legal labels for the seat on the clock. Allin is not listed; any
    /// oversized action coerces into it and `Shove` is always accepted.
    pub fn choices(&self) -> Vec<Action> {
        let Some(actor) = self.actor() else {
            return vec![];
        };
        let owed = self.owed(actor);
        let behind = self.seats[actor].behind();
        let mut actions = vec![Action::Fold];
        match owed > 0 {
            true => actions.push(Action::Call(owed.min(behind))),
            false => actions.push(Action::Check),
        }
        match self.aggressed() {
            true => actions.push(Action::Raise(self.max_contrib().max(self.bb))),
            false => actions.push(Action::Bet(self.bb)),
        }
        actions
    }

    /// Apply the queue-front seat's action and close the round if that
    /// settled it.
    pub fn act(&mut self, action: Action) -> Result<(), crate::Error> {
        let actor = self
            .actor()
            .ok_or_else(|| crate::Error::bad_action(format!("nobody to act on the {}", self.phase)))?;
        self.apply(actor, action)?;
        self.close();
        self.audit()
    }

    fn apply(&mut self, actor: Position, action: Action) -> Result<Code, crate::Error> {
        let code = self.settle(actor, action)?;
        if Code::ESCALATION.contains(&code) {
            let bound = self.seats[actor].stats().tighten(code);
            self.seats[actor].narrow(bound);
        }
        Ok(code)
    }

    fn settle(&mut self, actor: Position, action: Action) -> Result<Code, crate::Error> {
        let (aggro, odds) = self.facing(actor);
        let max = self.max_contrib();
        let owed = self.owed(actor);
        let behind = self.seats[actor].behind();
        let rivals = self.rivals;
        match action {
            Action::Fold => {
                self.seats[actor].record(self.phase, Ply::act(Code::Fold, aggro, odds, rivals));
                self.seats[actor].fold();
                self.rotate();
                Ok(Code::Fold)
            }
            Action::Bet(amount) | Action::Raise(amount) => {
                if max == 0 && amount < self.bb {
                    return Err(crate::Error::bad_action(format!(
                        "bet {} under the big blind {}",
                        amount, self.bb
                    )));
                }
                if max > 0 && amount < max {
                    return Err(crate::Error::bad_action(format!(
                        "raise {} under the standing bet {}",
                        amount, max
                    )));
                }
                // raising exactly the price of a call is a call
                if amount == owed
                    && self.phase == Phase::Preflop
                    && !self.seats[actor].posted(Code::BigBlind)
                {
                    return self.settle(actor, Action::Call(owed));
                }
                if amount >= behind {
                    return self.settle(actor, Action::Shove(behind));
                }
                let code = match self.aggressed() {
                    true => Code::Raise,
                    false => Code::Bet,
                };
                let btp = amount as f32 / self.total_pot() as f32;
                self.seats[actor]
                    .record(self.phase, Ply::act(code, aggro, odds, rivals).btp(btp));
                self.seats[actor].commit(amount);
                self.rotate();
                Ok(code)
            }
            Action::Check | Action::Call(_) => {
                if owed > 0 && owed >= behind {
                    return self.settle(actor, Action::Shove(behind));
                }
                match owed > 0 {
                    true => {
                        self.seats[actor]
                            .record(self.phase, Ply::act(Code::Call, aggro, odds, rivals));
                        self.seats[actor].commit(owed);
                        self.rotate();
                        Ok(Code::Call)
                    }
                    false => {
                        self.seats[actor]
                            .record(self.phase, Ply::act(Code::Check, aggro, odds, rivals));
                        self.rotate();
                        Ok(Code::Check)
                    }
                }
            }
            Action::Shove(_) => {
                self.seats[actor].record(self.phase, Ply::act(Code::Allin, aggro, odds, rivals));
                self.seats[actor].shove();
                self.rotate();
                Ok(Code::Allin)
            }
        }
    }

    /// Anyone staked chips beyond a limp this round, blinds included.
    fn aggressed(&self) -> bool {
        self.seats.iter().any(|s| {
            s.line(self.phase).iter().any(|p| {
                matches!(p.code, Code::SmallBlind | Code::BigBlind | Code::Bet)
            })
        })
    }

    fn close(&mut self) {
        if self.is_round_finished() {
            if self.allins() > 0 && self.ins() <= 1 {
                self.runout = true;
            }
            self.gather();
            self.finished = true;
        }
    }

    fn is_round_finished(&self) -> bool {
        for seat in self.seats.iter().filter(|s| s.status() == Status::In) {
            let plies = seat.line(self.phase).len();
            if plies == 0 {
                return false;
            }
            // the big blind closes preflop and must act past the post
            if self.phase == Phase::Preflop && seat.posted(Code::BigBlind) && plies < 2 {
                return false;
            }
        }
        let mut contribs = self
            .seats
            .iter()
            .filter(|s| s.status() == Status::In)
            .map(|s| s.contrib())
            .collect::<Vec<_>>();
        contribs.sort_unstable();
        contribs.dedup();
        if contribs.len() > 1 {
            return false;
        }
        let deepest = self
            .seats
            .iter()
            .filter(|s| s.status() == Status::Allin)
            .map(|s| s.contrib())
            .max()
            .unwrap_or(0);
        contribs.first().copied().unwrap_or(Chips::MAX) >= deepest
    }

    /// Sweep the round's contributions into the pot. A top contribution
    /// nobody matched comes back to its owner first.
    fn gather(&mut self) {
        let mut tops = self.seats.iter().map(|s| s.contrib()).collect::<Vec<_>>();
        tops.sort_unstable_by(|a, b| b.cmp(a));
        let first = tops.first().copied().unwrap_or(0);
        let second = tops.get(1).copied().unwrap_or(0);
        let unmatched = first - second;
        if unmatched > 0 {
            if let Some(seat) = self.seats.iter_mut().find(|s| s.contrib() == first) {
                seat.refund(unmatched);
            }
        }
        let mut swept = 0;
        for seat in self.seats.iter_mut() {
            swept += seat.contrib();
            seat.sweep();
        }
        self.pot += swept;
    }

    fn rotate(&mut self) {
        self.rivals = self.live();
        if self.queue.is_empty() || self.ins() == 0 {
            return;
        }
        loop {
            self.queue.rotate_left(1);
            match self.queue.front() {
                Some(pos) if self.seats[*pos].status() == Status::In => break,
                _ => continue,
            }
        }
    }

    /// Hand the pot to the named seats. Splits leave any odd chips with
    /// the seats closest clockwise from the button.
    pub fn award(&mut self, winners: &[Position]) -> Result<(), crate::Error> {
        if self.phase != Phase::Showdown {
            return Err(crate::Error::bad_action(format!(
                "award on the {}",
                self.phase
            )));
        }
        let mut order = winners.to_vec();
        order.sort_unstable();
        order.dedup();
        if order.is_empty() {
            return Err(crate::Error::bad_action("nobody to award"));
        }
        for pos in &order {
            if *pos >= self.seats.len() || !self.seats[*pos].status().is_live() {
                return Err(crate::Error::bad_action(format!("seat {} cannot win", pos)));
            }
        }
        let n = order.len() as Chips;
        let share = self.pot / n;
        let mut odd = self.pot - share * n;
        let clockwise = {
            let seats = self.seats.len();
            let button = self.button;
            move |pos: &Position| (*pos + seats - button - 1) % seats
        };
        let mut paid = order.clone();
        paid.sort_by_key(clockwise);
        for pos in paid {
            let bonus = Chips::from(odd > 0);
            odd -= bonus;
            self.seats[pos].collect(share + bonus);
        }
        self.pot = 0;
        self.winner = Some(order);
        self.phase = Phase::Gg;
        self.finished = true;
        Ok(())
    }

    /// Hero's win and loss outcomes from here, counted from the chips
    /// they had committed when the search began. The prize is summed from
    /// matched bets so it survives a pot already paid out by `award`.
    pub fn stakes(&self, hero: Position, committed: Chips) -> (Utility, Utility) {
        let mut settled = self.clone();
        settled.gather();
        let prize = settled.seats.iter().map(|s| s.matched()).sum::<Chips>();
        let spent = settled.seats[hero].matched() - committed;
        ((prize - spent) as Utility, -(spent as Utility))
    }

    /// Content hash of the serialized state, for snapshot identity.
    pub fn digest(&self) -> u64 {
        use std::hash::Hash;
        use std::hash::Hasher;
        let ref mut hasher = std::collections::hash_map::DefaultHasher::new();
        serde_json::to_string(self).unwrap_or_default().hash(hasher);
        hasher.finish()
    }

    fn audit(&self) -> Result<(), crate::Error> {
        if self.pot < 0 {
            return Err(crate::Error::invariant(format!("pot {}", self.pot)));
        }
        for (pos, seat) in self.seats.iter().enumerate() {
            if seat.contrib() < 0 || seat.stack() < 0 || seat.contrib() > seat.stack() {
                return Err(crate::Error::invariant(format!(
                    "seat {} stakes {} of {}",
                    pos,
                    seat.contrib(),
                    seat.stack()
                )));
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f)?;
        writeln!(f, "{:<8} ${:<6} [{}]", self.phase, self.pot, self.board)?;
        for (pos, seat) in self.seats.iter().enumerate() {
            let dealer = match pos == self.button {
                true => "D",
                false => " ",
            };
            let clock = match Some(pos) == self.actor() {
                true => ">",
                false => " ",
            };
            writeln!(
                f,
                "{}{} {} {}",
                dealer,
                clock,
                seat,
                seat.stats().profile(seat.strength())
            )?;
        }
        Ok(())
    }
}
