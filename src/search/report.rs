use crate::Position;
use crate::Utility;
use crate::gameplay::action::Action;
use std::collections::BTreeMap;

/// Why a run stopped before exhausting the frontier. Neither is an
/// error; whatever the tree holds at that point stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Halt {
    Deadline,
    Cancelled,
}

impl std::fmt::Display for Halt {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Deadline => write!(f, "deadline"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// One root action with what the search has learned about it. Rows with
/// no traversed descendants keep `ev` unset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Row {
    pub action: Action,
    pub ev: Option<Utility>,
    pub traversals: usize,
}

/// A run's results: root actions best-first, the per-seat EV series the
/// update walks produced, and how settled the choice looks over the
/// trailing snapshot window.
#[derive(Debug, Clone)]
pub struct Report {
    rows: Vec<Row>,
    history: BTreeMap<Position, Vec<Utility>>,
    favorite: Option<Action>,
    confidence: u8,
    traversals: usize,
    halt: Option<Halt>,
}

impl Report {
    pub(crate) fn new(
        mut rows: Vec<Row>,
        history: BTreeMap<Position, Vec<Utility>>,
        snapshots: &[Action],
        traversals: usize,
        halt: Option<Halt>,
    ) -> Self {
        rows.sort_by(|a, b| match (a.ev, b.ev) {
            (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(std::cmp::Ordering::Equal),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        let (favorite, confidence) = Self::poll(snapshots);
        Self {
            rows,
            history,
            favorite,
            confidence,
            traversals,
            halt,
        }
    }

    /// Margin of the modal best action over the runner-up within the
    /// snapshot window, as a percentage of the window size.
    fn poll(snapshots: &[Action]) -> (Option<Action>, u8) {
        let mut tally: Vec<(Action, usize)> = Vec::new();
        for action in snapshots {
            match tally.iter_mut().find(|(a, _)| a == action) {
                Some((_, count)) => *count += 1,
                None => tally.push((*action, 1)),
            }
        }
        tally.sort_by(|a, b| b.1.cmp(&a.1));
        match tally.len() {
            0 => (None, 0),
            1 => (
                Some(tally[0].0),
                (100 * snapshots.len() / crate::CONFIDENCE_WINDOW) as u8,
            ),
            _ => (
                Some(tally[0].0),
                (100 * (tally[0].1 - tally[1].1) / crate::CONFIDENCE_WINDOW) as u8,
            ),
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }
    /// The highest-EV root action, once anything has been traversed.
    pub fn best(&self) -> Option<&Row> {
        self.rows.first().filter(|row| row.ev.is_some())
    }
    pub fn history(&self, seat: Position) -> &[Utility] {
        self.history
            .get(&seat)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
    pub fn favorite(&self) -> Option<Action> {
        self.favorite
    }
    pub fn confidence(&self) -> u8 {
        self.confidence
    }
    pub fn traversals(&self) -> usize {
        self.traversals
    }
    pub fn halt(&self) -> Option<Halt> {
        self.halt
    }
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for row in self.rows.iter() {
            match row.ev {
                Some(ev) => writeln!(f, "{:<24} ev {:>+9.1}  n {}", row.action, ev, row.traversals)?,
                None => writeln!(f, "{:<24} ev {:>9}  n {}", row.action, "?", row.traversals)?,
            }
        }
        match self.favorite {
            Some(favorite) => writeln!(f, "{}% settled on {}", self.confidence, favorite)?,
            None => writeln!(f, "nothing traversed yet")?,
        }
        match self.halt {
            Some(halt) => writeln!(f, "stopped at {} after {} traversals", halt, self.traversals),
            None => writeln!(f, "tree exhausted after {} traversals", self.traversals),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_sort_best_first_with_unvalued_last() {
        let report = Report::new(
            vec![
                Row {
                    action: Action::Fold,
                    ev: Some(-20.),
                    traversals: 2,
                },
                Row {
                    action: Action::Raise(60),
                    ev: Some(35.),
                    traversals: 4,
                },
                Row {
                    action: Action::Call(20),
                    ev: None,
                    traversals: 0,
                },
            ],
            BTreeMap::new(),
            &[],
            6,
            None,
        );
        assert!(report.rows()[0].action == Action::Raise(60));
        assert!(report.rows()[2].ev.is_none());
        assert!(report.best().map(|r| r.action) == Some(Action::Raise(60)));
    }

    #[test]
    fn unanimous_window_is_full_confidence() {
        let snapshots = vec![Action::Raise(60); crate::CONFIDENCE_WINDOW];
        let report = Report::new(vec![], BTreeMap::new(), &snapshots, 0, None);
        assert!(report.confidence() == 100);
        assert!(report.favorite() == Some(Action::Raise(60)));
    }

    #[test]
    fn split_window_reports_the_margin() {
        let mut snapshots = vec![Action::Raise(60); 7];
        snapshots.extend(vec![Action::Call(20); 4]);
        let report = Report::new(vec![], BTreeMap::new(), &snapshots, 0, None);
        assert!(report.favorite() == Some(Action::Raise(60)));
        // (7 - 4) / 11 of the window
        assert!(report.confidence() == 27);
    }

    #[test]
    fn empty_window_has_no_favorite() {
        let report = Report::new(vec![], BTreeMap::new(), &[], 0, Some(Halt::Cancelled));
        assert!(report.favorite().is_none());
        assert!(report.confidence() == 0);
        assert!(report.halt() == Some(Halt::Cancelled));
    }
}
