use super::code::Code;
use crate::Chips;

/// A voluntary move by the acting seat. Amounts on `Call` and `Shove` are
/// advisory; the rules engine recomputes both from the table state when the
/// action is applied. Bet and raise amounts are the chips ADDED to the
/// seat's contribution this round, not a raise-to total.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Action {
    Fold,
    Check,
    Call(Chips),
    Bet(Chips),
    Raise(Chips),
    Shove(Chips),
}

impl Action {
    pub fn amount(&self) -> Option<Chips> {
        match self {
            Action::Fold | Action::Check => None,
            Action::Call(x) | Action::Bet(x) | Action::Raise(x) | Action::Shove(x) => Some(*x),
        }
    }
    /// The record code this action is logged under when it applies cleanly.
    /// The rules engine may still relabel it while settling.
    pub fn code(&self) -> Code {
        match self {
            Action::Fold => Code::Fold,
            Action::Check => Code::Check,
            Action::Call(_) => Code::Call,
            Action::Bet(_) => Code::Bet,
            Action::Raise(_) => Code::Raise,
            Action::Shove(_) => Code::Allin,
        }
    }
    pub fn label(&self) -> &'static str {
        match self {
            Action::Fold => "fold",
            Action::Check => "check",
            Action::Call(_) => "call",
            Action::Bet(_) => "bet",
            Action::Raise(_) => "raise",
            Action::Shove(_) => "allin",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use colored::Colorize;
        match self {
            Action::Fold => write!(f, "{}", "FOLD".red()),
            Action::Check => write!(f, "{}", "CHECK".cyan()),
            Action::Call(x) => write!(f, "{}", format!("CALL  {}", x).yellow()),
            Action::Bet(x) => write!(f, "{}", format!("BET   {}", x).green()),
            Action::Raise(x) => write!(f, "{}", format!("RAISE {}", x).green()),
            Action::Shove(x) => write!(f, "{}", format!("SHOVE {}", x).magenta()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_only_where_chips_move() {
        assert!(Action::Fold.amount().is_none());
        assert!(Action::Check.amount().is_none());
        assert!(Action::Raise(60).amount() == Some(60));
    }
}
