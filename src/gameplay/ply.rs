use super::code::Code;
use crate::Probability;

/// One committed action on a seat's line, with the context it was taken in.
/// These accumulate per phase, feed the similarity query, and get harvested
/// into the action log when the hand ends.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Ply {
    pub code: Code,
    /// The actor was facing unmatched aggression, preflop limps excluded.
    #[serde(default)]
    pub aggro: bool,
    /// Bet size over total pot, bets and raises only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub btp: Option<Probability>,
    /// Price faced over total pot, recorded when facing aggression.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub odds: Option<Probability>,
    /// Live seats, the actor included, when the action went in.
    #[serde(default)]
    pub rivals: usize,
}

impl Ply {
    pub fn blind(code: Code, rivals: usize) -> Self {
        Self {
            code,
            aggro: false,
            btp: None,
            odds: None,
            rivals,
        }
    }
    pub fn act(code: Code, aggro: bool, odds: Option<Probability>, rivals: usize) -> Self {
        Self {
            code,
            aggro,
            btp: None,
            odds,
            rivals,
        }
    }
    pub fn btp(mut self, btp: Probability) -> Self {
        self.btp = Some(btp);
        self
    }
}

impl std::fmt::Display for Ply {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.aggro {
            true => write!(f, "{}", char::from(self.code).to_ascii_uppercase()),
            false => write!(f, "{}", char::from(self.code)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uppercase_under_aggression() {
        let calm = Ply::blind(Code::Call, 3);
        let heat = Ply::act(Code::Call, true, Some(0.3), 3);
        assert!(format!("{}", calm) == "c");
        assert!(format!("{}", heat) == "C");
    }

    #[test]
    fn serde_defaults_for_bare_codes() {
        let ply = serde_json::from_str::<Ply>("{\"code\":\"r\"}").unwrap();
        assert!(ply.code == Code::Raise);
        assert!(!ply.aggro);
        assert!(ply.btp.is_none());
    }
}
