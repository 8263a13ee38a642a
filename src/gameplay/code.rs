/// Single-letter action codes, as they appear in harvested hand records.
/// `Muck` never comes out of the rules engine; it shows up only in logs
/// written by other producers.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Code {
    SmallBlind,
    BigBlind,
    Fold,
    Check,
    Call,
    Bet,
    Raise,
    Allin,
    Muck,
}

impl Code {
    /// Passive to aggressive, the order strength narrowing walks in.
    pub const ESCALATION: [Self; 4] = [Self::Call, Self::Bet, Self::Raise, Self::Allin];
    /// Every code a frequency distribution can carry, fold first.
    pub const LADDER: [Self; 8] = [
        Self::Fold,
        Self::SmallBlind,
        Self::BigBlind,
        Self::Check,
        Self::Call,
        Self::Bet,
        Self::Raise,
        Self::Allin,
    ];
    /// Blind posts are forced, so they say nothing about a player.
    pub const fn is_blind(&self) -> bool {
        matches!(self, Self::SmallBlind | Self::BigBlind)
    }
    pub const fn is_voluntary(&self) -> bool {
        !self.is_blind()
    }
}

/// char isomorphism
impl From<Code> for char {
    fn from(code: Code) -> char {
        match code {
            Code::SmallBlind => 's',
            Code::BigBlind => 'l',
            Code::Fold => 'f',
            Code::Check => 'k',
            Code::Call => 'c',
            Code::Bet => 'b',
            Code::Raise => 'r',
            Code::Allin => 'a',
            Code::Muck => 'm',
        }
    }
}
impl TryFrom<char> for Code {
    type Error = crate::Error;
    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            's' => Ok(Code::SmallBlind),
            'l' => Ok(Code::BigBlind),
            'f' => Ok(Code::Fold),
            'k' => Ok(Code::Check),
            'c' => Ok(Code::Call),
            'b' => Ok(Code::Bet),
            'r' => Ok(Code::Raise),
            'a' => Ok(Code::Allin),
            'm' => Ok(Code::Muck),
            _ => Err(crate::Error::bad_action(format!("action code: {}", c))),
        }
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", char::from(*self))
    }
}

impl serde::Serialize for Code {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
impl<'de> serde::Deserialize<'de> for Code {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Code::try_from(c).map_err(serde::de::Error::custom),
            _ => Err(serde::de::Error::custom(format!("action code: {:?}", s))),
        }
    }
}

impl crate::Arbitrary for Code {
    fn random() -> Self {
        use rand::prelude::IndexedRandom;
        let ref mut rng = rand::rng();
        Self::LADDER.choose(rng).copied().expect("LADDER is empty")
    }
}
