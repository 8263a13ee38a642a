use super::card::Card;
use super::pile::Pile;

/// A seat's two pocket cards, or nothing when the scraper cannot see them.
/// Known pockets are canonical: the higher card always comes first.
#[derive(Debug, Default, Clone, Copy, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub enum Hole {
    #[default]
    Hidden,
    Cards(Card, Card),
}

impl Hole {
    pub fn cards(&self) -> Option<(Card, Card)> {
        match self {
            Self::Hidden => None,
            Self::Cards(hi, lo) => Some((*hi, *lo)),
        }
    }
    pub fn is_hidden(&self) -> bool {
        matches!(self, Self::Hidden)
    }
    pub fn pile(&self) -> Pile {
        match self {
            Self::Hidden => Pile::empty(),
            Self::Cards(hi, lo) => Pile::from(*hi).with(*lo),
        }
    }
    /// All 1326 distinct pockets, canonical order.
    pub fn every() -> impl Iterator<Item = Hole> {
        (0u8..52).flat_map(|lo| (lo + 1..52).map(move |hi| Self::pair(Card::from(hi), Card::from(lo))))
    }
    fn pair(a: Card, b: Card) -> Self {
        match a < b {
            true => Self::Cards(b, a),
            false => Self::Cards(a, b),
        }
    }
}

/// fallible on scraped input: exactly two distinct cards
impl TryFrom<(Card, Card)> for Hole {
    type Error = crate::Error;
    fn try_from((a, b): (Card, Card)) -> Result<Self, Self::Error> {
        match a == b {
            true => Err(crate::Error::cards(format!("pocket pairs up: {} {}", a, b))),
            false => Ok(Self::pair(a, b)),
        }
    }
}

/// str isomorphism, fallible on scraped input
/// "AsKd" -> Hole::Cards(As, Kd)
impl TryFrom<&str> for Hole {
    type Error = crate::Error;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let s = s.trim();
        match s.len() {
            4 => Self::try_from((Card::try_from(&s[..2])?, Card::try_from(&s[2..])?)),
            _ => Err(crate::Error::cards(format!("pocket str: {:?}", s))),
        }
    }
}

impl std::fmt::Display for Hole {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Hidden => write!(f, "????"),
            Self::Cards(hi, lo) => write!(f, "{}{}", hi, lo),
        }
    }
}

impl serde::Serialize for Hole {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Hidden => serializer.serialize_none(),
            Self::Cards(..) => serializer.collect_str(self),
        }
    }
}
impl<'de> serde::Deserialize<'de> for Hole {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(Self::Hidden),
            Some(s) => Hole::try_from(s.as_str()).map_err(serde::de::Error::custom),
        }
    }
}

impl crate::Arbitrary for Hole {
    fn random() -> Self {
        use rand::Rng;
        let ref mut rng = rand::rng();
        let a = rng.random_range(0..52) as u8;
        let b = (a + rng.random_range(1..52) as u8) % 52;
        Self::pair(Card::from(a), Card::from(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Arbitrary;

    #[test]
    fn canonical_high_card_first() {
        let hole = Hole::try_from("2cAs").unwrap();
        assert!(format!("{}", hole) == "As2c");
    }

    #[test]
    fn rejects_duplicates() {
        assert!(Hole::try_from("AsAs").is_err());
        assert!(Hole::try_from("As").is_err());
    }

    #[test]
    fn enumerates_all_pockets() {
        assert!(Hole::every().count() == crate::N_POCKETS);
        let mut seen = std::collections::HashSet::new();
        assert!(Hole::every().all(|h| seen.insert(h)));
    }

    #[test]
    fn random_is_canonical() {
        for _ in 0..100 {
            let hole = Hole::random();
            let (hi, lo) = hole.cards().unwrap();
            assert!(hi > lo);
        }
    }

    #[test]
    fn serde_round_trip() {
        let known = Hole::try_from("JhJd").unwrap();
        assert!(serde_json::to_string(&known).unwrap() == "\"JhJd\"");
        assert!(known == serde_json::from_str("\"JhJd\"").unwrap());
        assert!(Hole::Hidden == serde_json::from_str("null").unwrap());
    }
}
