use super::card::Card;
use super::pile::Pile;

/// Community cards dealt so far. Holds zero, three, four, or five cards;
/// rollouts fill the remainder with random draws when equities are needed
/// before the river.
#[derive(Debug, Default, Clone, PartialEq, serde::Serialize)]
pub struct Board(Vec<Card>);

impl Board {
    pub fn empty() -> Self {
        Self(Vec::with_capacity(5))
    }
    pub fn cards(&self) -> &[Card] {
        &self.0
    }
    pub fn size(&self) -> usize {
        self.0.len()
    }
    pub fn pile(&self) -> Pile {
        self.0.iter().copied().collect()
    }
}

/// fallible on scraped input: street-shaped length, no duplicates
impl TryFrom<Vec<Card>> for Board {
    type Error = crate::Error;
    fn try_from(cards: Vec<Card>) -> Result<Self, Self::Error> {
        let mut pile = Pile::empty();
        for card in cards.iter().copied() {
            pile.admit(card)?;
        }
        match cards.len() {
            0 | 3 | 4 | 5 => Ok(Self(cards)),
            n => Err(crate::Error::cards(format!("board of {} cards", n))),
        }
    }
}

impl<'de> serde::Deserialize<'de> for Board {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let cards = Vec::<Card>::deserialize(deserializer)?;
        Board::try_from(cards).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for card in self.0.iter() {
            write!(f, "{}  ", card)?;
        }
        Ok(())
    }
}
