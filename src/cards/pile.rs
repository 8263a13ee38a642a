use super::card::Card;

/// An unordered set of cards in a single word. One bit per card in the
/// 52-card deck, so membership, union, and dealing exclusions are all
/// bitwise. Used to reject duplicate scraped cards and to track which
/// cards a rollout may still draw.
#[derive(Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Pile(u64);

impl Pile {
    pub fn empty() -> Self {
        Self(0)
    }
    pub fn size(&self) -> usize {
        self.0.count_ones() as usize
    }
    pub fn holds(&self, card: Card) -> bool {
        self.0 & u64::from(card) != 0
    }
    pub fn collides(&self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
    /// Union with a card already known to be absent.
    pub fn with(self, card: Card) -> Self {
        assert!(!self.holds(card));
        Self(self.0 | u64::from(card))
    }
    /// Fallible union for scraped inputs, where duplicates mean garbage.
    pub fn admit(&mut self, card: Card) -> Result<(), crate::Error> {
        match self.holds(card) {
            true => Err(crate::Error::cards(format!("duplicate card: {}", card))),
            false => Ok(self.0 |= u64::from(card)),
        }
    }
    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
    fn remove(&mut self, card: Card) {
        self.0 &= !u64::from(card);
    }
    const fn mask() -> u64 {
        0x000FFFFFFFFFFFFF
    }
}

/// we can empty a pile from low to high
/// by removing the lowest card until the pile is empty
impl Iterator for Pile {
    type Item = Card;
    fn next(&mut self) -> Option<Self::Item> {
        if self.size() == 0 {
            None
        } else {
            let card = Card::from(self.0.trailing_zeros() as u8);
            self.remove(card);
            Some(card)
        }
    }
}

/// u64 isomorphism
impl From<u64> for Pile {
    fn from(n: u64) -> Self {
        Self(n & Self::mask())
    }
}
impl From<Pile> for u64 {
    fn from(p: Pile) -> Self {
        p.0
    }
}

impl From<Card> for Pile {
    fn from(c: Card) -> Self {
        Self(u64::from(c))
    }
}
impl FromIterator<Card> for Pile {
    fn from_iter<T: IntoIterator<Item = Card>>(iter: T) -> Self {
        Self(iter.into_iter().map(u64::from).fold(0, |a, b| a | b))
    }
}

impl std::fmt::Display for Pile {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for card in *self {
            write!(f, "{} ", card)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admits_each_card_once() {
        let mut pile = Pile::empty();
        let card = Card::try_from("7d").unwrap();
        assert!(pile.admit(card).is_ok());
        assert!(pile.admit(card).is_err());
        assert!(pile.size() == 1);
    }

    #[test]
    fn drains_in_deck_order() {
        let cards = ["2c", "Ts", "Ah"]
            .iter()
            .map(|s| Card::try_from(*s).unwrap())
            .collect::<Vec<_>>();
        let pile = cards.iter().copied().collect::<Pile>();
        assert!(pile.collect::<Vec<_>>() == cards);
    }

    #[test]
    fn full_deck_has_52() {
        let pile = Card::deck().collect::<Pile>();
        assert!(pile.size() == 52);
        assert!(u64::from(pile) == 0x000FFFFFFFFFFFFF);
    }
}
