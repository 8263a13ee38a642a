use crate::Probability;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;

/// Bounded memo of heads-up rollout results. Keys are the bit sets of
/// (board, pocket, pocket) with the pockets in canonical order, so the
/// same matchup hits the same slot no matter which seat asked.
pub struct Cache {
    duels: Mutex<LruCache<(u64, u64, u64), (Probability, Probability)>>,
}

impl Cache {
    pub fn new() -> Self {
        let capacity =
            NonZeroUsize::new(crate::EQUITY_CACHE_SIZE).unwrap_or(NonZeroUsize::MIN);
        Self {
            duels: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Canonical key and whether the caller's order was flipped to get it.
    fn key(board: u64, a: u64, b: u64) -> ((u64, u64, u64), bool) {
        match a <= b {
            true => ((board, a, b), false),
            false => ((board, b, a), true),
        }
    }

    pub fn peek(&self, board: u64, a: u64, b: u64) -> Option<(Probability, Probability)> {
        let (key, flipped) = Self::key(board, a, b);
        let mut duels = self.duels.lock().ok()?;
        duels.get(&key).copied().map(|(x, y)| match flipped {
            true => (y, x),
            false => (x, y),
        })
    }

    pub fn keep(&self, board: u64, a: u64, b: u64, equities: (Probability, Probability)) {
        let (key, flipped) = Self::key(board, a, b);
        let stored = match flipped {
            true => (equities.1, equities.0),
            false => equities,
        };
        if let Ok(mut duels) = self.duels.lock() {
            duels.put(key, stored);
        }
    }

    pub fn len(&self) -> usize {
        self.duels.lock().map(|d| d.len()).unwrap_or(0)
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flipped_lookups_share_one_slot() {
        let cache = Cache::new();
        cache.keep(0b111, 0b01000, 0b10000, (0.8, 0.2));
        assert!(cache.len() == 1);
        assert!(cache.peek(0b111, 0b01000, 0b10000) == Some((0.8, 0.2)));
        assert!(cache.peek(0b111, 0b10000, 0b01000) == Some((0.2, 0.8)));
    }

    #[test]
    fn different_boards_do_not_collide() {
        let cache = Cache::new();
        cache.keep(1, 2, 4, (0.6, 0.4));
        assert!(cache.peek(8, 2, 4).is_none());
    }
}
