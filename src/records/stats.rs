use crate::Probability;
use crate::gameplay::code::Code;
use std::collections::BTreeMap;

/// A behavioral profile aggregated from similar harvested hands: how often
/// the player takes each action, and the bet-to-pot sizings they take it
/// with. Action frequencies are additively smoothed toward the flat prior
/// so thin samples do not produce extreme reads.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Stats {
    actions: BTreeMap<Code, Probability>,
    btps: BTreeMap<u8, Probability>,
}

impl Stats {
    /// The know-nothing prior: half fold, quarter call, quarter raise.
    pub fn flat() -> Self {
        Self {
            actions: BTreeMap::from([
                (Code::Fold, 0.50),
                (Code::Call, 0.25),
                (Code::Raise, 0.25),
            ]),
            btps: BTreeMap::from([(50, 0.50)]),
        }
    }

    /// Aggregate a sample of observed codes and sizings.
    pub fn aggregate(codes: &[Code], sizes: &[Probability]) -> Self {
        let n = codes.len() as f32;
        let alpha = crate::STATS_SMOOTHING;
        let actions = Code::LADDER
            .iter()
            .map(|code| {
                let count = codes.iter().filter(|c| *c == code).count() as f32;
                let prior = Self::prior(*code);
                (*code, (count + alpha * prior) / (n + alpha))
            })
            .filter(|(_, p)| *p > 0.)
            .collect();
        Self {
            actions,
            btps: Self::percentiles(sizes),
        }
    }

    fn prior(code: Code) -> Probability {
        match code {
            Code::Fold => 0.50,
            Code::Call => 0.25,
            Code::Raise => 0.25,
            _ => 0.,
        }
    }

    fn percentiles(sizes: &[Probability]) -> BTreeMap<u8, Probability> {
        let mut sizes = sizes
            .iter()
            .copied()
            .filter(|s| s.is_finite())
            .collect::<Vec<_>>();
        if sizes.is_empty() {
            return BTreeMap::from([(50, 0.50)]);
        }
        sizes.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        crate::STATS_PERCENTILES
            .iter()
            .map(|pct| {
                let rank = *pct as f32 / 100. * (sizes.len() - 1) as f32;
                let lo = rank.floor() as usize;
                let hi = rank.ceil() as usize;
                let mid = sizes[lo] + (sizes[hi] - sizes[lo]) * (rank - lo as f32);
                (*pct, (mid * 100.).round() / 100.)
            })
            .collect()
    }

    pub fn freq(&self, code: Code) -> Probability {
        self.actions.get(&code).copied().unwrap_or(0.)
    }
    /// Folding frequency decides how much of the ranking table a seat's
    /// range keeps. Unknown players fold half the time.
    pub fn fold(&self) -> Probability {
        self.actions.get(&Code::Fold).copied().unwrap_or(0.50)
    }
    pub fn actions(&self) -> &BTreeMap<Code, Probability> {
        &self.actions
    }
    pub fn btps(&self) -> &BTreeMap<u8, Probability> {
        &self.btps
    }

    /// Frequency breakpoints over the unit interval, passive codes first.
    /// Each present code owns a slab as wide as its floored frequency.
    fn rail(&self) -> Vec<(Probability, Code)> {
        let mut rail = Vec::new();
        let mut p = 0.;
        for code in Code::LADDER {
            if let Some(f) = self.actions.get(&code) {
                rail.push((p, code));
                p += f.max(crate::STATS_FLOOR);
            }
        }
        match rail.is_empty() {
            true => vec![(0., Code::Fold), (1., Code::Allin)],
            false => rail,
        }
    }

    /// How much of the weak end of a range an action cuts off: the start
    /// of the action's slab, or of the next more aggressive one present.
    pub fn tighten(&self, action: Code) -> Probability {
        let rail = self.rail();
        Code::ESCALATION
            .iter()
            .skip_while(|code| **code != action)
            .filter_map(|code| rail.iter().find(|(_, c)| c == code))
            .map(|(p, _)| *p)
            .next()
            .unwrap_or(0.50)
    }

    /// Twenty-bucket picture of the profile, five percent per character.
    /// The surviving strength tail prints uppercase.
    pub fn profile(&self, strength: Probability) -> String {
        let rail = self.rail();
        (0..20)
            .map(|i| i as f32 * 0.05)
            .map(|x| {
                let code = rail
                    .iter()
                    .rev()
                    .find(|(p, _)| *p <= x + 1e-6)
                    .map(|(_, c)| *c)
                    .unwrap_or(Code::Fold);
                match x + 1e-6 >= 1. - strength {
                    true => char::from(code).to_ascii_uppercase(),
                    false => char::from(code),
                }
            })
            .collect()
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::flat()
    }
}
