use super::board::Board;
use super::card::Card;
use super::hole::Hole;
use super::rollout::Rollout;
use crate::Probability;

/// Precomputed strength ordering over all 1326 pockets, strongest first.
/// Strength is heads-up Monte Carlo equity against one unknown pocket on an
/// unknown board. Built offline by the `rank` binary and loaded at advisor
/// startup; folding frequencies slice it into per-seat hand ranges.
#[derive(Clone)]
pub struct Rankings(Vec<(Hole, Probability)>);

impl Rankings {
    const MAGIC: &'static [u8] = b"PRT1";

    /// Roll out every pocket. Pockets are independent, so they fan out
    /// across threads with one deterministic rng stream each.
    pub fn grow(iterations: usize, seed: u64) -> Self {
        use rand::SeedableRng;
        use rayon::prelude::*;
        let mut table = Hole::every()
            .collect::<Vec<_>>()
            .into_par_iter()
            .enumerate()
            .map(|(i, hole)| {
                let ref mut rng = rand::rngs::SmallRng::seed_from_u64(seed ^ (i as u64) << 16);
                let board = Board::empty();
                let pockets = [hole, Hole::Hidden];
                let rollout = Rollout::new(&board, &pockets).expect("fresh deck");
                (hole, rollout.equities(rng, iterations)[0])
            })
            .collect::<Vec<_>>();
        table.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        Self(table)
    }

    /// The strongest share of pockets a seat continues with, given how
    /// often it folds. `cut(0)` keeps everything, `cut(1)` nothing.
    pub fn cut(&self, fold: Probability) -> &[(Hole, Probability)] {
        let fold = fold.clamp(0., 1.);
        let cutoff = (self.0.len() as f32 * (1. - fold)) as usize;
        &self.0[..cutoff]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn save(&self, path: &std::path::Path) -> std::io::Result<()> {
        use byteorder::BigEndian;
        use byteorder::WriteBytesExt;
        use std::io::Write;
        log::info!("{:<32}{}", "saving pocket rankings", path.display());
        let ref mut file = std::fs::File::create(path)?;
        file.write_all(Self::MAGIC)?;
        file.write_u32::<BigEndian>(self.0.len() as u32)?;
        for (hole, equity) in self.0.iter() {
            let (hi, lo) = hole.cards().ok_or(std::io::ErrorKind::InvalidData)?;
            file.write_u8(u8::from(hi))?;
            file.write_u8(u8::from(lo))?;
            file.write_f32::<BigEndian>(*equity)?;
        }
        Ok(())
    }

    pub fn load(path: &std::path::Path) -> std::io::Result<Self> {
        use byteorder::BigEndian;
        use byteorder::ReadBytesExt;
        use std::io::Read;
        log::info!("{:<32}{}", "loading pocket rankings", path.display());
        let ref mut file = std::fs::File::open(path)?;
        let mut magic = [0u8; 4];
        file.read_exact(&mut magic)?;
        if magic != Self::MAGIC {
            return Err(std::io::ErrorKind::InvalidData.into());
        }
        let count = file.read_u32::<BigEndian>()? as usize;
        let mut table = Vec::with_capacity(count);
        for _ in 0..count {
            let hi = file.read_u8()?;
            let lo = file.read_u8()?;
            if hi >= 52 || lo >= 52 {
                return Err(std::io::ErrorKind::InvalidData.into());
            }
            let hole = Hole::try_from((Card::from(hi), Card::from(lo)))
                .map_err(|_| std::io::ErrorKind::InvalidData)?;
            let equity = file.read_f32::<BigEndian>()?;
            table.push((hole, equity));
        }
        Ok(Self(table))
    }
}
