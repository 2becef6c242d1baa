//! Synthetic match graphs, for tests and benchmarking the propagation.
use rand::rngs::SmallRng;
use rand::seq::IteratorRandom;
use rand::{Rng, SeedableRng};

use crate::base::EdgeTable;

pub trait EdgeGenerator {
    fn gen(&mut self) -> EdgeTable<u64>;
}

pub struct ErdosRenyiGenerator {
    pub rng: SmallRng,
    pub n: u64,
    pub p: f64,
}

impl ErdosRenyiGenerator {
    pub fn new(n: u64, p: f64) -> ErdosRenyiGenerator {
        ErdosRenyiGenerator {
            rng: SmallRng::from_entropy(),
            n,
            p,
        }
    }

    pub fn seeded(n: u64, p: f64, seed: u64) -> ErdosRenyiGenerator {
        ErdosRenyiGenerator {
            rng: SmallRng::seed_from_u64(seed),
            n,
            p,
        }
    }
}

impl EdgeGenerator for ErdosRenyiGenerator {
    fn gen(&mut self) -> EdgeTable<u64> {
        let mut edges = EdgeTable::default();
        for i in 0..self.n.saturating_sub(1) {
            for j in (i + 1)..self.n {
                if self.rng.gen::<f64>() < self.p {
                    edges.push(i, j);
                }
            }
        }
        edges
    }
}

pub struct FixedNumEdgesGenerator {
    pub rng: SmallRng,
    pub n: u64,
    pub m: usize,
}

impl FixedNumEdgesGenerator {
    pub fn seeded(n: u64, m: usize, seed: u64) -> FixedNumEdgesGenerator {
        FixedNumEdgesGenerator {
            rng: SmallRng::seed_from_u64(seed),
            n,
            m,
        }
    }
}

impl EdgeGenerator for FixedNumEdgesGenerator {
    fn gen(&mut self) -> EdgeTable<u64> {
        let n = self.n;
        let pairs = (0..n).flat_map(|i| ((i + 1)..n).map(move |j| (i, j)));
        pairs.choose_multiple(&mut self.rng, self.m).into_iter().collect()
    }
}

/// A single path `0 - 1 - ... - (n-1)`, the worst case for label propagation.
pub struct ChainGenerator {
    pub n: u64,
    pub reversed: bool,
}

impl ChainGenerator {
    pub fn new(n: u64) -> ChainGenerator {
        ChainGenerator { n, reversed: false }
    }

    /// Lists the edges from the far end, so the smallest code sits at the
    /// opposite end of the chain from node 0.
    pub fn reversed(n: u64) -> ChainGenerator {
        ChainGenerator { n, reversed: true }
    }
}

impl EdgeGenerator for ChainGenerator {
    fn gen(&mut self) -> EdgeTable<u64> {
        let mut edges: Vec<(u64, u64)> = (1..self.n).map(|i| (i - 1, i)).collect();
        if self.reversed {
            edges.reverse();
            edges.iter_mut().for_each(|e| *e = (e.1, e.0));
        }
        edges.into_iter().collect()
    }
}
