//! Random planar linkages (dyad chains + replay tokens).
//!
//! Purpose
//! - Deterministic sampler for mechanisms that are fully resolvable by
//!   construction; used by property tests and benchmarks.
//!
//! Model
//! - Two grounded joints on the `ground` link, `drivers` cranks each hinged to
//!   one of them, then every further joint is attached to two distinct earlier
//!   joints by two fresh binary links (an RR dyad).
//! - Positions are uniform in `[-extent, extent]²`.
//! - With `aliases > 0`, that many dyad joints get a coincident twin that is an
//!   alias of it. The twin carries the joint's second dyad link, and later dyads
//!   pick the twin or the joint at random, so placing them needs alias widening.
//! - With `shuffle`, joint ids are permuted afterwards so scan order no longer
//!   follows construction order.
//! - Determinism uses a replay token `(seed, index)` mixed into a single RNG.

use nalgebra::Vector2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::mechanism::{Driver, Mechanism};

/// Joint count distribution.
#[derive(Clone, Copy, Debug)]
pub enum JointCount {
    Fixed(usize),
    Uniform { min: usize, max: usize },
}

impl JointCount {
    fn sample<R: Rng>(&self, rng: &mut R, floor: usize) -> usize {
        match *self {
            JointCount::Fixed(n) => n.max(floor),
            JointCount::Uniform { min, max } => {
                let lo = min.max(floor);
                let hi = max.max(lo);
                rng.gen_range(lo..=hi)
            }
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ChainCfg {
    pub joints: JointCount,
    pub drivers: usize,
    /// Dyad joints to split into coincident alias pairs (capped by the dyad count).
    pub aliases: usize,
    pub extent: f64,
    pub shuffle: bool,
}

impl Default for ChainCfg {
    fn default() -> Self {
        Self {
            joints: JointCount::Uniform { min: 4, max: 16 },
            drivers: 1,
            aliases: 0,
            extent: 10.0,
            shuffle: true,
        }
    }
}

/// Replay token to make draws reproducible and indexable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayToken {
    pub seed: u64,
    pub index: u64,
}

impl ReplayToken {
    #[inline]
    fn to_std_rng(self) -> StdRng {
        fn mix(mut x: u64) -> u64 {
            x ^= x >> 30;
            x = x.wrapping_mul(0xbf58476d1ce4e5b9);
            x ^= x >> 27;
            x = x.wrapping_mul(0x94d049bb133111eb);
            x ^ (x >> 31)
        }
        let k = mix(self.seed ^ mix(self.index.wrapping_add(0x9e3779b97f4a7c15)));
        StdRng::seed_from_u64(k)
    }
}

/// Draw a resolvable dyad chain with `2` grounded joints and `cfg.drivers` cranks.
///
/// The joint count includes alias twins.
pub fn draw_dyad_chain(cfg: ChainCfg, tok: ReplayToken) -> Mechanism {
    let mut rng = tok.to_std_rng();
    let first_dyad = 2 + cfg.drivers;
    let n = cfg.joints.sample(&mut rng, first_dyad);
    let extent = cfg.extent.abs().max(1e-6);

    // twin of split[s] is joint n + s
    let mut split: Vec<usize> = Vec::new();
    if cfg.aliases > 0 {
        split = (first_dyad..n).collect();
        split.shuffle(&mut rng);
        split.truncate(cfg.aliases);
        split.sort_unstable();
    }
    let twin = |k: usize| split.binary_search(&k).ok().map(|s| n + s);
    let total = n + split.len();

    let mut links: Vec<(String, Vec<usize>)> = vec![("ground".to_string(), vec![0, 1])];
    for d in 0..cfg.drivers {
        links.push((format!("crank_{d}"), vec![d % 2, 2 + d]));
    }
    for k in first_dyad..n {
        let i = rng.gen_range(0..k);
        let mut j = rng.gen_range(0..k - 1);
        if j >= i {
            j += 1;
        }
        let mut end = |p: usize| match twin(p) {
            Some(t) if rng.gen_bool(0.5) => t,
            _ => p,
        };
        let (end_i, end_j) = (end(i), end(j));
        links.push((format!("dyad_{k}_a"), vec![end_i, k]));
        links.push((format!("dyad_{k}_b"), vec![end_j, twin(k).unwrap_or(k)]));
    }
    let mut positions: Vec<Vector2<f64>> = (0..n)
        .map(|_| {
            Vector2::new(
                rng.gen_range(-extent..=extent),
                rng.gen_range(-extent..=extent),
            )
        })
        .collect();
    for &k in &split {
        let p = positions[k];
        positions.push(p);
    }

    let mut perm: Vec<usize> = (0..total).collect();
    if cfg.shuffle {
        perm.shuffle(&mut rng);
    }
    let links: Vec<(String, Vec<usize>)> = links
        .into_iter()
        .map(|(name, members)| (name, members.into_iter().map(|m| perm[m]).collect()))
        .collect();
    let mut relabeled = vec![Vector2::zeros(); total];
    for (old, p) in positions.into_iter().enumerate() {
        relabeled[perm[old]] = p;
    }

    let mut mech =
        Mechanism::from_links(total, &links, relabeled).with_grounded([perm[0], perm[1]]);
    for d in 0..cfg.drivers {
        mech = mech.with_driver(Driver::with_base(perm[2 + d], perm[d % 2]));
    }
    for (s, &k) in split.iter().enumerate() {
        mech = mech.with_alias(perm[n + s], perm[k]);
    }
    mech
}
