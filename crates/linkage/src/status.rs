//! Per-run lock state and the coincident-joint ("same") map.

use std::collections::BTreeMap;

use crate::mechanism::Mechanism;

/// Alias map `alias → canonical` plus its inverse, built once per run.
///
/// Aliases widen the link search of their canonical joint; they never carry
/// lock state of their own.
#[derive(Clone, Debug, Default)]
pub struct Aliases {
    same: BTreeMap<usize, usize>,
    inverse: BTreeMap<usize, Vec<usize>>,
}

impl Aliases {
    pub fn new(same: &BTreeMap<usize, usize>) -> Self {
        let mut inverse: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (&alias, &canonical) in same {
            // BTreeMap iteration keeps each alias list ascending
            inverse.entry(canonical).or_default().push(alias);
        }
        Self {
            same: same.clone(),
            inverse,
        }
    }

    #[inline]
    pub fn is_alias(&self, joint: usize) -> bool {
        self.same.contains_key(&joint)
    }

    /// Canonical representative (the joint itself when not aliased).
    #[inline]
    pub fn canonical(&self, joint: usize) -> usize {
        self.same.get(&joint).copied().unwrap_or(joint)
    }

    /// Aliases pointing at `joint`, ascending.
    pub fn aliases_of(&self, joint: usize) -> &[usize] {
        self.inverse.get(&joint).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.same.len()
    }

    pub fn is_empty(&self) -> bool {
        self.same.is_empty()
    }
}

/// Lock table: `true` once a joint's position is considered known.
#[derive(Clone, Debug)]
pub struct StatusTable {
    locked: Vec<bool>,
    aliases: Aliases,
}

impl StatusTable {
    /// Everything unlocked except the grounded joints.
    pub fn seed(mech: &Mechanism) -> Self {
        let mut locked = vec![false; mech.joint_count()];
        for &g in mech.grounded() {
            locked[g] = true;
        }
        Self {
            locked,
            aliases: Aliases::new(mech.same()),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.locked.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.locked.is_empty()
    }

    /// Lock state, read through the canonical joint for aliases.
    #[inline]
    pub fn is_locked(&self, joint: usize) -> bool {
        self.locked[self.aliases.canonical(joint)]
    }

    #[inline]
    pub fn is_alias(&self, joint: usize) -> bool {
        self.aliases.is_alias(joint)
    }

    /// Locked or aliased: nothing left to plan for this joint.
    #[inline]
    pub fn is_settled(&self, joint: usize) -> bool {
        self.is_alias(joint) || self.locked[joint]
    }

    pub fn lock(&mut self, joint: usize) {
        self.locked[joint] = true;
    }

    pub fn all_settled(&self) -> bool {
        (0..self.len()).all(|j| self.is_settled(j))
    }

    /// Joints neither locked nor aliased, ascending.
    pub fn unsettled(&self) -> Vec<usize> {
        (0..self.len()).filter(|&j| !self.is_settled(j)).collect()
    }

    pub fn aliases(&self) -> &Aliases {
        &self.aliases
    }
}
