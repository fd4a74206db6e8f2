//! Link-membership index: joint → links and link → joints.
//!
//! Link ids are canonical: members are sorted within a link, then links are
//! sorted by their member lists (name breaks exact ties). Repeated builds of the
//! same mechanism therefore number links identically regardless of input order.
//! Links with fewer than two members constrain nothing and are dropped.

use std::collections::{BTreeMap, BTreeSet};

use crate::mechanism::Mechanism;

/// Canonical link identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(pub usize);

#[derive(Clone, Debug, Default)]
pub struct LinkIndex {
    members: Vec<Vec<usize>>,
    joint_links: Vec<Vec<LinkId>>,
}

impl LinkIndex {
    /// Pure transformation of the mechanism's memberships.
    ///
    /// Expects a validated mechanism (every member id in range).
    pub fn build(mech: &Mechanism) -> Self {
        let n = mech.joint_count();
        let mut by_name: BTreeMap<&str, BTreeSet<usize>> = BTreeMap::new();
        for j in 0..n {
            for l in mech.links_of(j) {
                by_name.entry(l.as_str()).or_default().insert(j);
            }
        }
        let mut links: Vec<(Vec<usize>, &str)> = by_name
            .into_iter()
            .filter(|(_, m)| m.len() >= 2)
            .map(|(name, m)| (m.into_iter().collect(), name))
            .collect();
        links.sort();

        let mut idx = Self {
            members: Vec::with_capacity(links.len()),
            joint_links: vec![Vec::new(); n],
        };
        for (k, (members, _)) in links.into_iter().enumerate() {
            for &j in &members {
                // ids are visited in ascending order, so each list stays sorted
                idx.joint_links[j].push(LinkId(k));
            }
            idx.members.push(members);
        }
        idx
    }

    #[inline]
    pub fn joint_count(&self) -> usize {
        self.joint_links.len()
    }
    #[inline]
    pub fn link_count(&self) -> usize {
        self.members.len()
    }
    /// Sorted, distinct links of `joint`.
    #[inline]
    pub fn links_of(&self, joint: usize) -> &[LinkId] {
        &self.joint_links[joint]
    }
    /// Sorted members of `link`.
    #[inline]
    pub fn members(&self, link: LinkId) -> &[usize] {
        &self.members[link.0]
    }
}

/// True if two sorted link lists intersect.
pub(crate) fn sorted_intersect(a: &[LinkId], b: &[LinkId]) -> bool {
    let (mut i, mut k) = (0, 0);
    while i < a.len() && k < b.len() {
        match a[i].cmp(&b[k]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => k += 1,
            std::cmp::Ordering::Equal => return true,
        }
    }
    false
}
