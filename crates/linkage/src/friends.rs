//! Neighbor resolver: joints that can serve as a geometric reference.
//!
//! A query reads an immutable status snapshot and returns a finite list in
//! ascending joint order. Locking a joint afterwards does not disturb a list
//! already returned.

use crate::index::{sorted_intersect, LinkId, LinkIndex};
use crate::status::StatusTable;

/// Lock-state filter for candidates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Reliability {
    /// Any candidate regardless of lock state.
    #[default]
    Any,
    /// Locked candidates only.
    Locked,
}

impl Reliability {
    #[inline]
    fn admits(self, locked: bool) -> bool {
        match self {
            Reliability::Any => true,
            Reliability::Locked => locked,
        }
    }
}

/// Links of `joint` widened by the links of its aliases, sorted and distinct.
pub fn widened_links(index: &LinkIndex, status: &StatusTable, joint: usize) -> Vec<LinkId> {
    let mut links = index.links_of(joint).to_vec();
    for &alias in status.aliases().aliases_of(joint) {
        links.extend_from_slice(index.links_of(alias));
    }
    links.sort_unstable();
    links.dedup();
    links
}

/// Candidates for `joint`, ascending, at most `limit` of them.
///
/// A candidate is a different, non-aliased joint admitted by `reliability`
/// that shares at least one (widened) link with `joint`.
pub fn friends(
    index: &LinkIndex,
    status: &StatusTable,
    joint: usize,
    reliability: Reliability,
    limit: usize,
) -> Vec<usize> {
    let mine = widened_links(index, status, joint);
    let mut out = Vec::new();
    if mine.is_empty() {
        return out;
    }
    for k in 0..index.joint_count() {
        if out.len() >= limit {
            break;
        }
        if k == joint || status.is_alias(k) || !reliability.admits(status.is_locked(k)) {
            continue;
        }
        let theirs = widened_links(index, status, k);
        if sorted_intersect(&mine, &theirs) {
            out.push(k);
        }
    }
    out
}

/// Every candidate for `joint`.
pub fn all_friends(
    index: &LinkIndex,
    status: &StatusTable,
    joint: usize,
    reliability: Reliability,
) -> Vec<usize> {
    friends(index, status, joint, reliability, usize::MAX)
}
