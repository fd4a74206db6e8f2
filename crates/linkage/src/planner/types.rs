//! Planner configuration and result types.

use serde::Serialize;

use crate::expr::{render, Expr};
use crate::joint::JointKind;

/// When the propagation scan gives up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StallLimit {
    /// Stop after as many fruitless steps as there are joints (one full pass).
    #[default]
    JointCount,
    /// Stop after a fixed number of fruitless steps; for experiments only,
    /// values below the joint count can stop before a full pass.
    Fixed(usize),
}

impl StallLimit {
    #[inline]
    pub fn resolve(self, joint_count: usize) -> usize {
        match self {
            StallLimit::JointCount => joint_count,
            StallLimit::Fixed(n) => n,
        }
    }
}

/// Planner configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlannerCfg {
    pub stall_limit: StallLimit,
}

/// Why a joint was left without an expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum UnresolvedReason {
    /// Slider joints are not placed yet.
    UnsupportedKind { kind: JointKind },
    /// A driver had no locked neighbor to measure its input from.
    /// `nearest` is its first neighbor of any lock state, if one exists.
    NoLockedReference { nearest: Option<usize> },
    /// Never had two locked neighbors at once.
    UnderConstrained,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Unresolved {
    pub joint: usize,
    #[serde(flatten)]
    pub reason: UnresolvedReason,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Every joint is locked or aliased.
    Complete,
    /// Some joints are listed in `Plan::unresolved`.
    Partial,
}

/// Work counters for one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PlanStats {
    /// Propagation steps (joints visited by the scan).
    pub steps: usize,
    /// Neighbor queries issued across both phases.
    pub queries: usize,
}

/// Planner result: the expression order plus whatever could not be placed.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Plan {
    pub exprs: Vec<Expr>,
    pub unresolved: Vec<Unresolved>,
    pub outcome: Outcome,
    pub stats: PlanStats,
}

impl Plan {
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.outcome == Outcome::Complete
    }

    pub fn unresolved_joints(&self) -> Vec<usize> {
        self.unresolved.iter().map(|u| u.joint).collect()
    }

    /// `;`-joined text form of the expressions.
    pub fn render(&self) -> String {
        render(&self.exprs)
    }

    pub fn count(&self, func: &str) -> usize {
        self.exprs.iter().filter(|e| e.func() == func).count()
    }
}
