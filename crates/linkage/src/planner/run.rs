//! Driver phase and round-robin propagation phase.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::expr::{Expr, Point, Symbols};
use crate::friends::{friends, Reliability};
use crate::index::LinkIndex;
use crate::mechanism::{Driver, Mechanism, MechanismError};
use crate::orient::orient_pair;
use crate::status::StatusTable;

use super::types::{Outcome, Plan, PlanStats, PlannerCfg, Unresolved, UnresolvedReason};

/// Validate `mech` and plan its solving order.
///
/// Only malformed input is an error; an under-constrained mechanism yields a
/// `Partial` plan listing the joints that could not be placed.
pub fn plan(mech: &Mechanism, cfg: PlannerCfg) -> Result<Plan, MechanismError> {
    mech.validate()?;
    Ok(Planner::new(mech, cfg).run())
}

/// Convenience: plan with the default stall limit.
pub fn plan_with_defaults(mech: &Mechanism) -> Result<Plan, MechanismError> {
    plan(mech, PlannerCfg::default())
}

/// Per-run state. Everything here is dropped once the plan is returned.
struct Planner<'a> {
    mech: &'a Mechanism,
    cfg: PlannerCfg,
    index: LinkIndex,
    status: StatusTable,
    symbols: Symbols,
    exprs: Vec<Expr>,
    /// Joints the propagation scan must pass over, with the reason.
    blocked: BTreeMap<usize, UnresolvedReason>,
    remaining: usize,
    stats: PlanStats,
}

impl<'a> Planner<'a> {
    fn new(mech: &'a Mechanism, cfg: PlannerCfg) -> Self {
        let index = LinkIndex::build(mech);
        let status = StatusTable::seed(mech);
        let remaining = status.unsettled().len();
        let blocked = status
            .unsettled()
            .into_iter()
            .filter(|&j| !mech.kind(j).is_revolute())
            .map(|j| {
                (
                    j,
                    UnresolvedReason::UnsupportedKind {
                        kind: mech.kind(j),
                    },
                )
            })
            .collect();
        Self {
            mech,
            cfg,
            index,
            status,
            symbols: Symbols::default(),
            exprs: Vec::new(),
            blocked,
            remaining,
            stats: PlanStats::default(),
        }
    }

    fn run(mut self) -> Plan {
        let mech = self.mech;
        for &driver in mech.drivers() {
            self.drive(driver);
        }
        self.propagate();
        self.finish()
    }

    fn query(&mut self, joint: usize, reliability: Reliability, limit: usize) -> Vec<usize> {
        self.stats.queries += 1;
        friends(&self.index, &self.status, joint, reliability, limit)
    }

    fn lock(&mut self, joint: usize, expr: Expr) {
        debug!(%expr, "emit");
        self.exprs.push(expr);
        self.status.lock(joint);
        self.remaining -= 1;
    }

    /// Phase 1: one PLAP per driver.
    ///
    /// The first neighbor of any lock state fixes the input angle's zero
    /// direction; the x-descending locked neighbor (or the base hint) is the
    /// reference.
    fn drive(&mut self, driver: Driver) {
        let joint = driver.joint;
        if self.blocked.contains_key(&joint) {
            debug!(joint, kind = %self.mech.kind(joint), "driver kind not supported");
            return;
        }
        let nearest = self.query(joint, Reliability::Any, 1).first().copied();
        let mut reliable = self.query(joint, Reliability::Locked, usize::MAX);
        // stable: equal x keeps ascending id
        reliable.sort_by(|&a, &b| {
            self.mech
                .position(b)
                .x
                .total_cmp(&self.mech.position(a).x)
        });
        let reference = match driver.base {
            Some(base) if reliable.contains(&base) => Some(base),
            Some(base) => {
                warn!(joint, base, "driver base is not locked; using the x-descending reference");
                reliable.first().copied()
            }
            None => reliable.first().copied(),
        };
        let Some(reference) = reference else {
            debug!(joint, ?nearest, "driver has no locked reference");
            self.blocked
                .insert(joint, UnresolvedReason::NoLockedReference { nearest });
            return;
        };
        let expr = Expr::Plap {
            target: Point(joint),
            link: self.symbols.link(),
            angle: self.symbols.angle(),
            reference: Point(reference),
            driven: Point(nearest.unwrap_or(reference)),
        };
        self.lock(joint, expr);
    }

    /// Phase 2: round-robin PLLP placement until done or stalled.
    fn propagate(&mut self) {
        let n = self.status.len();
        let limit = self.cfg.stall_limit.resolve(n);
        let mut cursor = 0;
        let mut stall = 0;
        while self.remaining > 0 && stall < limit {
            let joint = cursor;
            cursor = (cursor + 1) % n;
            self.stats.steps += 1;
            if self.status.is_settled(joint) || self.blocked.contains_key(&joint) {
                stall += 1;
                continue;
            }
            let refs = self.query(joint, Reliability::Locked, 2);
            let &[a, b] = refs.as_slice() else {
                stall += 1;
                debug!(joint, found = refs.len(), stall, "not enough locked neighbors");
                continue;
            };
            let (ref_a, ref_b) = orient_pair(a, b, joint, |i| self.mech.position(i));
            let expr = Expr::Pllp {
                target: Point(joint),
                link_a: self.symbols.link(),
                link_b: self.symbols.link(),
                ref_a: Point(ref_a),
                ref_b: Point(ref_b),
            };
            self.lock(joint, expr);
            stall = 0;
        }
    }

    fn finish(self) -> Plan {
        let unresolved: Vec<Unresolved> = self
            .status
            .unsettled()
            .into_iter()
            .map(|joint| Unresolved {
                joint,
                reason: self
                    .blocked
                    .get(&joint)
                    .copied()
                    .unwrap_or(UnresolvedReason::UnderConstrained),
            })
            .collect();
        let outcome = if unresolved.is_empty() {
            Outcome::Complete
        } else {
            Outcome::Partial
        };
        info!(
            joints = self.status.len(),
            exprs = self.exprs.len(),
            unresolved = unresolved.len(),
            steps = self.stats.steps,
            ?outcome,
            "plan"
        );
        Plan {
            exprs: self.exprs,
            unresolved,
            outcome,
            stats: self.stats,
        }
    }
}
