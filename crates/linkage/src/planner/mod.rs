//! Resolution planner: decide which joint to place next and from what.
//!
//! Purpose
//! - Turn a validated `Mechanism` into an ordered list of PLAP/PLLP expressions
//!   that places every joint it can, and report the joints it cannot.
//!
//! Model
//! - Phase 1 emits one PLAP per driver, in input order, referencing the locked
//!   neighbor with the largest x (or the driver's base when it is locked).
//! - Phase 2 scans joints round-robin and emits a PLLP for every unresolved
//!   revolute joint with two locked neighbors. A stall counter, reset on every
//!   emitted expression, stops the scan once a full pass makes no progress.
//! - Sliders (`P`, `RP`) are never placed; they come back as unsupported.
//!
//! Layout
//! - `types.rs` (config and results) and `run.rs` (the two phases).

mod run;
mod types;

pub use run::{plan, plan_with_defaults};
pub use types::{Outcome, Plan, PlanStats, PlannerCfg, StallLimit, Unresolved, UnresolvedReason};

#[cfg(test)]
mod tests;
