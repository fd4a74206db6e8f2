//! Solving-order planner for planar linkages.
//!
//! Given joints, links, a ground seed, drivers and one reference pose, produce
//! the ordered PLAP/PLLP expressions that place every joint, or report which
//! joints cannot be placed. Numeric evaluation of the expressions is left to
//! the caller.
//!
//! Pipeline
//! - `mechanism` (validated input) → `index` (link membership) → `status`
//!   (lock table + aliases) → `planner` (uses `friends` and `orient`) → `expr`.

pub mod expr;
pub mod friends;
pub mod index;
pub mod joint;
pub mod mechanism;
pub mod orient;
pub mod planner;
pub mod rand;
pub mod status;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use nalgebra::Vector2 as Vec2;

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::expr::{check_order, render, AngleSym, Expr, LinkSym, OrderViolation, Point};
    pub use crate::joint::{Joint, JointKind, Node, VPoint};
    pub use crate::mechanism::{Driver, Mechanism, MechanismCfg, MechanismError};
    pub use crate::planner::{
        plan, plan_with_defaults, Outcome, Plan, PlannerCfg, StallLimit, Unresolved,
        UnresolvedReason,
    };
    pub use nalgebra::Vector2 as Vec2;
}
