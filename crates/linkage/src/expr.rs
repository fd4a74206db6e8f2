//! PLAP / PLLP expressions and their symbols.
//!
//! Text form, one expression per item, `;`-joined:
//! `PLAP[P1,L0,a0](P0);PLLP[P1,L1,L2,P2](P3)`.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;

macro_rules! symbol {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub usize);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                s.collect_str(self)
            }
        }
    };
}

symbol!(
    /// Joint reference `P{id}`.
    Point,
    "P"
);
symbol!(
    /// Link-length unknown `L{n}`.
    LinkSym,
    "L"
);
symbol!(
    /// Angle unknown `a{n}`.
    AngleSym,
    "a"
);

/// One step of the solving order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "func")]
pub enum Expr {
    /// Driven joint placed from one reference, a length and an input angle.
    ///
    /// `driven` is the joint whose direction from `reference` is the zero of
    /// the input angle, read from the reference pose. It is not a dependency.
    #[serde(rename = "PLAP")]
    Plap {
        target: Point,
        link: LinkSym,
        angle: AngleSym,
        reference: Point,
        driven: Point,
    },
    /// Joint placed at a circle-circle intersection of two references.
    #[serde(rename = "PLLP")]
    Pllp {
        target: Point,
        link_a: LinkSym,
        link_b: LinkSym,
        ref_a: Point,
        ref_b: Point,
    },
}

impl Expr {
    pub fn target(&self) -> Point {
        match self {
            Expr::Plap { target, .. } | Expr::Pllp { target, .. } => *target,
        }
    }

    /// Points that must already be known when this expression runs.
    pub fn references(&self) -> Vec<Point> {
        match self {
            Expr::Plap { reference, .. } => vec![*reference],
            Expr::Pllp { ref_a, ref_b, .. } => vec![*ref_a, *ref_b],
        }
    }

    pub fn link_syms(&self) -> Vec<LinkSym> {
        match self {
            Expr::Plap { link, .. } => vec![*link],
            Expr::Pllp { link_a, link_b, .. } => vec![*link_a, *link_b],
        }
    }

    pub fn angle_sym(&self) -> Option<AngleSym> {
        match self {
            Expr::Plap { angle, .. } => Some(*angle),
            Expr::Pllp { .. } => None,
        }
    }

    pub fn func(&self) -> &'static str {
        match self {
            Expr::Plap { .. } => "PLAP",
            Expr::Pllp { .. } => "PLLP",
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Plap {
                target,
                link,
                angle,
                reference,
                driven,
            } => {
                if driven == reference {
                    write!(f, "PLAP[{reference},{link},{angle}]({target})")
                } else {
                    write!(f, "PLAP[{reference},{link},{angle},{driven}]({target})")
                }
            }
            Expr::Pllp {
                target,
                link_a,
                link_b,
                ref_a,
                ref_b,
            } => write!(f, "PLLP[{ref_a},{link_a},{link_b},{ref_b}]({target})"),
        }
    }
}

/// `;`-joined text form of an expression list.
pub fn render(exprs: &[Expr]) -> String {
    exprs
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(";")
}

/// Fresh-symbol counters; every call hands out a new number.
#[derive(Clone, Debug, Default)]
pub struct Symbols {
    links: usize,
    angles: usize,
}

impl Symbols {
    pub fn link(&mut self) -> LinkSym {
        let s = LinkSym(self.links);
        self.links += 1;
        s
    }
    pub fn angle(&mut self) -> AngleSym {
        let s = AngleSym(self.angles);
        self.angles += 1;
        s
    }
}

/// First defect found when replaying an expression list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderViolation {
    #[error("expression {step} uses {point} before it is known")]
    UnknownReference { step: usize, point: Point },
    #[error("expression {step} places {point}, which is already known")]
    AlreadyKnown { step: usize, point: Point },
    #[error("expression {step} reuses link symbol {sym}")]
    LinkReused { step: usize, sym: LinkSym },
    #[error("expression {step} reuses angle symbol {sym}")]
    AngleReused { step: usize, sym: AngleSym },
}

/// Replay `exprs` from the `seed` lock set and check dependency order and symbol uniqueness.
///
/// Returns the final known set on success.
pub fn check_order<I>(seed: I, exprs: &[Expr]) -> Result<BTreeSet<usize>, OrderViolation>
where
    I: IntoIterator<Item = usize>,
{
    let mut known: BTreeSet<usize> = seed.into_iter().collect();
    let mut links = BTreeSet::new();
    let mut angles = BTreeSet::new();
    for (step, e) in exprs.iter().enumerate() {
        if let Some(point) = e.references().into_iter().find(|p| !known.contains(&p.0)) {
            return Err(OrderViolation::UnknownReference { step, point });
        }
        for sym in e.link_syms() {
            if !links.insert(sym) {
                return Err(OrderViolation::LinkReused { step, sym });
            }
        }
        if let Some(sym) = e.angle_sym() {
            if !angles.insert(sym) {
                return Err(OrderViolation::AngleReused { step, sym });
            }
        }
        let point = e.target();
        if !known.insert(point.0) {
            return Err(OrderViolation::AlreadyKnown { step, point });
        }
    }
    Ok(known)
}
