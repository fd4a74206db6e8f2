//! Planner input: joints, ground seed, drivers and coincident-joint aliases.
//!
//! A `Mechanism` is assembled freely and checked once by [`Mechanism::validate`];
//! `planner::plan` refuses to start on malformed input.

use std::collections::{BTreeMap, BTreeSet};

use nalgebra::Vector2;
use thiserror::Error;

use crate::joint::{Joint, JointKind, VPoint};

/// Input-side configuration.
#[derive(Clone, Debug)]
pub struct MechanismCfg {
    /// Joints on a link with this name start locked.
    pub ground_link: String,
}

impl Default for MechanismCfg {
    fn default() -> Self {
        Self {
            ground_link: "ground".to_string(),
        }
    }
}

/// A driven joint, optionally paired with the base joint its input angle is measured from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Driver {
    pub joint: usize,
    pub base: Option<usize>,
}

impl Driver {
    pub fn new(joint: usize) -> Self {
        Self { joint, base: None }
    }
    pub fn with_base(joint: usize, base: usize) -> Self {
        Self {
            joint,
            base: Some(base),
        }
    }
}

/// Caller-contract violations detected before planning.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MechanismError {
    #[error("link {link:?} references joint {joint}, but the mechanism has {count} joints")]
    LinkMemberOutOfRange {
        link: String,
        joint: usize,
        count: usize,
    },
    #[error("expected {expected} positions, got {got}")]
    PositionCount { expected: usize, got: usize },
    #[error("joint {joint} has a non-finite position")]
    NonFinitePosition { joint: usize },
    #[error("grounded joint {joint} is out of range (count {count})")]
    GroundedOutOfRange { joint: usize, count: usize },
    #[error("driver {joint} is out of range (count {count})")]
    DriverOutOfRange { joint: usize, count: usize },
    #[error("driver {joint} is grounded")]
    DriverGrounded { joint: usize },
    #[error("driver {joint} is an alias of another joint")]
    DriverAliased { joint: usize },
    #[error("driver {joint} is listed more than once")]
    DuplicateDriver { joint: usize },
    #[error("base {base} of driver {joint} is out of range")]
    DriverBaseOutOfRange { joint: usize, base: usize },
    #[error("driver {joint} uses itself as base")]
    DriverSelfBase { joint: usize },
    #[error("base {base} and driver {joint} do not share a link")]
    DriverBaseNotAdjacent { joint: usize, base: usize },
    #[error("alias {alias} -> {canonical} is out of range (count {count})")]
    AliasOutOfRange {
        alias: usize,
        canonical: usize,
        count: usize,
    },
    #[error("joint {joint} is aliased to itself")]
    SelfAlias { joint: usize },
    #[error("alias {alias} points at {canonical}, which is itself an alias")]
    AliasChain { alias: usize, canonical: usize },
    #[error("grounded joint {alias} is an alias of {canonical}, which is not grounded")]
    GroundedAlias { alias: usize, canonical: usize },
}

/// Planner input.
///
/// Joint ids are positions in the joint list, `0..joint_count()`.
#[derive(Clone, Debug, Default)]
pub struct Mechanism {
    pub(crate) links: Vec<Vec<String>>,
    pub(crate) kinds: Vec<JointKind>,
    pub(crate) angles: Vec<f64>,
    pub(crate) positions: Vec<Vector2<f64>>,
    pub(crate) grounded: BTreeSet<usize>,
    pub(crate) drivers: Vec<Driver>,
    pub(crate) same: BTreeMap<usize, usize>,
    /// Link-side references that could not be attached to a joint (reported by `validate`).
    pub(crate) stray: Vec<(String, usize)>,
}

impl Mechanism {
    /// Build from joint records; joints on `cfg.ground_link` start locked.
    pub fn from_joints<J: Joint>(joints: &[J], cfg: &MechanismCfg) -> Self {
        let mut mech = Self::default();
        for (i, j) in joints.iter().enumerate() {
            if j.on_link(&cfg.ground_link) {
                mech.grounded.insert(i);
            }
            mech.links.push(j.links().to_vec());
            mech.kinds.push(j.kind());
            mech.angles.push(j.angle());
            mech.positions.push(j.position());
        }
        mech
    }

    /// Build from link-side membership lists; every joint is revolute.
    ///
    /// Members outside `0..joint_count` are kept aside and rejected by `validate`.
    pub fn from_links<S: AsRef<str>>(
        joint_count: usize,
        links: &[(S, Vec<usize>)],
        positions: Vec<Vector2<f64>>,
    ) -> Self {
        let mut mech = Self {
            links: vec![Vec::new(); joint_count],
            kinds: vec![JointKind::R; joint_count],
            angles: vec![0.0; joint_count],
            positions,
            ..Self::default()
        };
        for (name, members) in links {
            let name = name.as_ref();
            for &m in members {
                match mech.links.get_mut(m) {
                    Some(ls) => {
                        if !ls.iter().any(|l| l == name) {
                            ls.push(name.to_string());
                        }
                    }
                    None => mech.stray.push((name.to_string(), m)),
                }
            }
        }
        mech
    }

    pub fn with_grounded<I: IntoIterator<Item = usize>>(mut self, joints: I) -> Self {
        self.grounded.extend(joints);
        self
    }

    pub fn with_driver(mut self, driver: Driver) -> Self {
        self.drivers.push(driver);
        self
    }

    /// Append plain drivers (no base hint) in order.
    pub fn with_drivers<I: IntoIterator<Item = usize>>(mut self, joints: I) -> Self {
        self.drivers.extend(joints.into_iter().map(Driver::new));
        self
    }

    /// Declare `alias` coincident with `canonical`.
    pub fn with_alias(mut self, alias: usize, canonical: usize) -> Self {
        self.same.insert(alias, canonical);
        self
    }

    pub fn with_kind(mut self, joint: usize, kind: JointKind) -> Self {
        if let Some(k) = self.kinds.get_mut(joint) {
            *k = kind;
        }
        self
    }

    #[inline]
    pub fn joint_count(&self) -> usize {
        self.links.len()
    }
    #[inline]
    pub fn kind(&self, joint: usize) -> JointKind {
        self.kinds[joint]
    }
    #[inline]
    pub fn position(&self, joint: usize) -> Vector2<f64> {
        self.positions[joint]
    }
    pub fn links_of(&self, joint: usize) -> &[String] {
        &self.links[joint]
    }
    pub fn grounded(&self) -> &BTreeSet<usize> {
        &self.grounded
    }
    pub fn drivers(&self) -> &[Driver] {
        &self.drivers
    }
    pub fn same(&self) -> &BTreeMap<usize, usize> {
        &self.same
    }

    /// Check every caller contract; first violation wins.
    pub fn validate(&self) -> Result<(), MechanismError> {
        let count = self.joint_count();
        if let Some((link, joint)) = self.stray.first() {
            return Err(MechanismError::LinkMemberOutOfRange {
                link: link.clone(),
                joint: *joint,
                count,
            });
        }
        if self.positions.len() != count {
            return Err(MechanismError::PositionCount {
                expected: count,
                got: self.positions.len(),
            });
        }
        if let Some(joint) = self
            .positions
            .iter()
            .position(|p| !(p.x.is_finite() && p.y.is_finite()))
        {
            return Err(MechanismError::NonFinitePosition { joint });
        }
        if let Some(&joint) = self.grounded.iter().find(|&&g| g >= count) {
            return Err(MechanismError::GroundedOutOfRange { joint, count });
        }
        let mut seen = BTreeSet::new();
        for d in &self.drivers {
            if d.joint >= count {
                return Err(MechanismError::DriverOutOfRange {
                    joint: d.joint,
                    count,
                });
            }
            if self.grounded.contains(&d.joint) {
                return Err(MechanismError::DriverGrounded { joint: d.joint });
            }
            if self.same.contains_key(&d.joint) {
                return Err(MechanismError::DriverAliased { joint: d.joint });
            }
            if !seen.insert(d.joint) {
                return Err(MechanismError::DuplicateDriver { joint: d.joint });
            }
            if let Some(base) = d.base {
                if base >= count {
                    return Err(MechanismError::DriverBaseOutOfRange {
                        joint: d.joint,
                        base,
                    });
                }
                if base == d.joint {
                    return Err(MechanismError::DriverSelfBase { joint: d.joint });
                }
                let shared = self.links[d.joint]
                    .iter()
                    .any(|l| self.links[base].contains(l));
                if !shared {
                    return Err(MechanismError::DriverBaseNotAdjacent {
                        joint: d.joint,
                        base,
                    });
                }
            }
        }
        for (&alias, &canonical) in &self.same {
            if alias >= count || canonical >= count {
                return Err(MechanismError::AliasOutOfRange {
                    alias,
                    canonical,
                    count,
                });
            }
            if alias == canonical {
                return Err(MechanismError::SelfAlias { joint: alias });
            }
            if self.same.contains_key(&canonical) {
                return Err(MechanismError::AliasChain { alias, canonical });
            }
            // aliases carry no lock state, so the ground lock must sit on the canonical joint
            if self.grounded.contains(&alias) && !self.grounded.contains(&canonical) {
                return Err(MechanismError::GroundedAlias { alias, canonical });
            }
        }
        Ok(())
    }

    /// Mechanism expression `M[J[..], J[..], ...]` in joint order.
    pub fn expr(&self) -> String {
        let joints: Vec<String> = (0..self.joint_count())
            .map(|i| {
                let p = self.positions.get(i).copied().unwrap_or_else(Vector2::zeros);
                VPoint::new(
                    self.links[i].iter().cloned(),
                    self.kinds[i],
                    self.angles[i],
                    p.x,
                    p.y,
                )
                .expr()
            })
            .collect();
        format!("M[{}]", joints.join(", "))
    }
}
