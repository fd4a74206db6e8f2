//! Joint records handed over by the model layer.
//!
//! Two shapes exist upstream: a bare graph node (links + position) and the
//! richer `VPoint` (kind, slider angle, coordinates). Both go through the
//! [`Joint`] trait so `Mechanism::from_joints` accepts either.

use std::fmt;

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Joint type tag.
///
/// Only `R` is resolved by the planner; `P` and `RP` surface as unsupported.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JointKind {
    /// Revolute (pin) joint.
    #[default]
    R,
    /// Prismatic (slider) joint.
    P,
    /// Revolute-prismatic (pin in slot) joint.
    RP,
}

impl JointKind {
    /// Decode the numeric tag used in project files (`0`=R, `1`=P, `2`=RP).
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(JointKind::R),
            1 => Some(JointKind::P),
            2 => Some(JointKind::RP),
            _ => None,
        }
    }

    #[inline]
    pub fn is_revolute(self) -> bool {
        matches!(self, JointKind::R)
    }
}

impl fmt::Display for JointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JointKind::R => "R",
            JointKind::P => "P",
            JointKind::RP => "RP",
        })
    }
}

/// What the planner needs to know about one joint.
pub trait Joint {
    /// Names of the links this joint sits on (order is not significant).
    fn links(&self) -> &[String];
    /// Reference position, used only for orientation tie-breaks.
    fn position(&self) -> Vector2<f64>;
    fn kind(&self) -> JointKind {
        JointKind::R
    }
    /// Slider angle in degrees; meaningless for revolute joints.
    fn angle(&self) -> f64 {
        0.0
    }
    /// True if one of the links is named `link`.
    fn on_link(&self, link: &str) -> bool {
        self.links().iter().any(|l| l == link)
    }
}

/// Plain graph node: link memberships and a position, always revolute.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub links: Vec<String>,
    pub pos: Vector2<f64>,
}

impl Node {
    pub fn new<I, S>(links: I, x: f64, y: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            links: links.into_iter().map(Into::into).collect(),
            pos: Vector2::new(x, y),
        }
    }
}

impl Joint for Node {
    fn links(&self) -> &[String] {
        &self.links
    }
    fn position(&self) -> Vector2<f64> {
        self.pos
    }
}

/// Rich joint record: kind, slider angle (degrees, `P`/`RP` only) and coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct VPoint {
    pub links: Vec<String>,
    pub kind: JointKind,
    pub angle: f64,
    pub x: f64,
    pub y: f64,
}

impl VPoint {
    /// Revolute joint at `(x, y)`.
    pub fn r<I, S>(links: I, x: f64, y: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(links, JointKind::R, 0.0, x, y)
    }

    pub fn new<I, S>(links: I, kind: JointKind, angle: f64, x: f64, y: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            links: links.into_iter().map(Into::into).collect(),
            kind,
            angle,
            x,
            y,
        }
    }

    /// Point expression, e.g. `J[R, P[0.0, 0.0], L[ground, link_1]]`.
    ///
    /// Sliders carry their angle: `J[P, A[30.0], P[1.0, 2.0], L[link_2]]`.
    pub fn expr(&self) -> String {
        let links = self.links.join(", ");
        match self.kind {
            JointKind::R => format!("J[R, P[{:?}, {:?}], L[{}]]", self.x, self.y, links),
            kind => format!(
                "J[{}, A[{:?}], P[{:?}, {:?}], L[{}]]",
                kind, self.angle, self.x, self.y, links
            ),
        }
    }
}

impl Joint for VPoint {
    fn links(&self) -> &[String] {
        &self.links
    }
    fn position(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }
    fn kind(&self) -> JointKind {
        self.kind
    }
    fn angle(&self) -> f64 {
        self.angle
    }
}
