//! Mechanism files: project YAML (`mechanism` / `input` / `same`) or the same layout as JSON.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use linkage::joint::{JointKind, VPoint};
use linkage::mechanism::{Driver, Mechanism, MechanismCfg};

#[derive(Debug, Deserialize)]
pub struct MechanismFile {
    #[serde(default)]
    pub mechanism: Vec<PointAttr>,
    #[serde(default)]
    pub input: Vec<InputAttr>,
    /// Coincident joints: `alias: canonical`.
    #[serde(default)]
    pub same: BTreeMap<usize, usize>,
}

#[derive(Debug, Deserialize)]
pub struct PointAttr {
    #[serde(default)]
    pub links: Vec<String>,
    #[serde(rename = "type", default)]
    pub kind: u8,
    #[serde(default = "nan")]
    pub x: f64,
    #[serde(default = "nan")]
    pub y: f64,
    #[serde(default)]
    pub angle: f64,
}

fn nan() -> f64 {
    f64::NAN
}

/// One input pair; `base == drive` marks a slider offset input and carries no base hint.
#[derive(Debug, Deserialize)]
pub struct InputAttr {
    pub base: usize,
    pub drive: usize,
}

impl MechanismFile {
    pub fn parse(text: &str, json: bool) -> Result<Self> {
        if json {
            serde_json::from_str(text).context("parsing JSON mechanism")
        } else {
            serde_yaml::from_str(text).context("parsing YAML mechanism")
        }
    }

    pub fn read(path: &Path) -> Result<Self> {
        let text =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let json = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        Self::parse(&text, json).with_context(|| format!("in {}", path.display()))
    }

    pub fn points(&self) -> Result<Vec<VPoint>> {
        self.mechanism
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let kind = JointKind::from_code(p.kind)
                    .ok_or_else(|| anyhow!("joint {i}: unknown joint type {}", p.kind))?;
                Ok(VPoint::new(p.links.iter().cloned(), kind, p.angle, p.x, p.y))
            })
            .collect()
    }

    pub fn to_mechanism(&self, cfg: &MechanismCfg) -> Result<Mechanism> {
        let points = self.points()?;
        let mut mech = Mechanism::from_joints(&points, cfg);
        for i in &self.input {
            let driver = if i.base == i.drive {
                Driver::new(i.drive)
            } else {
                Driver::with_base(i.drive, i.base)
            };
            mech = mech.with_driver(driver);
        }
        for (&alias, &canonical) in &self.same {
            mech = mech.with_alias(alias, canonical);
        }
        Ok(mech)
    }
}
