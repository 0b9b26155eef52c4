use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::config::{CodeDomain, LabelConfig};
use crate::error::{LabelError, LabelResult};

/// An anatomical label: canonical name plus the integer tag written into
/// images and surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    pub code: i32,
}

impl Label {
    pub fn new(name: impl Into<String>, code: i32) -> Self {
        Self {
            name: name.into(),
            code,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    La,
    Ra,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::La => "LA",
            Region::Ra => "RA",
        }
    }
}

impl FromStr for Region {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LA" => Ok(Region::La),
            "RA" => Ok(Region::Ra),
            _ => Err(LabelError::UnknownRegion {
                region: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const LA_DEFAULTS: [(&str, i32); 6] = [
    ("MV", 1),
    ("LAA", 19),
    ("LSPV", 11),
    ("LIPV", 13),
    ("RSPV", 15),
    ("RIPV", 17),
];

const RA_DEFAULTS: [(&str, i32); 5] = [("RA", 1), ("RAA", 2), ("SVC", 6), ("IVC", 7), ("CS", 5)];

// Tags produced by the automatic segmentation before veins are identified.
const LA_NAIVE: [(&str, i32); 5] = [
    ("LSPV", 2),
    ("LIPV", 3),
    ("RSPV", 4),
    ("RIPV", 5),
    ("LAA", 6),
];

const GUIDE_POINTS: [(&str, &str, i32); 5] = [
    ("la.lvapex.vtx", "LA_APEX", 11),
    ("la.rvsept_pt.vtx", "LA_SEPTUM", 13),
    ("ra.lvapex.vtx", "RA_APEX", 15),
    ("ra.rvsept_pt.vtx", "RA_SEPTUM", 17),
    ("raa_apex.txt", "RAA_APEX", 19),
];

/// Fixed label list of one atrial region, with user overrides applied.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelRegistry {
    region: Region,
    labels: Vec<Label>,
    naive: Vec<Label>,
    domain: CodeDomain,
}

/// Label list for "LA" or "RA" (case-insensitive), in slot order.
pub fn load_labels(region: &str) -> LabelResult<Vec<Label>> {
    Ok(LabelRegistry::for_region(region)?.labels)
}

impl LabelRegistry {
    pub fn new(region: Region) -> Self {
        let (defaults, naive): (&[(&str, i32)], &[(&str, i32)]) = match region {
            Region::La => (&LA_DEFAULTS[..], &LA_NAIVE[..]),
            Region::Ra => (&RA_DEFAULTS[..], &[][..]),
        };
        Self {
            region,
            labels: defaults.iter().map(|(n, c)| Label::new(*n, *c)).collect(),
            naive: naive.iter().map(|(n, c)| Label::new(*n, *c)).collect(),
            domain: CodeDomain::default(),
        }
    }

    pub fn for_region(region: &str) -> LabelResult<Self> {
        Ok(Self::new(region.parse()?))
    }

    /// Slot names and labels for four-chamber apex/septum guide points.
    pub fn four_chamber_guide_points() -> (Vec<String>, Vec<Label>) {
        GUIDE_POINTS
            .iter()
            .map(|(file, name, code)| (file.to_string(), Label::new(*name, *code)))
            .unzip()
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn names(&self) -> Vec<String> {
        self.labels.iter().map(|l| l.name.clone()).collect()
    }

    pub fn codes(&self) -> Vec<i32> {
        self.labels.iter().map(|l| l.code).collect()
    }

    pub fn domain(&self) -> CodeDomain {
        self.domain
    }

    pub fn set_domain(&mut self, domain: CodeDomain) {
        self.domain = domain;
    }

    pub fn get(&self, name: &str) -> Option<&Label> {
        self.labels
            .iter()
            .find(|l| l.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn code(&self, name: &str) -> LabelResult<i32> {
        self.get(name)
            .map(|l| l.code)
            .ok_or_else(|| LabelError::NameNotFound {
                name: name.to_string(),
            })
    }

    /// Override the code of one label. Only the named label changes.
    pub fn set_code(&mut self, name: &str, code: i32) -> LabelResult<()> {
        if !self.domain.contains(code) {
            return Err(LabelError::CodeOutOfRange {
                code,
                min: self.domain.min,
                max: self.domain.max,
            });
        }
        let label = self
            .labels
            .iter_mut()
            .find(|l| l.name.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| LabelError::NameNotFound {
                name: name.to_string(),
            })?;
        debug!("{} label {} changed {} -> {}", self.region, label.name, label.code, code);
        label.code = code;
        Ok(())
    }

    /// Apply the overrides for this registry's region. The domain is set
    /// first so every override is checked against it.
    pub fn apply_config(&mut self, config: &LabelConfig) -> LabelResult<()> {
        self.domain = config.domain;
        let overrides = match self.region {
            Region::La => &config.la,
            Region::Ra => &config.ra,
        };
        for (name, code) in overrides {
            self.set_code(name, *code)?;
        }
        Ok(())
    }

    /// Pre-correction tag the automatic segmentation uses for this label.
    pub fn naive_code(&self, label: &Label) -> Option<i32> {
        self.naive
            .iter()
            .find(|n| n.name.eq_ignore_ascii_case(&label.name))
            .map(|n| n.code)
    }

    pub fn is_label(&self, code: i32) -> bool {
        self.labels.iter().any(|l| l.code == code)
    }

    pub fn by_code(&self, code: i32) -> Option<&Label> {
        self.labels.iter().find(|l| l.code == code)
    }
}
