//! TOML configuration for label overrides and repair knobs.
//!
//! ```toml
//! [la]
//! laa = 19
//! ripv = 17
//!
//! [domain]
//! min = 1
//! max = 100
//!
//! [repair]
//! background_label = 1
//! max_passes = 5
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    /// Left atrium code overrides keyed by label name (case-insensitive).
    pub la: BTreeMap<String, i32>,
    /// Right atrium code overrides keyed by label name (case-insensitive).
    pub ra: BTreeMap<String, i32>,
    pub domain: CodeDomain,
    pub repair: RepairConfig,
}

/// Inclusive range every overridden label code must fall in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeDomain {
    pub min: i32,
    pub max: i32,
}

impl Default for CodeDomain {
    fn default() -> Self {
        Self { min: 1, max: 100 }
    }
}

impl CodeDomain {
    pub fn contains(&self, code: i32) -> bool {
        (self.min..=self.max).contains(&code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairConfig {
    /// Label given to stray islands that touch no other label.
    pub background_label: i32,
    /// Upper bound on check/fix rounds in `repair_surface`.
    pub max_passes: usize,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            background_label: 1,
            max_passes: 5,
        }
    }
}

impl LabelConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("failed to parse label configuration")
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let text = std::fs::read_to_string(path_ref)
            .with_context(|| format!("failed to read config file {:?}", path_ref.display()))?;
        Self::from_toml_str(&text)
            .with_context(|| format!("invalid config file {:?}", path_ref.display()))
    }
}
