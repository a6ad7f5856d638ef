//! Optional `crosspack.toml` manifest.
//!
//! Every field is optional; precedence is CLI flag > manifest > built-in
//! default, resolved in the driver.
//!
//! ```toml
//! [package]
//! name = "demo"
//! version = "1.4.0"
//!
//! [build]
//! os = ["linux", "windows"]
//! arch = ["amd64"]
//! packages = ["./cmd/demo"]
//! ldflags = "-s -w"
//!
//! [archive]
//! dest = "dist"
//! zip_always = false
//! include = ["docs/*.md"]
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Manifest file name looked up in the working directory.
pub const MANIFEST_NAME: &str = "crosspack.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub package: PackageSection,
    #[serde(default)]
    pub build: BuildSection,
    #[serde(default)]
    pub archive: ArchiveSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageSection {
    pub name: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildSection {
    pub os: Option<Vec<String>>,
    pub arch: Option<Vec<String>>,
    pub packages: Option<Vec<String>>,
    pub output: Option<String>,
    pub ldflags: Option<String>,
    pub tags: Option<String>,
    pub toolchain: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArchiveSection {
    pub dest: Option<String>,
    pub zip_always: Option<bool>,
    pub include: Option<Vec<String>>,
}

impl Manifest {
    /// Load the manifest from `dir`, or return the default (all `None`)
    /// manifest when the file does not exist.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(MANIFEST_NAME);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let manifest: Manifest = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(manifest)
    }
}
