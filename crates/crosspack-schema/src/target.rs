//! One (platform, architecture) pair to cross-compile for.

use thiserror::Error;

use crate::{Arch, Platform};

/// One (platform, architecture) pair to cross-compile for.
///
/// Displayed and parsed in the conventional `os/arch` form, e.g.
/// `linux/amd64` or `windows/arm64`.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct Target {
    /// Target operating system.
    pub platform: Platform,
    /// Target CPU architecture.
    pub arch: Arch,
}

/// Error returned when a target string is not of the `os/arch` form.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid target '{0}', expected 'os/arch' (e.g. linux/amd64)")]
pub struct ParseTargetError(String);

impl Target {
    /// Create a target from a platform and architecture.
    pub fn new(platform: Platform, arch: Arch) -> Self {
        Self { platform, arch }
    }

    /// The full cross product of the given platform and architecture lists,
    /// in input order.
    pub fn matrix(platforms: &[Platform], arches: &[Arch]) -> Vec<Self> {
        platforms
            .iter()
            .flat_map(|p| arches.iter().map(|a| Self::new(p.clone(), a.clone())))
            .collect()
    }

    /// The target this binary was compiled for.
    pub fn current() -> Self {
        Self::new(Platform::current(), Arch::current())
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.platform, self.arch)
    }
}

impl std::str::FromStr for Target {
    type Err = ParseTargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((os, arch)) if !os.trim().is_empty() && !arch.trim().is_empty() => {
                Ok(Self::new(Platform::new(os), Arch::new(arch)))
            }
            _ => Err(ParseTargetError(s.to_string())),
        }
    }
}
