//! Target CPU-architecture identifier.

/// A target CPU architecture, named the way the toolchain names it
/// (`amd64`, `arm64`, `386`, `riscv64`, ...).
///
/// Like [`Platform`](crate::Platform) this is an open set: the value is
/// forwarded to the toolchain verbatim (after case normalization), so any
/// architecture the toolchain knows about works without a crosspack release.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct Arch(String);

impl Arch {
    /// Create a new architecture identifier, normalizing to lowercase.
    pub fn new(name: &str) -> Self {
        Self(name.trim().to_lowercase())
    }

    /// Get the normalized identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The architecture this binary was compiled for, in toolchain naming.
    pub fn current() -> Self {
        Self::new(match std::env::consts::ARCH {
            "x86_64" => "amd64",
            "aarch64" => "arm64",
            "x86" => "386",
            other => other,
        })
    }
}

impl std::fmt::Display for Arch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::ops::Deref for Arch {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for Arch {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<std::ffi::OsStr> for Arch {
    fn as_ref(&self) -> &std::ffi::OsStr {
        self.0.as_ref()
    }
}

impl From<&str> for Arch {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl PartialEq<str> for Arch {
    fn eq(&self, other: &str) -> bool {
        self.0 == other.to_lowercase()
    }
}

impl PartialEq<&str> for Arch {
    fn eq(&self, other: &&str) -> bool {
        self.0 == other.to_lowercase()
    }
}
