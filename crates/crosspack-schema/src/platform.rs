//! Target operating-system identifier.

/// A target operating system, named the way the toolchain names it
/// (`linux`, `darwin`, `windows`, `freebsd`, ...).
///
/// This is an open set: any value the toolchain accepts is legal, so the
/// type is a normalized string rather than a closed enum. Values are
/// lowercased on construction so `Linux` and `linux` compare equal.
///
/// # Example
///
/// ```
/// use crosspack_schema::Platform;
///
/// let p = Platform::new("Linux");
/// assert_eq!(p.as_str(), "linux");
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct Platform(String);

impl Platform {
    /// Create a new platform identifier, normalizing to lowercase.
    pub fn new(name: &str) -> Self {
        Self(name.trim().to_lowercase())
    }

    /// Get the normalized identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The platform this binary was compiled for, in toolchain naming.
    pub fn current() -> Self {
        Self::new(match std::env::consts::OS {
            "macos" => "darwin",
            other => other,
        })
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::ops::Deref for Platform {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for Platform {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<std::ffi::OsStr> for Platform {
    fn as_ref(&self) -> &std::ffi::OsStr {
        self.0.as_ref()
    }
}

impl From<&str> for Platform {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl PartialEq<str> for Platform {
    fn eq(&self, other: &str) -> bool {
        self.0 == other.to_lowercase()
    }
}

impl PartialEq<&str> for Platform {
    fn eq(&self, other: &&str) -> bool {
        self.0 == other.to_lowercase()
    }
}
