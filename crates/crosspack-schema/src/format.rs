//! Archive container format and its platform-convention selection policy.

use crate::Platform;

/// Container format of the final per-target archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
    /// Deflate-compressed zip container.
    Zip,
    /// Gzip-compressed tar container.
    TarGz,
}

impl ArchiveFormat {
    /// Pick the archive format for a target platform.
    ///
    /// Windows and macOS users expect zip archives; everything else ships
    /// `tar.gz`. `force_zip` overrides the convention for all platforms.
    pub fn select(platform: &Platform, force_zip: bool) -> Self {
        if force_zip || platform == "windows" || platform == "darwin" {
            Self::Zip
        } else {
            Self::TarGz
        }
    }

    /// The filename extension, without a leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::TarGz => "tar.gz",
        }
    }
}

impl std::fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}
