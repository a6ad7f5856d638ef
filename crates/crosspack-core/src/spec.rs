//! Input record for one target build.

use std::path::PathBuf;

use crosspack_schema::Target;

/// Everything one [`TargetBuilder`](crate::TargetBuilder) invocation needs.
///
/// Immutable for the duration of the invocation. The driver constructs one
/// spec per target; the specs differ only in [`target`](Self::target), which
/// guarantees distinct staging directory names across a build matrix.
#[derive(Debug, Clone)]
pub struct BuildSpec {
    /// Program name, the first segment of the staging directory name.
    pub name: String,
    /// Optional version segment. `None` (or empty) is omitted from the
    /// staging directory name entirely, never rendered as an empty segment.
    pub version: Option<String>,
    /// The platform/architecture pair to cross-compile for.
    pub target: Target,
    /// Output binary name override. When unset, each package uses its own
    /// base name.
    pub output: Option<String>,
    /// Linker flags forwarded to the toolchain verbatim when non-empty.
    pub ldflags: Option<String>,
    /// Build tags forwarded to the toolchain verbatim when non-empty.
    pub tags: Option<String>,
    /// Package import paths to compile, in order. The first failure aborts
    /// the rest.
    pub packages: Vec<String>,
    /// Base working directory the staging directory is created under.
    pub work_dir_base: PathBuf,
    /// Force zip archival regardless of platform convention.
    pub zip_always: bool,
    /// Resource files hard-linked into the staging directory by base name.
    pub resources: Vec<PathBuf>,
}

impl BuildSpec {
    /// Derive the staging directory name:
    /// `join([name, version?, platform, arch], "_")`.
    pub fn staging_dir_name(&self) -> String {
        let mut segments = vec![self.name.as_str()];
        if let Some(version) = self.version.as_deref()
            && !version.is_empty()
        {
            segments.push(version);
        }
        segments.push(self.target.platform.as_str());
        segments.push(self.target.arch.as_str());
        segments.join("_")
    }
}
