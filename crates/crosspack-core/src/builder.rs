//! The per-target build-and-package pipeline.
//!
//! One [`TargetBuilder::build`] call drives a single (platform, architecture)
//! cycle through four phases in strict sequence:
//!
//! 1. **Workspace preparation** — derive the staging directory name and
//!    create it exclusively under the base working directory.
//! 2. **Toolchain invocation** — one compiler subprocess per package, output
//!    written straight into the staging directory, first failure aborts the
//!    rest.
//! 3. **Validation and resource staging** — the staging directory must be
//!    non-empty; resources are hard-linked in by base name.
//! 4. **Archival** — the staging directory becomes one `.zip` or `.tar.gz`,
//!    chosen by platform convention.
//!
//! Every failure is terminal for the invocation. Nothing is retried and
//! nothing is rolled back: a failed invocation leaves the staging directory
//! and any partial binaries in place for inspection.

use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;

use crate::archive::Archiver;
use crate::error::BuildError;
use crate::reporter::Reporter;
use crate::spec::BuildSpec;
use crate::toolchain::Toolchain;
use crosspack_schema::ArchiveFormat;

/// Drives one platform/architecture build+package cycle to completion, or
/// fails atomically with a diagnosable [`BuildError`].
///
/// The builder borrows its collaborators; invocations for distinct targets
/// are side-effect-isolated by construction (distinct staging names), so a
/// caller may run several builders concurrently against the same base
/// working directory.
pub struct TargetBuilder<'a> {
    toolchain: &'a Toolchain,
    reporter: &'a dyn Reporter,
}

impl std::fmt::Debug for TargetBuilder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TargetBuilder")
            .field("toolchain", &self.toolchain)
            .finish_non_exhaustive()
    }
}

impl<'a> TargetBuilder<'a> {
    /// Create a builder backed by the given toolchain and reporter.
    pub fn new(toolchain: &'a Toolchain, reporter: &'a dyn Reporter) -> Self {
        Self {
            toolchain,
            reporter,
        }
    }

    /// Run the full pipeline for one spec and return the archive path.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] naming the phase that failed; see the
    /// module docs for the taxonomy. The staging directory is left in place
    /// on failure.
    pub fn build(&self, spec: &BuildSpec) -> Result<PathBuf, BuildError> {
        // Phase 1: workspace preparation. Exclusive creation: a pre-existing
        // staging directory is a caller-level naming collision, never
        // something to overwrite.
        let dir_name = spec.staging_dir_name();
        let staging = spec.work_dir_base.join(&dir_name);
        fs::create_dir(&staging).map_err(|source| BuildError::Workspace {
            path: staging.clone(),
            source,
        })?;
        tracing::debug!(staging = %staging.display(), target = %spec.target, "staging directory created");

        // Phase 2: one toolchain subprocess per package, in order. The first
        // failure aborts the rest; partial binaries for a target are not
        // independently useful.
        for package in &spec.packages {
            self.reporter.building(package, &spec.target);

            let output_name = match spec.output.as_deref() {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => package_base(package),
            };

            let mut args: Vec<OsString> = vec![
                "build".into(),
                "-o".into(),
                staging.join(output_name).into(),
            ];
            if let Some(ldflags) = spec.ldflags.as_deref()
                && !ldflags.is_empty()
            {
                args.push("-ldflags".into());
                args.push(ldflags.into());
            }
            if let Some(tags) = spec.tags.as_deref()
                && !tags.is_empty()
            {
                args.push("-tags".into());
                args.push(tags.into());
            }
            args.push(package.into());

            let invocation = self
                .toolchain
                .invoke(&args, &spec.target)
                .map_err(|e| BuildError::Toolchain {
                    package: package.clone(),
                    target: spec.target.clone(),
                    output: e.to_string(),
                })?;
            if !invocation.success {
                return Err(BuildError::Toolchain {
                    package: package.clone(),
                    target: spec.target.clone(),
                    output: invocation.output,
                });
            }
        }

        // Phase 3: aggregate validation. Checked even though no package
        // failed: a build can exit zero yet produce nothing (e.g. a
        // library-only package).
        let entries = fs::read_dir(&staging)
            .map_err(|source| BuildError::Workspace {
                path: staging.clone(),
                source,
            })?
            .count();
        if entries == 0 {
            return Err(BuildError::NoArtifacts {
                packages: spec.packages.clone(),
                target: spec.target.clone(),
            });
        }

        // Resource staging: hard links preserve identity with the original
        // file. A destination collision from a stale run fails here rather
        // than overwriting.
        for resource in &spec.resources {
            let base = resource.file_name().ok_or_else(|| BuildError::ResourceLink {
                resource: resource.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "resource path has no base name",
                ),
            })?;
            fs::hard_link(resource, staging.join(base)).map_err(|source| {
                BuildError::ResourceLink {
                    resource: resource.clone(),
                    source,
                }
            })?;
        }

        // Phase 4: archival. Format is a pure function of (platform,
        // force-zip); the staging directory is the archive's top-level entry.
        let format = ArchiveFormat::select(&spec.target.platform, spec.zip_always);
        let archive_path = spec
            .work_dir_base
            .join(format!("{dir_name}.{}", format.extension()));

        if let Some(name) = archive_path.file_name().and_then(|n| n.to_str()) {
            self.reporter.archiving(name);
        }

        Archiver::from(format)
            .archive(&[&staging], &archive_path)
            .map_err(|source| BuildError::Archive {
                dest: archive_path.clone(),
                source,
            })?;

        Ok(archive_path)
    }
}

/// Last path segment of a package import path (`./cmd/demo` -> `demo`,
/// `.` -> `.`), used as the default output binary name.
fn package_base(package: &str) -> String {
    let trimmed = package.trim_end_matches('/');
    if trimmed.is_empty() {
        return if package.is_empty() { ".".to_string() } else { "/".to_string() };
    }
    trimmed
        .rsplit('/')
        .next()
        .unwrap_or(trimmed)
        .to_string()
}
