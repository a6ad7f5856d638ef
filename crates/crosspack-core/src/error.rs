//! Error taxonomy for one target build.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crosspack_schema::Target;

use crate::archive::ArchiveError;

/// Everything that can fail one [`TargetBuilder`](crate::TargetBuilder)
/// invocation. All variants are fatal to that invocation; nothing is retried
/// and nothing is cleaned up, so the staging directory is left in place for
/// inspection.
#[derive(Error, Debug)]
pub enum BuildError {
    /// The staging directory pre-exists or could not be created. A
    /// pre-existing directory signals a caller-level naming collision, never
    /// something to silently overwrite.
    #[error("failed to create staging directory {path}: {source}")]
    Workspace {
        /// The staging directory that could not be created.
        path: PathBuf,
        /// The underlying filesystem error.
        source: io::Error,
    },

    /// The toolchain subprocess exited non-zero (or hit a caller-imposed
    /// deadline). The captured output is the primary diagnostic surface and
    /// is carried verbatim, never summarized or truncated.
    #[error(
        "build failed for {package} ({target}) with the following output:\n{output}"
    )]
    Toolchain {
        /// Package import path that failed.
        package: String,
        /// Target being built.
        target: Target,
        /// Combined stdout/stderr of the subprocess, verbatim.
        output: String,
    },

    /// Every package build exited zero but the staging directory is empty
    /// afterward, e.g. because a listed package is library-only.
    #[error(
        "no binaries were built from [{}] for {target}", packages.join(" ")
    )]
    NoArtifacts {
        /// The full package list of the invocation.
        packages: Vec<String>,
        /// Target being built.
        target: Target,
    },

    /// A resource could not be hard-linked into the staging directory
    /// (missing source, cross-device link, destination collision).
    #[error("failed to link resource {resource} into staging directory: {source}")]
    ResourceLink {
        /// The resource that could not be linked.
        resource: PathBuf,
        /// The underlying filesystem error.
        source: io::Error,
    },

    /// The archival capability failed to produce the final archive.
    #[error("failed to archive to {dest}: {source}")]
    Archive {
        /// Destination archive path.
        dest: PathBuf,
        /// The underlying archiver error.
        source: ArchiveError,
    },
}
