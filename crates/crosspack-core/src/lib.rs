//! Core library for crosspack.
//!
//! Implements the per-target build-and-package pipeline: the
//! [`TargetBuilder`] drives one (platform, architecture) cycle from a
//! [`BuildSpec`] to a single compressed archive, delegating subprocess
//! execution to a [`Toolchain`] and container writing to an [`Archiver`].
//! Progress is surfaced through the [`Reporter`] trait so the core stays
//! decoupled from any particular console implementation.

pub mod archive;
pub mod builder;
pub mod error;
pub mod reporter;
pub mod spec;
pub mod toolchain;

// Re-exports
pub use archive::{ArchiveError, Archiver};
pub use builder::TargetBuilder;
pub use error::BuildError;
pub use reporter::{NullReporter, Reporter};
pub use spec::BuildSpec;
pub use toolchain::Toolchain;
