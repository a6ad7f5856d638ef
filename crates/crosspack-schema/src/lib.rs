//! Shared vocabulary types for crosspack.
//!
//! These types carry no IO of their own: [`Platform`] and [`Arch`] are the
//! case-normalized identifiers the toolchain understands, [`Target`] is one
//! (platform, architecture) pair to cross-compile for, and [`ArchiveFormat`]
//! is the container format chosen for a target by platform convention.

pub mod arch;
pub mod format;
pub mod platform;
pub mod target;

// Re-exports
pub use arch::Arch;
pub use format::ArchiveFormat;
pub use platform::Platform;
pub use target::{ParseTargetError, Target};
