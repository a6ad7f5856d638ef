//! Reporter trait for dependency injection.
//!
//! The pipeline reports progress and results without being coupled to a
//! specific console implementation. The core emits `building`/`archiving`
//! as phases start; the driver emits the per-target outcome.

use std::path::Path;

use crosspack_schema::Target;

/// Progress and outcome sink for target builds.
pub trait Reporter: Send + Sync {
    /// A package build is starting for the given target.
    fn building(&self, package: &str, target: &Target);

    /// Archival of the named archive file is starting.
    fn archiving(&self, archive_name: &str);

    /// A target completed; `size` is the archive size in bytes.
    fn built(&self, target: &Target, archive: &Path, size: u64);

    /// A target failed with the given reason.
    fn failed(&self, target: &Target, reason: &str);

    /// Log an informational message.
    fn info(&self, msg: &str);
}

impl<T: Reporter + ?Sized> Reporter for std::sync::Arc<T> {
    fn building(&self, package: &str, target: &Target) {
        (**self).building(package, target);
    }
    fn archiving(&self, archive_name: &str) {
        (**self).archiving(archive_name);
    }
    fn built(&self, target: &Target, archive: &Path, size: u64) {
        (**self).built(target, archive, size);
    }
    fn failed(&self, target: &Target, reason: &str) {
        (**self).failed(target, reason);
    }
    fn info(&self, msg: &str) {
        (**self).info(msg);
    }
}

/// A no-op reporter for silent operations (e.g. testing).
#[derive(Debug, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn building(&self, _: &str, _: &Target) {}
    fn archiving(&self, _: &str) {}
    fn built(&self, _: &Target, _: &Path, _: u64) {}
    fn failed(&self, _: &Target, _: &str) {}
    fn info(&self, _: &str) {}
}
