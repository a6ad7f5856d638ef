//! crosspack - cross-compile and package binaries for release
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_panics_doc)]
//!
//! # Overview
//!
//! `crosspack` builds one or more program entry points for a matrix of
//! (platform, architecture) targets, stages each target's binaries into its
//! own directory, links resource files (license, readme, ...) alongside
//! them, and produces one compressed archive per target: `.zip` for Windows
//! and macOS, `.tar.gz` for everything else.
//!
//! The per-target pipeline lives in `crosspack-core`; this crate is the
//! caller side: flag parsing, the optional `crosspack.toml` manifest,
//! target-matrix enumeration, resource collection, the concurrent driver,
//! and the console reporter.
//!
//! # Output layout
//!
//! ```text
//! dist/
//! ├── demo_linux_amd64/          # staging directory, kept for inspection
//! │   ├── demo
//! │   └── README.md              # hard link to the original
//! ├── demo_linux_amd64.tar.gz
//! └── demo_windows_amd64.zip
//! ```

pub mod console;
pub mod driver;
pub mod manifest;

use std::path::PathBuf;

use clap::Parser;

/// Resource globs scanned in the working directory even without `--include`.
pub const DEFAULT_RESOURCE_GLOBS: &[&str] =
    &["LICENSE*", "README*", "CHANGELOG*", "CREDITS*", "INSTALL*"];

#[derive(Debug, Parser)]
#[command(name = "crosspack")]
#[command(version = env!("CROSSPACK_VERSION"))]
#[command(about = "Cross-compile and package binaries for release")]
pub struct Cli {
    /// Package import paths to build [default: .]
    pub packages: Vec<String>,

    /// Comma-separated target operating systems [default: linux,darwin,windows]
    #[arg(long = "os", value_delimiter = ',')]
    pub os: Option<Vec<String>>,

    /// Comma-separated target architectures [default: amd64,arm64]
    #[arg(long = "arch", value_delimiter = ',')]
    pub arch: Option<Vec<String>>,

    /// Directory the staging directories and archives are written under [default: dist]
    #[arg(short = 'd', long)]
    pub dest: Option<PathBuf>,

    /// Program name; defaults to the base name of the first package
    #[arg(short = 'n', long)]
    pub name: Option<String>,

    /// Version segment for staging directory and archive names
    #[arg(long = "pkg-version")]
    pub pkg_version: Option<String>,

    /// Output binary name override (applies to every package)
    #[arg(short = 'o', long)]
    pub output: Option<String>,

    /// Linker flags passed through to the toolchain
    #[arg(long)]
    pub ldflags: Option<String>,

    /// Build tags passed through to the toolchain
    #[arg(long)]
    pub tags: Option<String>,

    /// Produce zip archives for every target, not just windows/darwin
    #[arg(short = 'z', long = "zip-always")]
    pub zip_always: bool,

    /// Extra resource globs bundled into every archive
    #[arg(long = "include")]
    pub include: Vec<String>,

    /// Compiler executable to invoke [default: go]
    #[arg(long, env = "CROSSPACK_TOOLCHAIN")]
    pub toolchain: Option<String>,

    /// Per-target build deadline in seconds (kills the compiler on expiry)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Concurrent target builds; defaults to the logical CPU count
    #[arg(short = 'j', long)]
    pub jobs: Option<usize>,

    /// Change to this directory before doing anything else
    #[arg(short = 'C', value_name = "DIR")]
    pub chdir: Option<PathBuf>,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}
