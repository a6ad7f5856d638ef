//! Config resolution and the concurrent target driver.
//!
//! The driver resolves the effective configuration (CLI flag > manifest >
//! built-in default), enumerates the os x arch matrix, collects resources
//! once, and runs one pipeline per target on a scoped worker pool. Target
//! builds are independent and side-effect-isolated (distinct staging names),
//! so failures never stop the other targets; the process exits non-zero
//! after all of them finish if any failed.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{Context, Result, bail};

use crosspack_core::{BuildSpec, Reporter, TargetBuilder, Toolchain};
use crosspack_schema::{Arch, Platform, Target};

use crate::manifest::Manifest;
use crate::{Cli, DEFAULT_RESOURCE_GLOBS};

/// The effective configuration after flag/manifest/default resolution.
#[derive(Debug)]
pub struct ResolvedConfig {
    pub name: String,
    pub version: Option<String>,
    pub targets: Vec<Target>,
    pub packages: Vec<String>,
    pub output: Option<String>,
    pub ldflags: Option<String>,
    pub tags: Option<String>,
    pub dest: PathBuf,
    pub zip_always: bool,
    pub resources: Vec<PathBuf>,
    pub toolchain: PathBuf,
    pub timeout: Option<Duration>,
    pub jobs: usize,
}

/// Resolve configuration and drive every target to completion.
pub fn run(cli: &Cli, reporter: &dyn Reporter) -> Result<()> {
    let cwd = std::env::current_dir().context("failed to determine working directory")?;
    let manifest = Manifest::load(&cwd)?;
    let config = resolve(cli, &manifest, &cwd)?;

    std::fs::create_dir_all(&config.dest)
        .with_context(|| format!("failed to create {}", config.dest.display()))?;

    let mut toolchain = Toolchain::new(&config.toolchain);
    if let Some(timeout) = config.timeout {
        toolchain = toolchain.with_deadline(timeout);
    }

    let specs: Vec<BuildSpec> = config
        .targets
        .iter()
        .map(|target| BuildSpec {
            name: config.name.clone(),
            version: config.version.clone(),
            target: target.clone(),
            output: config.output.clone(),
            ldflags: config.ldflags.clone(),
            tags: config.tags.clone(),
            packages: config.packages.clone(),
            work_dir_base: config.dest.clone(),
            zip_always: config.zip_always,
            resources: config.resources.clone(),
        })
        .collect();

    reporter.info(&format!(
        "building {} for {} target(s) with {} worker(s)",
        config.name,
        specs.len(),
        config.jobs
    ));

    // Work-stealing by index: each worker claims the next unbuilt spec.
    // Targets share nothing but the destination directory namespace, which
    // is collision-free across distinct (platform, arch) pairs.
    let next = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);
    std::thread::scope(|scope| {
        for _ in 0..config.jobs {
            scope.spawn(|| {
                loop {
                    let index = next.fetch_add(1, Ordering::Relaxed);
                    let Some(spec) = specs.get(index) else { break };

                    let builder = TargetBuilder::new(&toolchain, reporter);
                    match builder.build(spec) {
                        Ok(archive) => {
                            let size = std::fs::metadata(&archive).map_or(0, |m| m.len());
                            reporter.built(&spec.target, &archive, size);
                        }
                        Err(err) => {
                            failed.fetch_add(1, Ordering::Relaxed);
                            reporter.failed(&spec.target, &err.to_string());
                        }
                    }
                }
            });
        }
    });

    let failed = failed.into_inner();
    if failed > 0 {
        bail!("{failed} of {} target(s) failed", specs.len());
    }
    Ok(())
}

/// Resolve the effective configuration: CLI flag > manifest > default.
pub fn resolve(cli: &Cli, manifest: &Manifest, cwd: &Path) -> Result<ResolvedConfig> {
    let packages: Vec<String> = if cli.packages.is_empty() {
        manifest
            .build
            .packages
            .clone()
            .unwrap_or_else(|| vec![".".to_string()])
    } else {
        cli.packages.clone()
    };
    if packages.is_empty() {
        bail!("no packages to build");
    }

    let platforms: Vec<Platform> = cli
        .os
        .clone()
        .or_else(|| manifest.build.os.clone())
        .unwrap_or_else(|| ["linux", "darwin", "windows"].map(String::from).to_vec())
        .iter()
        .map(|s| Platform::new(s))
        .collect();
    let arches: Vec<Arch> = cli
        .arch
        .clone()
        .or_else(|| manifest.build.arch.clone())
        .unwrap_or_else(|| ["amd64", "arm64"].map(String::from).to_vec())
        .iter()
        .map(|s| Arch::new(s))
        .collect();

    let targets = Target::matrix(&platforms, &arches);
    if targets.is_empty() {
        bail!("target matrix is empty; check --os and --arch");
    }

    // Duplicate targets would collide on staging directory names, which the
    // pipeline treats as fatal. Reject them up front with a better message.
    let mut seen = BTreeSet::new();
    for target in &targets {
        if !seen.insert(target.clone()) {
            bail!("duplicate target {target}; check --os and --arch for repeats");
        }
    }

    let name = match cli.name.clone().or_else(|| manifest.package.name.clone()) {
        Some(name) if !name.is_empty() => name,
        _ => default_name(cwd, &packages[0])?,
    };

    let version = cli
        .pkg_version
        .clone()
        .or_else(|| manifest.package.version.clone())
        .filter(|v| !v.is_empty());

    let toolchain_name = cli
        .toolchain
        .clone()
        .or_else(|| manifest.build.toolchain.clone())
        .unwrap_or_else(|| "go".to_string());
    let toolchain = which::which(&toolchain_name)
        .with_context(|| format!("toolchain '{toolchain_name}' not found"))?;

    let dest = cli
        .dest
        .clone()
        .or_else(|| manifest.archive.dest.clone().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("dist"));

    // The flag replaces the manifest's list, like every other field; the
    // conventional globs are always scanned either way.
    let include = if cli.include.is_empty() {
        manifest.archive.include.clone().unwrap_or_default()
    } else {
        cli.include.clone()
    };
    let resources = collect_resources(cwd, &include)?;

    let jobs = cli
        .jobs
        .unwrap_or_else(num_cpus::get)
        .clamp(1, targets.len());

    Ok(ResolvedConfig {
        name,
        version,
        targets,
        packages,
        output: cli.output.clone().or_else(|| manifest.build.output.clone()),
        ldflags: cli
            .ldflags
            .clone()
            .or_else(|| manifest.build.ldflags.clone()),
        tags: cli.tags.clone().or_else(|| manifest.build.tags.clone()),
        dest,
        zip_always: cli.zip_always || manifest.archive.zip_always.unwrap_or(false),
        resources,
        toolchain,
        timeout: cli.timeout.map(Duration::from_secs),
        jobs,
    })
}

/// Scan the working directory for resource files: the conventional globs
/// (LICENSE*, README*, ...) plus any extra patterns. Deduplicated, sorted,
/// files only.
fn collect_resources(cwd: &Path, extra: &[String]) -> Result<Vec<PathBuf>> {
    let mut found = BTreeSet::new();
    for pattern in DEFAULT_RESOURCE_GLOBS
        .iter()
        .map(|p| (*p).to_string())
        .chain(extra.iter().cloned())
    {
        let absolute = cwd.join(&pattern);
        let absolute = absolute
            .to_str()
            .with_context(|| format!("resource glob is not valid UTF-8: {pattern}"))?;
        for entry in glob::glob(absolute)
            .with_context(|| format!("invalid resource glob: {pattern}"))?
        {
            let path = entry.with_context(|| format!("failed to scan glob: {pattern}"))?;
            if path.is_file() {
                found.insert(path);
            }
        }
    }
    Ok(found.into_iter().collect())
}

/// Default program name: the base name of the first package path resolved
/// against the working directory (`.` means the directory itself).
fn default_name(cwd: &Path, package: &str) -> Result<String> {
    let resolved = if package.starts_with('.') || package.is_empty() {
        cwd.join(package)
    } else {
        PathBuf::from(package)
    };
    resolved
        .components()
        .rev()
        .find_map(|component| match component {
            Component::Normal(segment) => segment.to_str().map(str::to_string),
            _ => None,
        })
        .with_context(|| format!("cannot derive a program name from '{package}'; pass --name"))
}
