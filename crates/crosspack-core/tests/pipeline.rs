//! End-to-end pipeline tests against a stand-in toolchain.
//!
//! Real cross-compilers are slow and not guaranteed present, so these tests
//! drive the pipeline with a small shell script that honors the `build -o
//! <path> [...] <package>` calling convention.

#![cfg(unix)]

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::TempDir;

use crosspack_core::{BuildError, BuildSpec, NullReporter, TargetBuilder, Toolchain};

/// Write an executable fake toolchain into `dir`.
///
/// The script appends one line per invocation to `calls.log` next to itself,
/// then runs `body` with `$out` bound to the `-o` argument and `$pkg` to the
/// trailing package path.
fn fake_toolchain(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-go");
    let log = dir.join("calls.log");
    let script = format!(
        "#!/bin/sh\n\
         out=\"$3\"\n\
         pkg=\"\"\n\
         for arg in \"$@\"; do pkg=\"$arg\"; done\n\
         echo \"$pkg\" >> \"{log}\"\n\
         {body}\n",
        log = log.display()
    );
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn call_count(dir: &Path) -> usize {
    std::fs::read_to_string(dir.join("calls.log")).map_or(0, |s| s.lines().count())
}

fn spec(work_dir: &Path, target: &str) -> BuildSpec {
    BuildSpec {
        name: "demo".to_string(),
        version: None,
        target: target.parse().unwrap(),
        output: None,
        ldflags: None,
        tags: None,
        packages: vec!["./cmd/demo".to_string()],
        work_dir_base: work_dir.to_path_buf(),
        zip_always: false,
        resources: Vec::new(),
    }
}

#[test]
fn linux_target_produces_tar_gz_with_binary_and_resource() {
    let tmp = TempDir::new().unwrap();
    let toolchain = Toolchain::new(fake_toolchain(tmp.path(), ": > \"$out\""));

    let readme = tmp.path().join("README.md");
    std::fs::write(&readme, "hello").unwrap();

    let mut spec = spec(tmp.path(), "linux/amd64");
    spec.resources = vec![readme];

    let builder = TargetBuilder::new(&toolchain, &NullReporter);
    let archive = builder.build(&spec).unwrap();

    assert_eq!(archive, tmp.path().join("demo_linux_amd64.tar.gz"));
    assert!(archive.is_file());

    let staging = tmp.path().join("demo_linux_amd64");
    assert!(staging.join("demo").is_file());
    assert!(staging.join("README.md").is_file());

    // The staging directory is the archive's top-level entry.
    let reader = flate2::read::GzDecoder::new(File::open(&archive).unwrap());
    let mut tar = tar::Archive::new(reader);
    let members: Vec<String> = tar
        .entries()
        .unwrap()
        .map(|e| e.unwrap().path().unwrap().display().to_string())
        .collect();
    assert!(members.contains(&"demo_linux_amd64/demo".to_string()));
    assert!(members.contains(&"demo_linux_amd64/README.md".to_string()));
}

#[test]
fn windows_target_produces_zip() {
    let tmp = TempDir::new().unwrap();
    let toolchain = Toolchain::new(fake_toolchain(tmp.path(), ": > \"$out\""));

    let builder = TargetBuilder::new(&toolchain, &NullReporter);
    let archive = builder.build(&spec(tmp.path(), "windows/amd64")).unwrap();

    assert_eq!(archive, tmp.path().join("demo_windows_amd64.zip"));
    let mut zip = zip::ZipArchive::new(File::open(&archive).unwrap()).unwrap();
    assert!(zip.by_name("demo_windows_amd64/demo").is_ok());
}

#[test]
fn preexisting_staging_dir_fails_before_invoking_toolchain() {
    let tmp = TempDir::new().unwrap();
    let toolchain = Toolchain::new(fake_toolchain(tmp.path(), ": > \"$out\""));
    std::fs::create_dir(tmp.path().join("demo_linux_amd64")).unwrap();

    let builder = TargetBuilder::new(&toolchain, &NullReporter);
    let err = builder.build(&spec(tmp.path(), "linux/amd64")).unwrap_err();

    assert!(matches!(err, BuildError::Workspace { .. }));
    assert_eq!(call_count(tmp.path()), 0);
}

#[test]
fn rerun_against_unmodified_base_dir_fails_not_overwrites() {
    let tmp = TempDir::new().unwrap();
    let toolchain = Toolchain::new(fake_toolchain(tmp.path(), ": > \"$out\""));
    let builder = TargetBuilder::new(&toolchain, &NullReporter);

    builder.build(&spec(tmp.path(), "linux/amd64")).unwrap();
    let err = builder.build(&spec(tmp.path(), "linux/amd64")).unwrap_err();
    assert!(matches!(err, BuildError::Workspace { .. }));
}

#[test]
fn first_failing_package_aborts_the_rest() {
    let tmp = TempDir::new().unwrap();
    let toolchain = Toolchain::new(fake_toolchain(
        tmp.path(),
        "if [ \"$pkg\" = \"./cmd/bad\" ]; then echo \"boom: $pkg\"; exit 1; fi\n: > \"$out\"",
    ));

    let mut spec = spec(tmp.path(), "linux/amd64");
    spec.packages = vec![
        "./cmd/one".to_string(),
        "./cmd/bad".to_string(),
        "./cmd/three".to_string(),
    ];

    let builder = TargetBuilder::new(&toolchain, &NullReporter);
    let err = builder.build(&spec).unwrap_err();

    match err {
        BuildError::Toolchain {
            package, output, ..
        } => {
            assert_eq!(package, "./cmd/bad");
            // Captured output is carried verbatim.
            assert!(output.contains("boom: ./cmd/bad"));
        }
        other => panic!("expected Toolchain error, got {other}"),
    }
    // Two invocations: the one that succeeded and the one that failed.
    assert_eq!(call_count(tmp.path()), 2);
}

#[test]
fn silent_builds_with_no_output_yield_no_artifacts() {
    let tmp = TempDir::new().unwrap();
    // Exits zero without creating anything.
    let toolchain = Toolchain::new(fake_toolchain(tmp.path(), "true"));

    let mut spec = spec(tmp.path(), "linux/amd64");
    spec.packages = vec!["./lib/a".to_string(), "./lib/b".to_string()];

    let builder = TargetBuilder::new(&toolchain, &NullReporter);
    let err = builder.build(&spec).unwrap_err();

    match err {
        BuildError::NoArtifacts { packages, target } => {
            assert_eq!(packages, ["./lib/a", "./lib/b"]);
            assert_eq!(target.to_string(), "linux/amd64");
        }
        other => panic!("expected NoArtifacts error, got {other}"),
    }
    // The error message names every package for diagnosis.
    let rendered = builder.build(&{
        let mut s = spec.clone();
        s.name = "demo2".to_string();
        s
    });
    let msg = rendered.unwrap_err().to_string();
    assert!(msg.contains("./lib/a ./lib/b"));
    assert!(msg.contains("linux/amd64"));
}

#[test]
fn cross_compilation_env_reaches_the_subprocess() {
    let tmp = TempDir::new().unwrap();
    let toolchain = Toolchain::new(fake_toolchain(
        tmp.path(),
        "printf '%s/%s' \"$GOOS\" \"$GOARCH\" > \"$out\"",
    ));

    let builder = TargetBuilder::new(&toolchain, &NullReporter);
    builder.build(&spec(tmp.path(), "windows/arm64")).unwrap();

    let binary = tmp.path().join("demo_windows_arm64/demo");
    assert_eq!(std::fs::read_to_string(binary).unwrap(), "windows/arm64");
}

#[test]
fn ldflags_and_tags_are_forwarded_only_when_set() {
    let tmp = TempDir::new().unwrap();
    let toolchain = Toolchain::new(fake_toolchain(
        tmp.path(),
        "printf '%s\\n' \"$@\" > \"$out\"",
    ));

    let mut spec = spec(tmp.path(), "linux/amd64");
    spec.ldflags = Some("-s -w".to_string());
    spec.tags = Some("netgo".to_string());

    let builder = TargetBuilder::new(&toolchain, &NullReporter);
    builder.build(&spec).unwrap();

    let argv = std::fs::read_to_string(tmp.path().join("demo_linux_amd64/demo")).unwrap();
    let args: Vec<&str> = argv.lines().collect();
    assert_eq!(
        args[3..],
        ["-ldflags", "-s -w", "-tags", "netgo", "./cmd/demo"]
    );
}

#[test]
fn output_override_names_the_binary() {
    let tmp = TempDir::new().unwrap();
    let toolchain = Toolchain::new(fake_toolchain(tmp.path(), ": > \"$out\""));

    let mut spec = spec(tmp.path(), "linux/amd64");
    spec.output = Some("demo-cli".to_string());

    let builder = TargetBuilder::new(&toolchain, &NullReporter);
    builder.build(&spec).unwrap();
    assert!(tmp.path().join("demo_linux_amd64/demo-cli").is_file());
}

#[test]
fn linked_resource_shares_identity_with_the_original() {
    use std::os::unix::fs::MetadataExt;

    let tmp = TempDir::new().unwrap();
    let toolchain = Toolchain::new(fake_toolchain(tmp.path(), ": > \"$out\""));

    let license = tmp.path().join("LICENSE");
    std::fs::write(&license, "v1").unwrap();

    let mut spec = spec(tmp.path(), "linux/amd64");
    spec.resources = vec![license.clone()];

    let builder = TargetBuilder::new(&toolchain, &NullReporter);
    builder.build(&spec).unwrap();

    let linked = tmp.path().join("demo_linux_amd64/LICENSE");
    assert_eq!(
        std::fs::metadata(&license).unwrap().ino(),
        std::fs::metadata(&linked).unwrap().ino()
    );

    // Mutating through one name is visible through the other.
    std::fs::write(&license, "v2").unwrap();
    assert_eq!(std::fs::read_to_string(&linked).unwrap(), "v2");
}

#[test]
fn missing_resource_fails_the_invocation() {
    let tmp = TempDir::new().unwrap();
    let toolchain = Toolchain::new(fake_toolchain(tmp.path(), ": > \"$out\""));

    let mut spec = spec(tmp.path(), "linux/amd64");
    spec.resources = vec![tmp.path().join("NO_SUCH_FILE")];

    let builder = TargetBuilder::new(&toolchain, &NullReporter);
    let err = builder.build(&spec).unwrap_err();
    assert!(matches!(err, BuildError::ResourceLink { .. }));
}

#[test]
fn zip_always_forces_zip_on_tar_platforms() {
    let tmp = TempDir::new().unwrap();
    let toolchain = Toolchain::new(fake_toolchain(tmp.path(), ": > \"$out\""));

    let mut spec = spec(tmp.path(), "linux/amd64");
    spec.zip_always = true;

    let builder = TargetBuilder::new(&toolchain, &NullReporter);
    let archive = builder.build(&spec).unwrap();
    assert_eq!(archive, tmp.path().join("demo_linux_amd64.zip"));
}

#[test]
fn version_segment_appears_in_staging_and_archive_names() {
    let tmp = TempDir::new().unwrap();
    let toolchain = Toolchain::new(fake_toolchain(tmp.path(), ": > \"$out\""));

    let mut spec = spec(tmp.path(), "linux/amd64");
    spec.version = Some("0.3.1".to_string());

    let builder = TargetBuilder::new(&toolchain, &NullReporter);
    let archive = builder.build(&spec).unwrap();
    assert_eq!(archive, tmp.path().join("demo_0.3.1_linux_amd64.tar.gz"));
    assert!(tmp.path().join("demo_0.3.1_linux_amd64").is_dir());
}

#[test]
fn deadline_kills_hung_builds_and_reports_toolchain_failure() {
    let tmp = TempDir::new().unwrap();
    // `exec` so the kill hits the sleeping process itself, and the pipe
    // write-ends close promptly instead of being held for 30s.
    let toolchain = Toolchain::new(fake_toolchain(
        tmp.path(),
        "echo started; exec sleep 30 > /dev/null 2>&1",
    ))
    .with_deadline(Duration::from_millis(300));

    let builder = TargetBuilder::new(&toolchain, &NullReporter);
    let err = builder.build(&spec(tmp.path(), "linux/amd64")).unwrap_err();

    match err {
        BuildError::Toolchain { output, .. } => {
            assert!(output.contains("deadline"));
        }
        other => panic!("expected Toolchain error, got {other}"),
    }
}
