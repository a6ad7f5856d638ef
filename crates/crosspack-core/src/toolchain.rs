//! Compiler subprocess wrapper.
//!
//! Every invocation builds its `Command` from scratch with an explicit
//! environment snapshot: the inherited process environment overlaid with
//! `GOOS`/`GOARCH` for the target. The snapshot is applied after
//! `env_clear()`, so cross-compilation state is never communicated through
//! process-global mutation and concurrent invocations for different targets
//! cannot race on shared environment.

use std::ffi::{OsStr, OsString};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use wait_timeout::ChildExt;

use crosspack_schema::Target;

/// A compiler executable plus an optional caller-imposed deadline.
///
/// The core pipeline has no cancellation of its own; without a deadline a
/// hung build blocks its invocation indefinitely. With one, the child is
/// killed on expiry and the invocation reports failure with the output
/// captured so far.
#[derive(Debug, Clone)]
pub struct Toolchain {
    program: PathBuf,
    deadline: Option<Duration>,
}

/// Result of one subprocess run: exit disposition plus the combined
/// stdout/stderr stream, verbatim.
#[derive(Debug)]
pub struct Invocation {
    /// Whether the subprocess exited zero within the deadline.
    pub success: bool,
    /// Combined stdout/stderr, in arrival order per stream.
    pub output: String,
}

impl Toolchain {
    /// Wrap the given compiler executable.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            deadline: None,
        }
    }

    /// Impose a deadline on every subsequent invocation.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Path of the wrapped executable.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run the compiler with the given arguments, cross-compiling for
    /// `target`, and capture its combined output.
    ///
    /// A non-zero exit or an expired deadline is not an `Err`; it is a
    /// successful capture with [`Invocation::success`] false. `Err` means
    /// the subprocess could not be spawned or its output could not be read.
    ///
    /// # Errors
    ///
    /// Returns an `io::Error` if spawning or stream handling fails.
    pub fn invoke(&self, args: &[OsString], target: &Target) -> io::Result<Invocation> {
        let mut cmd = Command::new(&self.program);
        cmd.args(args);

        // Fresh snapshot per invocation: inherited env plus exactly two
        // overrides, applied to a cleared Command environment.
        cmd.env_clear();
        cmd.envs(target_env(target));

        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        tracing::debug!(
            program = %self.program.display(),
            %target,
            ?args,
            "invoking toolchain"
        );

        let mut child = cmd.spawn()?;

        // Drain both pipes on background threads so the child cannot fill a
        // pipe buffer and deadlock while we wait on it.
        let sink = Arc::new(Mutex::new(Vec::new()));
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let out_reader = stdout.map(|s| spawn_drain(s, Arc::clone(&sink)));
        let err_reader = stderr.map(|s| spawn_drain(s, Arc::clone(&sink)));

        let (success, timed_out) = match self.deadline {
            Some(deadline) => match child.wait_timeout(deadline)? {
                Some(status) => (status.success(), false),
                None => {
                    child.kill()?;
                    child.wait()?;
                    (false, true)
                }
            },
            None => (child.wait()?.success(), false),
        };

        for reader in [out_reader, err_reader].into_iter().flatten() {
            reader
                .join()
                .map_err(|_| io::Error::other("toolchain output reader panicked"))??;
        }

        let bytes = Arc::try_unwrap(sink)
            .map_err(|_| io::Error::other("toolchain output still shared"))?
            .into_inner()
            .map_err(|_| io::Error::other("toolchain output lock poisoned"))?;
        let mut output = String::from_utf8_lossy(&bytes).into_owned();

        if timed_out {
            let deadline = self.deadline.unwrap_or_default();
            output.push_str(&format!(
                "\ntoolchain killed after exceeding the {}s deadline\n",
                deadline.as_secs_f64()
            ));
        }

        Ok(Invocation { success, output })
    }
}

/// The inherited process environment with `GOOS`/`GOARCH` replaced by the
/// target's values.
fn target_env(target: &Target) -> Vec<(OsString, OsString)> {
    let mut env: Vec<(OsString, OsString)> = std::env::vars_os()
        .filter(|(key, _)| key != OsStr::new("GOOS") && key != OsStr::new("GOARCH"))
        .collect();
    env.push(("GOOS".into(), target.platform.as_str().into()));
    env.push(("GOARCH".into(), target.arch.as_str().into()));
    env
}

fn spawn_drain<R: Read + Send + 'static>(
    mut stream: R,
    sink: Arc<Mutex<Vec<u8>>>,
) -> std::thread::JoinHandle<io::Result<()>> {
    std::thread::spawn(move || {
        let mut chunk = [0u8; 8192];
        loop {
            let n = stream.read(&mut chunk)?;
            if n == 0 {
                return Ok(());
            }
            let mut sink = sink
                .lock()
                .map_err(|_| io::Error::other("toolchain output lock poisoned"))?;
            sink.extend_from_slice(&chunk[..n]);
        }
    })
}
