//! Bosque toolchain invocation: compile a cell to JavaScript, run it under
//! Node.js, and capture the output of whichever stage finished last.
//!
//! Child processes are acquired with scoped semantics: every exit path
//! (normal completion, timeout, interrupt, error) either reaps the child or
//! drops its handle with `kill_on_drop` set, so no orphan survives the call.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::debug;

use crate::config::KernelSettings;

#[derive(Debug, Error)]
pub enum WrapperError {
    #[error("executable '{0}' not found")]
    CompilerNotFound(String),

    #[error("failed to launch '{command}': {source}")]
    ProcessLaunchFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("workspace I/O error: {0}")]
    WorkspaceIo(#[from] std::io::Error),

    #[error("compilation produced no runnable output in '{}'", .0.display())]
    OutputMissing(PathBuf),
}

/// Captured exit state of one toolchain invocation. Consumed immediately by
/// the result adapter, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResult {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

impl ProcessResult {
    fn from_output(output: std::process::Output) -> Self {
        Self {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            timed_out: false,
        }
    }

    fn expired() -> Self {
        Self {
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
            timed_out: true,
        }
    }
}

/// Ties an in-flight execution to interrupt requests.
///
/// `finalize` flips exactly once, whichever of normal-exit collection or
/// interrupt delivery gets there first. A late `interrupt` is a no-op, so
/// termination cannot race result collection.
#[derive(Debug, Default)]
pub struct ExecutionGuard {
    finalized: AtomicBool,
    interrupted: AtomicBool,
    notify: Notify,
}

impl ExecutionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request termination of the in-flight child. Idempotent; no-op once
    /// the result has been collected.
    pub fn interrupt(&self) {
        if self.finalized.load(Ordering::SeqCst) {
            return;
        }
        self.interrupted.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    /// Mark the result as collected. Returns `true` for the caller that won.
    pub fn finalize(&self) -> bool {
        self.finalized
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    async fn cancelled(&self) {
        loop {
            // Register before the flag check so a concurrent interrupt
            // cannot slip between them.
            let notified = self.notify.notified();
            if self.is_interrupted() {
                return;
            }
            notified.await;
        }
    }
}

/// Runs the Bosque toolchain for one cell.
///
/// Executable paths are resolved once at construction from explicit
/// settings; there is no shared mutable state across calls.
#[derive(Debug, Clone)]
pub struct BosqueWrapper {
    bosque_exe: PathBuf,
    node_exe: PathBuf,
    main_js_filename: String,
}

impl BosqueWrapper {
    pub fn new(settings: &KernelSettings) -> Result<Self, WrapperError> {
        let bosque_exe = resolve_executable(&settings.bosque_command)
            .ok_or_else(|| WrapperError::CompilerNotFound(settings.bosque_command.clone()))?;
        let node_exe = resolve_executable(&settings.node_command)
            .ok_or_else(|| WrapperError::CompilerNotFound(settings.node_command.clone()))?;
        debug!(
            bosque = %bosque_exe.display(),
            node = %node_exe.display(),
            "toolchain resolved"
        );
        Ok(Self {
            bosque_exe,
            node_exe,
            main_js_filename: settings.main_js_filename.clone(),
        })
    }

    /// Compile `source_text` and run the produced module, all inside
    /// `work_dir`, under a single deadline of `timeout`.
    ///
    /// A compile failure returns the compile stage's result; otherwise the
    /// execute stage's result is returned. Timeouts and interrupts come back
    /// as a `timed_out` result rather than an error so the caller can render
    /// them as diagnostics.
    pub async fn run(
        &self,
        source_text: &str,
        timeout: Duration,
        work_dir: &Path,
        guard: &ExecutionGuard,
    ) -> Result<ProcessResult, WrapperError> {
        let deadline = Instant::now() + timeout;

        let source_path = work_dir.join("source.bsq");
        tokio::fs::write(&source_path, source_text).await?;

        let compile = self
            .run_stage(&self.bosque_exe, &source_path, work_dir, deadline, guard)
            .await;
        // The source file never outlives the compile stage.
        let _ = tokio::fs::remove_file(&source_path).await;
        let compile = compile?;
        debug!(exit_code = ?compile.exit_code, timed_out = compile.timed_out, "compile stage done");

        if compile.timed_out || compile.exit_code != Some(0) {
            return Ok(compile);
        }

        let main_js = self.find_main_js(&work_dir.join("jsout"))?;
        let executed = self
            .run_stage(&self.node_exe, &main_js, work_dir, deadline, guard)
            .await?;
        debug!(exit_code = ?executed.exit_code, timed_out = executed.timed_out, "execute stage done");
        Ok(executed)
    }

    async fn run_stage(
        &self,
        program: &Path,
        script: &Path,
        work_dir: &Path,
        deadline: Instant,
        guard: &ExecutionGuard,
    ) -> Result<ProcessResult, WrapperError> {
        if Instant::now() >= deadline || guard.is_interrupted() {
            return Ok(ProcessResult::expired());
        }

        let mut cmd = Command::new(program);
        cmd.arg(script)
            .current_dir(work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => {
                WrapperError::CompilerNotFound(program.display().to_string())
            }
            _ => WrapperError::ProcessLaunchFailed {
                command: program.display().to_string(),
                source,
            },
        })?;

        // Dropping the unfinished wait future kills the child (kill_on_drop),
        // so the timeout and interrupt arms cannot leak a process.
        tokio::select! {
            output = child.wait_with_output() => {
                Ok(ProcessResult::from_output(output.map_err(WrapperError::WorkspaceIo)?))
            }
            _ = tokio::time::sleep_until(deadline) => {
                debug!(program = %program.display(), "stage killed on timeout");
                Ok(ProcessResult::expired())
            }
            _ = guard.cancelled() => {
                debug!(program = %program.display(), "stage killed on interrupt");
                Ok(ProcessResult::expired())
            }
        }
    }

    /// Locate the entry module in the compiler's output directory, falling
    /// back to any `.mjs`/`.js` file when the expected name is absent.
    fn find_main_js(&self, output_dir: &Path) -> Result<PathBuf, WrapperError> {
        let preferred = output_dir.join(&self.main_js_filename);
        if preferred.is_file() {
            return Ok(preferred);
        }

        let mut candidates: Vec<PathBuf> = std::fs::read_dir(output_dir)
            .map_err(|_| WrapperError::OutputMissing(output_dir.to_path_buf()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                matches!(
                    p.extension().and_then(|e| e.to_str()),
                    Some("mjs") | Some("js")
                )
            })
            .collect();
        candidates.sort();

        candidates
            .into_iter()
            .next()
            .ok_or_else(|| WrapperError::OutputMissing(output_dir.to_path_buf()))
    }
}

/// Resolve a command to an executable path: explicit paths are checked
/// directly, bare names are searched on PATH.
pub fn resolve_executable(command: &str) -> Option<PathBuf> {
    let as_path = Path::new(command);
    if as_path.components().count() > 1 {
        return as_path.is_file().then(|| as_path.to_path_buf());
    }

    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(command))
        .find(|candidate| candidate.is_file())
}
