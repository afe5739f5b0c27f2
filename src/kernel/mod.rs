//! Per-session execution state: work directory, execution counter, and
//! interrupt wiring. One session maps to one notebook kernel instance and
//! stays usable after every failure kind.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tempfile::TempDir;
use tracing::{debug, error};

use crate::adapter::{self, ExecutionOutcome};
use crate::config::KernelSettings;
use crate::wrapper::{BosqueWrapper, ExecutionGuard, WrapperError};

pub const IMPLEMENTATION: &str = "BosqueKernel";
pub const IMPLEMENTATION_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const BANNER: &str = "Bosque Language Kernel";
pub const INTERRUPT_MESSAGE: &str = "execution interrupted";

/// One cell-execute event: the raw source plus the sequence number echoed
/// back to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionRequest {
    pub code: String,
    pub execution_count: u64,
}

/// Static language metadata advertised to the host.
#[derive(Debug, Clone, Serialize)]
pub struct LanguageInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub mimetype: &'static str,
    pub file_extension: &'static str,
}

pub fn language_info() -> LanguageInfo {
    LanguageInfo {
        name: "bosque",
        version: "1.0",
        mimetype: "text/x-bosque",
        file_extension: ".bsq",
    }
}

#[derive(Debug)]
pub struct KernelSession {
    settings: KernelSettings,
    wrapper: BosqueWrapper,
    work_dir: TempDir,
    execution_count: AtomicU64,
    in_flight: Mutex<Option<Arc<ExecutionGuard>>>,
}

impl KernelSession {
    pub fn new(settings: KernelSettings) -> Result<Self, WrapperError> {
        let wrapper = BosqueWrapper::new(&settings)?;
        let work_dir = TempDir::with_prefix("bosque_kernel_")?;
        debug!(path = %work_dir.path().display(), "session work directory created");
        Ok(Self {
            settings,
            wrapper,
            work_dir,
            execution_count: AtomicU64::new(0),
            in_flight: Mutex::new(None),
        })
    }

    /// Execute one cell. Produces exactly one outcome per request; every
    /// failure kind comes back as a `Failure` outcome rather than an error
    /// so the session survives for the next cell.
    pub async fn execute(&self, code: &str) -> (ExecutionRequest, ExecutionOutcome) {
        let request = ExecutionRequest {
            code: code.to_string(),
            execution_count: self.execution_count.fetch_add(1, Ordering::SeqCst) + 1,
        };
        debug!(execution_count = request.execution_count, "cell execution started");

        let guard = Arc::new(ExecutionGuard::new());
        self.set_in_flight(Some(Arc::clone(&guard)));

        let run = self
            .wrapper
            .run(
                &request.code,
                self.settings.timeout,
                self.work_dir.path(),
                &guard,
            )
            .await;

        guard.finalize();
        self.set_in_flight(None);

        let outcome = match run {
            Ok(_) if guard.is_interrupted() => ExecutionOutcome::Failure {
                message: INTERRUPT_MESSAGE.to_string(),
                line: None,
                column: None,
            },
            Ok(result) => adapter::classify(&result),
            Err(err) => {
                error!(%err, "toolchain invocation failed");
                adapter::classify_error(&err)
            }
        };

        debug!(execution_count = request.execution_count, ?outcome, "cell execution finished");
        (request, outcome)
    }

    /// Kill the child tied to the in-flight request, if any. Safe to call
    /// at any time from any thread; a no-op once the result is collected.
    pub fn interrupt(&self) {
        let guard = self
            .in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        if let Some(guard) = guard {
            debug!("interrupt requested for in-flight execution");
            guard.interrupt();
        }
    }

    pub fn language_info(&self) -> LanguageInfo {
        language_info()
    }

    pub fn execution_count(&self) -> u64 {
        self.execution_count.load(Ordering::SeqCst)
    }

    fn set_in_flight(&self, guard: Option<Arc<ExecutionGuard>>) {
        *self.in_flight.lock().unwrap_or_else(|e| e.into_inner()) = guard;
    }
}
