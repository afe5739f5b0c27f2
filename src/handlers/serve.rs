//! Host boundary: line-delimited JSON execution requests on stdin, one JSON
//! outcome per line on stdout. The Jupyter wire protocol itself lives in the
//! external host; this loop only adapts cells to outcomes.

use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use bosque_kernel::adapter::ExecutionOutcome;
use bosque_kernel::config::KernelSettings;
use bosque_kernel::kernel::{self, KernelSession};

#[derive(Debug, Deserialize)]
struct CellRequest {
    code: String,
}

#[derive(Debug, Serialize)]
struct CellReply<'a> {
    execution_count: u64,
    #[serde(flatten)]
    outcome: &'a ExecutionOutcome,
}

pub async fn run(settings: KernelSettings, connection_file: Option<&str>) -> Result<()> {
    if let Some(path) = connection_file {
        debug!(path, "connection file accepted (protocol handled by the host)");
    }

    let session = Arc::new(KernelSession::new(settings)?);
    info!(
        banner = kernel::BANNER,
        implementation = kernel::IMPLEMENTATION,
        version = kernel::IMPLEMENTATION_VERSION,
        language = session.language_info().name,
        "kernel session ready"
    );

    // Notebook interrupts arrive as SIGINT; they must terminate the
    // in-flight child, never the kernel itself.
    let interrupter = Arc::clone(&session);
    tokio::spawn(async move {
        loop {
            if tokio::signal::ctrl_c().await.is_err() {
                break;
            }
            interrupter.interrupt();
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (execution_count, outcome) = match serde_json::from_str::<CellRequest>(line) {
            Ok(request) => {
                let (request, outcome) = session.execute(&request.code).await;
                (request.execution_count, outcome)
            }
            Err(err) => {
                warn!(%err, "malformed request line");
                (
                    session.execution_count(),
                    ExecutionOutcome::Failure {
                        message: format!("malformed request: {err}"),
                        line: None,
                        column: None,
                    },
                )
            }
        };

        let reply = CellReply {
            execution_count,
            outcome: &outcome,
        };
        let mut buf = serde_json::to_vec(&reply)?;
        buf.push(b'\n');
        stdout.write_all(&buf).await?;
        stdout.flush().await?;
    }

    info!("stdin closed, kernel shutting down");
    Ok(())
}
