//! One-shot execution of a Bosque source file.

use std::io::Read;

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use owo_colors::OwoColorize;

use bosque_kernel::adapter::ExecutionOutcome;
use bosque_kernel::config::KernelSettings;
use bosque_kernel::kernel::KernelSession;

/// Execute `file` (or stdin for "-") once and print the outcome. Returns
/// the process exit code: 0 for success/stream outcomes, 1 for failures.
pub async fn run(file: &str, settings: KernelSettings) -> Result<i32> {
    let code = if file == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read source from stdin")?;
        buf
    } else {
        std::fs::read_to_string(file).with_context(|| format!("failed to read {file}"))?
    };

    let session = KernelSession::new(settings)?;
    let (_, outcome) = session.execute(&code).await;

    match outcome {
        ExecutionOutcome::Success { text, .. } | ExecutionOutcome::Stream { text, .. } => {
            print!("{text}");
            Ok(0)
        }
        ExecutionOutcome::Failure {
            message,
            line,
            column,
        } => {
            let position = match (line, column) {
                (Some(l), Some(c)) => format!("{l}:{c}: "),
                _ => String::new(),
            };
            if std::io::stderr().is_terminal() {
                eprintln!("{}{}", position.yellow(), message.red());
            } else {
                eprintln!("{position}{message}");
            }
            Ok(1)
        }
    }
}
