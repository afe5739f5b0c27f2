//! Classification of captured process output into execution outcomes.
//!
//! `classify` is a pure function of one `ProcessResult`; calling it twice on
//! the same input yields the same outcome. Errors from the wrapper are also
//! folded into `Failure` outcomes here so no failure kind is fatal to the
//! kernel itself.

use serde::{Deserialize, Serialize};

use crate::wrapper::{ProcessResult, WrapperError};

pub const MIME_TEXT_PLAIN: &str = "text/plain";
pub const TIMEOUT_MESSAGE: &str = "execution timed out";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamChannel {
    Stdout,
    Stderr,
}

/// The terminal outcome of one cell execution, exactly one per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    /// Displayable result text.
    Success { text: String, mime_type: String },
    /// Raw stream text on one channel; an empty stdout stream signals a
    /// successful execution that produced no output.
    Stream { text: String, channel: StreamChannel },
    /// Diagnostic or error, with source position when the compiler reported
    /// one.
    Failure {
        message: String,
        line: Option<u32>,
        column: Option<u32>,
    },
}

pub fn classify(result: &ProcessResult) -> ExecutionOutcome {
    if result.timed_out {
        return ExecutionOutcome::Failure {
            message: TIMEOUT_MESSAGE.to_string(),
            line: None,
            column: None,
        };
    }

    match result.exit_code {
        Some(0) => {
            if result.stdout.is_empty() {
                ExecutionOutcome::Stream {
                    text: String::new(),
                    channel: StreamChannel::Stdout,
                }
            } else {
                ExecutionOutcome::Success {
                    text: result.stdout.clone(),
                    mime_type: MIME_TEXT_PLAIN.to_string(),
                }
            }
        }
        // Nonzero or signal exit: stderr wins even when stdout is non-empty,
        // so warnings-then-failure reads as a failure.
        code => match parse_diagnostic(&result.stderr) {
            Some((line, column, message)) => ExecutionOutcome::Failure {
                message,
                line: Some(line),
                column: Some(column),
            },
            None => ExecutionOutcome::Failure {
                message: if result.stderr.trim().is_empty() {
                    match code {
                        Some(n) => format!("process exited with status {n}"),
                        None => "process terminated by signal".to_string(),
                    }
                } else {
                    result.stderr.clone()
                },
                line: None,
                column: None,
            },
        },
    }
}

/// Fold a wrapper-level fault into a diagnostic outcome.
pub fn classify_error(err: &WrapperError) -> ExecutionOutcome {
    ExecutionOutcome::Failure {
        message: err.to_string(),
        line: None,
        column: None,
    }
}

/// Scan stderr for the first `<line>:<column>: <message>` diagnostic.
/// The message is preserved verbatim past the position prefix.
fn parse_diagnostic(stderr: &str) -> Option<(u32, u32, String)> {
    for raw in stderr.lines() {
        let trimmed = raw.trim_end();
        let Some((line_s, rest)) = trimmed.split_once(':') else {
            continue;
        };
        let Some((column_s, message)) = rest.split_once(':') else {
            continue;
        };
        let (Ok(line), Ok(column)) = (
            line_s.trim().parse::<u32>(),
            column_s.trim().parse::<u32>(),
        ) else {
            continue;
        };
        let message = message.strip_prefix(' ').unwrap_or(message);
        if message.is_empty() {
            continue;
        }
        return Some((line, column, message.to_string()));
    }
    None
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn completed(exit_code: i32, stdout: &str, stderr: &str) -> ProcessResult {
        ProcessResult {
            exit_code: Some(exit_code),
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            timed_out: false,
        }
    }

    #[test]
    fn stdout_becomes_success() {
        let outcome = classify(&completed(0, "42\n", ""));
        assert_eq!(
            outcome,
            ExecutionOutcome::Success {
                text: "42\n".to_string(),
                mime_type: "text/plain".to_string(),
            }
        );
    }

    #[test]
    fn empty_stdout_becomes_empty_stream() {
        let outcome = classify(&completed(0, "", ""));
        assert_eq!(
            outcome,
            ExecutionOutcome::Stream {
                text: String::new(),
                channel: StreamChannel::Stdout,
            }
        );
    }

    #[test]
    fn structured_diagnostic_is_extracted() {
        let outcome = classify(&completed(1, "", "3:10: unknown identifier 'x'"));
        assert_eq!(
            outcome,
            ExecutionOutcome::Failure {
                message: "unknown identifier 'x'".to_string(),
                line: Some(3),
                column: Some(10),
            }
        );
    }

    #[test]
    fn diagnostic_message_is_verbatim() {
        let outcome = classify(&completed(1, "", "12:4: expected ':' after  field"));
        assert_eq!(
            outcome,
            ExecutionOutcome::Failure {
                message: "expected ':' after  field".to_string(),
                line: Some(12),
                column: Some(4),
            }
        );
    }

    #[test]
    fn unstructured_stderr_is_kept_raw() {
        let outcome = classify(&completed(1, "", "segfault in backend\n"));
        assert_eq!(
            outcome,
            ExecutionOutcome::Failure {
                message: "segfault in backend\n".to_string(),
                line: None,
                column: None,
            }
        );
    }

    #[test]
    fn stderr_wins_over_stdout_on_nonzero_exit() {
        let outcome = classify(&completed(1, "partial output", "1:1: bad start"));
        assert_eq!(
            outcome,
            ExecutionOutcome::Failure {
                message: "bad start".to_string(),
                line: Some(1),
                column: Some(1),
            }
        );
    }

    #[test]
    fn timeout_becomes_failure() {
        let result = ProcessResult {
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
            timed_out: true,
        };
        assert_eq!(
            classify(&result),
            ExecutionOutcome::Failure {
                message: TIMEOUT_MESSAGE.to_string(),
                line: None,
                column: None,
            }
        );
    }

    #[test]
    fn silent_nonzero_exit_reports_status() {
        let outcome = classify(&completed(7, "", ""));
        assert_eq!(
            outcome,
            ExecutionOutcome::Failure {
                message: "process exited with status 7".to_string(),
                line: None,
                column: None,
            }
        );
    }

    #[test]
    fn classify_is_idempotent() {
        let result = completed(1, "", "3:10: unknown identifier 'x'");
        assert_eq!(classify(&result), classify(&result));
    }

    #[test]
    fn diagnostic_on_later_line_is_found() {
        let stderr = "compiling source.bsq\n8:2: missing semicolon\n";
        assert_eq!(
            parse_diagnostic(stderr),
            Some((8, 2, "missing semicolon".to_string()))
        );
    }

    #[test]
    fn non_numeric_prefix_is_not_a_diagnostic() {
        assert_eq!(parse_diagnostic("error: something else"), None);
        assert_eq!(parse_diagnostic("3:x: broken column"), None);
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let outcome = ExecutionOutcome::Failure {
            message: "boom".to_string(),
            line: Some(1),
            column: None,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "failure");
        assert_eq!(json["message"], "boom");
        assert_eq!(json["line"], 1);
    }
}
