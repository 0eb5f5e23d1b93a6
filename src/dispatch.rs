//! Fetch-and-classify dispatcher.
//!
//! The dispatcher makes one fetch attempt and reacts to its outcome. Only a
//! rate limit error is retried, exactly once, after waiting the duration the
//! error asks for. Every other error ends the run with a single advice line.
//! No run makes more than two attempts.

use std::io::{self, Write};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::error::FetchError;
use crate::fetch::{FetchOutcome, Fetcher, OutcomeKind};

pub const SUCCESS_LINE: &str = "Successfully fetched data.";
pub const RETRY_SUCCESS_LINE: &str = "Successfully fetched data on retry.";

/// Final status of a dispatch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchStatus {
    Success,
    Failure,
}

impl DispatchStatus {
    /// Process exit code for this status.
    pub fn exit_code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
        }
    }
}

/// Everything a dispatch run decided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    /// Final status.
    pub status: DispatchStatus,
    /// Fetch attempts made (1 or 2).
    pub attempts: u32,
    /// Kind of the last outcome observed.
    pub outcome: OutcomeKind,
    /// Status lines, in the order they were written.
    pub lines: Vec<String>,
    /// Message of the error that ended the run, if it failed.
    pub error: Option<String>,
}

impl DispatchReport {
    /// Writes the report as pretty-printed JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Serialize`] if the report cannot be encoded
    /// and [`DispatchError::ReportOutput`] if it cannot be written.
    pub fn write_json<W: Write>(&self, out: &mut W) -> Result<(), DispatchError> {
        let json = serde_json::to_string_pretty(self)?;
        writeln!(out, "{}", json)
            .and_then(|()| out.flush())
            .map_err(DispatchError::ReportOutput)
    }
}

/// Errors that abort a dispatch run or the output of its report.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("failed to write status line: {0}")]
    Output(#[from] io::Error),

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write report: {0}")]
    ReportOutput(io::Error),
}

/// Writes status lines to a sink as they are decided and keeps a copy.
struct StatusLog<'a, W> {
    out: &'a mut W,
    lines: Vec<String>,
}

impl<'a, W: Write> StatusLog<'a, W> {
    fn new(out: &'a mut W) -> Self {
        Self {
            out,
            lines: Vec::new(),
        }
    }

    fn emit(&mut self, line: impl Into<String>) -> io::Result<()> {
        let line = line.into();
        writeln!(self.out, "{}", line)?;
        self.out.flush()?;
        self.lines.push(line);
        Ok(())
    }
}

/// Runs one fetch and dispatches on its outcome.
pub struct Dispatcher<F> {
    fetcher: F,
}

impl<F: Fetcher> Dispatcher<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// Returns a reference to the underlying fetcher.
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn into_inner(self) -> F {
        self.fetcher
    }

    /// Performs the run, writing each status line to `out` as soon as it is
    /// known. The rate limit line is written before the wait starts.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Output`] if a status line cannot be written.
    /// Fetch errors never escape; they are reported in the returned
    /// [`DispatchReport`].
    pub async fn run<W: Write>(&mut self, out: &mut W) -> Result<DispatchReport, DispatchError> {
        let mut log = StatusLog::new(out);
        let mut attempts = 1;

        let first = self.attempt(attempts).await;
        let mut outcome = OutcomeKind::of(&first);

        let (status, error) = match first {
            Ok(()) => {
                log.emit(SUCCESS_LINE)?;
                (DispatchStatus::Success, None)
            }
            Err(err) => {
                log.emit(format!("Error: {}", err))?;
                match err {
                    FetchError::RateLimited { retry_after, .. } => {
                        log.emit(format!(
                            "Rate limit exceeded. Retry after {} seconds.",
                            retry_after.as_secs_f64()
                        ))?;
                        info!(
                            retry_after_ms = retry_after.as_millis() as u64,
                            "waiting before retry"
                        );
                        tokio::time::sleep(retry_after).await;

                        attempts += 1;
                        let retry = self.attempt(attempts).await;
                        outcome = OutcomeKind::of(&retry);
                        match retry {
                            Ok(()) => {
                                log.emit(RETRY_SUCCESS_LINE)?;
                                (DispatchStatus::Success, None)
                            }
                            Err(retry_err) => {
                                log.emit(format!("Error on retry: {}", retry_err))?;
                                log.emit(retry_err.advice())?;
                                (DispatchStatus::Failure, Some(retry_err))
                            }
                        }
                    }
                    other @ (FetchError::Network { .. }
                    | FetchError::InvalidResponse { .. }
                    | FetchError::Unknown { .. }) => {
                        log.emit(other.advice())?;
                        (DispatchStatus::Failure, Some(other))
                    }
                }
            }
        };

        info!(?status, attempts, %outcome, "dispatch finished");

        Ok(DispatchReport {
            status,
            attempts,
            outcome,
            lines: log.lines,
            error: error.map(|err| err.to_string()),
        })
    }

    async fn attempt(&mut self, attempt: u32) -> FetchOutcome {
        debug!(attempt, "fetching");
        let outcome = self.fetcher.fetch().await;
        if let Err(err) = &outcome {
            info!(
                attempt,
                category = %err.category(),
                hint = %err.recovery_hint(),
                error = %err,
                "fetch failed"
            );
        }
        outcome
    }
}
