//! Invocation of the external ASP solver.
//!
//! The solver is a black box consulted over a process boundary: facts go in
//! as a logic-program file, a transcript comes back on stdout. Each query
//! runs under a bounded wait; expiry is reported as `Timeout` and is
//! retryable by re-invocation, the board is never touched.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::ValueEnum;
use thiserror::Error;
use tokio::{fs, process::Command, time::timeout};
use tracing::{debug, instrument};

use crate::transcript::{Transcript, parse_transcript};

/// Which rule programs are consulted each round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Only the conservative program that derives `certain-safe` atoms.
    Strict,
    /// Both programs; the broader one enumerates `candidate-safe` models.
    Broad,
}

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("solver returned no usable recommendation")]
    NoSafeMoveFound,
    #[error("solver reported UNSATISFIABLE against a supposedly consistent encoding:\n{transcript}")]
    Inconsistency { transcript: String },
    #[error("solver did not answer within {}s", .limit.as_secs())]
    Timeout { limit: Duration },
    #[error("failed to run solver `{command}`")]
    Spawn {
        command: String,
        source: std::io::Error,
    },
    #[error("failed to write facts file `{}`", .path.display())]
    FactsIo {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Everything needed to run one round of solver queries.
#[derive(Debug, Clone)]
pub struct OracleConfig {
    /// Solver executable, clingo-compatible.
    pub solver: PathBuf,
    /// Rule program deriving `certain-safe` atoms.
    pub strict_rules: PathBuf,
    /// Rule program enumerating `candidate-safe` models.
    pub broad_rules: PathBuf,
    /// Where the fact program is written before each query.
    pub facts_file: PathBuf,
    /// Wall-clock budget per solver query.
    pub limit: Duration,
    pub mode: Mode,
}

impl OracleConfig {
    /// Writes the facts file (regenerated in full, never appended) and
    /// queries the configured rule programs. Transcripts come back in fixed
    /// precedence order, strict first, regardless of which query finished
    /// first; in `Broad` mode the two queries run concurrently over the
    /// same read-only facts.
    #[instrument(level = "debug", skip(self, facts))]
    pub async fn consult(&self, facts: &str) -> Result<Vec<Transcript>, OracleError> {
        fs::write(&self.facts_file, facts)
            .await
            .map_err(|source| OracleError::FactsIo {
                path: self.facts_file.clone(),
                source,
            })?;

        match self.mode {
            Mode::Strict => Ok(vec![self.run_program(&self.strict_rules).await?]),
            Mode::Broad => {
                let (strict, broad) = tokio::join!(
                    self.run_program(&self.strict_rules),
                    self.run_program(&self.broad_rules),
                );
                Ok(vec![strict?, broad?])
            }
        }
    }

    /// Runs `solver 0 <rules> <facts>` and parses its stdout. The leading 0
    /// asks for all answer models. Solver exit codes are not status codes
    /// (clingo exits non-zero on SAT), so only spawn failures are errors.
    async fn run_program(&self, rules: &Path) -> Result<Transcript, OracleError> {
        let mut command = Command::new(&self.solver);
        command.arg("0").arg(rules).arg(&self.facts_file);
        debug!("Consulting solver: {:?}", command);

        let output = timeout(self.limit, command.output())
            .await
            .map_err(|_| OracleError::Timeout { limit: self.limit })?
            .map_err(|source| OracleError::Spawn {
                command: format!("{} 0 {} {}",
                    self.solver.display(),
                    rules.display(),
                    self.facts_file.display()
                ),
                source,
            })?;

        Ok(parse_transcript(&String::from_utf8_lossy(&output.stdout)))
    }
}
