//! Error taxonomy and exit-status mapping.
//!
//! Every failure category is represented as a distinct variant; the
//! orchestrator maps each to its exit status exactly once, in `main`.
//! Usage errors never reach this type: clap reports them before the
//! pipeline starts and the entry point exits 1.

use std::{io, path::PathBuf};

use mdpipe_lua::FilterError;
use thiserror::Error;

/// Exit status for a filter that fails to load or compile.
pub const EXIT_FILTER_LOAD: i32 = 3;

/// Exit status for a filter that raises during invocation.
pub const EXIT_FILTER_RUNTIME: i32 = 5;

/// Fatal pipeline failures. Each is reported once on stderr and
/// terminates the run; there is no recovery and no partial output.
#[derive(Debug, Error)]
pub enum PipelineError {
  /// A named input could not be opened or read, or output could not be
  /// written.
  #[error("Error opening file {}: {source}", path.display())]
  Io { path: PathBuf, source: io::Error },

  /// A filter script failed to load, compile, or evaluate to a function.
  #[error("{0}")]
  FilterLoad(String),

  /// A filter function raised while running against the document.
  #[error("Error running filter {}: {message}", filter.display())]
  FilterRuntime { filter: PathBuf, message: String },
}

impl PipelineError {
  /// The process exit status for this failure.
  #[must_use]
  pub const fn exit_code(&self) -> i32 {
    match self {
      Self::Io { .. } => 1,
      Self::FilterLoad(_) => EXIT_FILTER_LOAD,
      Self::FilterRuntime { .. } => EXIT_FILTER_RUNTIME,
    }
  }
}

impl From<FilterError> for PipelineError {
  fn from(err: FilterError) -> Self {
    match err {
      FilterError::Load(message) => Self::FilterLoad(message),
      FilterError::Runtime { filter, message } => {
        Self::FilterRuntime { filter, message }
      },
    }
  }
}
