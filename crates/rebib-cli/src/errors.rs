//! Error types for the rebib CLI.
//!
//! The library folds every recoverable failure into the pipeline's run
//! report, so the CLI only has to represent the two fatal outcomes. Either
//! one maps to a non-zero process exit code.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that end a CLI invocation with a non-zero exit code.
#[derive(Error, Debug)]
pub enum RebibCliError {
  /// The input bibliography could not be read.
  #[error("failed to parse {0}")]
  ParseFailed(PathBuf),

  /// The converted bibliography could not be written.
  #[error("failed to write {0}")]
  WriteFailed(PathBuf),
}
