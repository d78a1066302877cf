//! Error types for the rebib library.
//!
//! Only two failure modes are fatal for a conversion run: an unreadable input
//! file and an unwritable primary output. Everything that can go wrong while
//! talking to DBLP (network failures, bad status codes, unparseable bodies)
//! stays inside the lookup retry loop and degrades to a miss, so those
//! variants never escape [`DblpClient::lookup`](crate::DblpClient::lookup).

use thiserror::Error;

/// Errors that can occur while converting a bibliography file.
#[derive(Error, Debug)]
pub enum RebibError {
  /// Reading the input file or writing an output file failed.
  #[error(transparent)]
  Io(#[from] std::io::Error),

  /// A network request to the lookup service failed.
  #[error(transparent)]
  Network(#[from] reqwest::Error),

  /// The lookup service answered with a non-success status or an unparseable
  /// body.
  #[error("API error: {0}")]
  Api(String),
}
