//! A library for replacing arXiv preprint citations in BibTeX files with their
//! peer-reviewed counterparts from DBLP.
//!
//! Given a `.bib` file, the library parses each entry, detects entries that
//! reference arXiv, looks the arXiv identifier up on DBLP, and swaps in the
//! published record while keeping the original citation key. A structural diff
//! of every replacement is available for logging and reporting.
//!
//! # Example
//! ```rust,no_run
//! use std::path::Path;
//!
//! use rebib::{pipeline, DblpClient};
//!
//! #[tokio::main]
//! async fn main() {
//!   let client = DblpClient::new();
//!   let report =
//!     pipeline::run(&client, Path::new("refs.bib"), Path::new("output.bib"), None).await;
//!   println!("Replaced {} entries", report.stats.replaced);
//! }
//! ```

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::{path::Path, time::Duration};

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

pub mod arxiv;
pub mod bibtex;
pub mod dblp;
pub mod diff;
pub mod errors;
pub mod pipeline;
pub mod record;
#[cfg(test)] mod tests;

use errors::RebibError;
use record::{EntryType, Record};

pub use crate::{
  dblp::DblpClient,
  pipeline::{RunOutcome, RunReport, RunStats},
};
