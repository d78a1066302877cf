//! The conversion pipeline: parse, look up, diff, write.
//!
//! One pass over the parsed records in document order, no backtracking.
//! Records that are not arXiv candidates pass through untouched; candidates
//! go through a DBLP lookup, and a hit replaces the original (under the
//! original citation key) while a miss keeps it. Only an unreadable input or
//! an unwritable primary output ends the run with a non-ok outcome; the
//! optional diff report is best-effort and never masks a successful
//! conversion.

use super::*;

/// Aggregate counters for one conversion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
  /// Entries parsed from the input file.
  pub total_records:    usize,
  /// Entries flagged as arXiv-derived with an extractable identifier.
  pub arxiv_candidates: usize,
  /// Candidates for which DBLP returned a replacement record.
  pub replaced:         usize,
  /// Replacements that were structurally identical to the original.
  pub unchanged:        usize,
  /// Candidates for which the lookup resolved to a miss.
  pub no_match:         usize,
  /// Replacements that differed from the original.
  pub diff_count:       usize,
}

/// Terminal state of a conversion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
  /// The primary output was written. Lookup misses do not prevent this.
  Completed,
  /// The input file could not be read; no output was produced.
  ParseFailed,
  /// The primary output could not be written.
  WriteFailed,
}

/// What one conversion run produced: a terminal outcome plus whatever
/// statistics had been accumulated when it was reached.
#[derive(Debug)]
pub struct RunReport {
  /// How the run ended.
  pub outcome: RunOutcome,
  /// Counters gathered up to the point the run ended.
  pub stats:   RunStats,
}

impl RunReport {
  /// Whether the run completed and the primary output exists.
  pub fn is_ok(&self) -> bool { self.outcome == RunOutcome::Completed }
}

/// Runs the full conversion over one file.
///
/// Parses `input`, replaces arXiv entries with DBLP records where possible,
/// writes the result to `output`, and optionally writes a Markdown change
/// report to `diff_report`. Never panics and never returns an error: failures
/// are folded into the report's outcome so the caller gets statistics in
/// every case.
pub async fn run(
  client: &DblpClient,
  input: &Path,
  output: &Path,
  diff_report: Option<&Path>,
) -> RunReport {
  let mut stats = RunStats::default();

  let original_records = match bibtex::parse_file(input) {
    Ok(records) => records,
    Err(e) => {
      error!("parsing failed for {}: {e}", input.display());
      return RunReport { outcome: RunOutcome::ParseFailed, stats };
    },
  };
  stats.total_records = original_records.len();

  let mut converted = Vec::with_capacity(original_records.len());
  let mut report_sections = Vec::new();

  for record in original_records {
    let arxiv_id = if record.from_arxiv { record.arxiv_id.clone() } else { None };
    let Some(arxiv_id) = arxiv_id else {
      if record.from_arxiv {
        warn!(
          "entry {} mentions arXiv but has no extractable identifier, keeping as-is",
          record.citation_key
        );
      }
      converted.push(record);
      continue;
    };

    stats.arxiv_candidates += 1;
    info!("looking up: {}", record.field("title").unwrap_or("No title"));

    match client.lookup(&arxiv_id, &record.citation_key).await {
      Some(replacement) => {
        match diff::diff(&record, &replacement) {
          Some(changes) => {
            stats.diff_count += 1;
            info!("\n{}", changes.render_log(&record.citation_key));
            if diff_report.is_some() {
              report_sections.push(changes.render_markdown(
                &record.citation_key,
                &record,
                &replacement,
              ));
            }
          },
          None => {
            stats.unchanged += 1;
            info!("no changes for {}", record.citation_key);
          },
        }
        stats.replaced += 1;
        converted.push(replacement);
      },
      None => {
        stats.no_match += 1;
        converted.push(record);
      },
    }
  }

  if let Err(e) = bibtex::write_file(output, &converted) {
    error!("writing output failed for {}: {e}", output.display());
    return RunReport { outcome: RunOutcome::WriteFailed, stats };
  }

  // Best-effort: a report that cannot be written must not mask a successful
  // conversion.
  if let Some(report_path) = diff_report {
    if let Err(e) = write_report(report_path, &report_sections) {
      error!("failed to write diff report {}: {e}", report_path.display());
    }
  }

  RunReport { outcome: RunOutcome::Completed, stats }
}

/// Writes the Markdown change report, or its placeholder body when the run
/// produced no diffs.
fn write_report(path: &Path, sections: &[String]) -> Result<(), RebibError> {
  let body = if sections.is_empty() {
    "# BibTeX Changes Report\n\nNo changes found.\n".to_string()
  } else {
    format!("# BibTeX Changes Report\n\n{}", sections.join("\n"))
  };
  std::fs::write(path, body)?;
  info!("wrote diff report to {}", path.display());
  Ok(())
}
