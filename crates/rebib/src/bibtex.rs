//! The BibTeX grammar: parsing raw text into [`Record`]s and serializing
//! records back out.
//!
//! This is deliberately an ad hoc regex grammar rather than a conformant
//! BibTeX parser: entries take the form `@type{key, name = {value}, ...}` with
//! brace- or quote-delimited values, and there is no support for nested
//! braces, `@comment`, `@preamble`, or string macros. The whole grammar lives
//! in this one module so it can later be swapped for a real parser without
//! touching the record model or the pipeline.
//!
//! # Example
//! ```
//! let records = rebib::bibtex::parse_str(
//!   "@article{knuth1984,\n  title = {Literate Programming},\n  year = {1984}\n}\n",
//! );
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].citation_key, "knuth1984");
//! ```

use super::*;

lazy_static! {
  /// Matches the head of an entry: `@type{key,`.
  static ref ENTRY_HEADER: Regex = Regex::new(r"@(\w+)\s*\{\s*([^,]+),").unwrap();
  /// Matches one field assignment: `name = {value}` or `name = "value"`.
  static ref FIELD: Regex = Regex::new(r#"(\w+)\s*=\s*[{"]([^"}]+)["}]"#).unwrap();
}

/// Parses BibTeX text into an ordered sequence of records.
///
/// Entries are parsed independently and document order is preserved.
/// Unrecognized entry types are normalized to `misc` while the field body is
/// kept verbatim. Each record is tagged with its arXiv markers by running
/// [`arxiv::classify`] over the `url`, `journal`, and `volume` fields.
pub fn parse_str(content: &str) -> Vec<Record> {
  // Entry header positions delimit the bodies: a body runs from the end of its
  // header to the closing brace before the next header (or end of input).
  let headers: Vec<(String, String, usize, usize)> = ENTRY_HEADER
    .captures_iter(content)
    .map(|caps| {
      let whole = caps.get(0).unwrap();
      (caps[1].to_string(), caps[2].trim().to_string(), whole.start(), whole.end())
    })
    .collect();

  let mut records = Vec::with_capacity(headers.len());
  for (index, (type_name, citation_key, _, body_start)) in headers.iter().enumerate() {
    let body_end = headers.get(index + 1).map_or(content.len(), |next| next.2);
    let segment = &content[*body_start..body_end];
    let body = segment.rfind('}').map_or(segment, |close| &segment[..close]);

    let mut fields = IndexMap::new();
    for caps in FIELD.captures_iter(body) {
      fields.insert(caps[1].to_string(), caps[2].to_string());
    }

    let (from_arxiv, arxiv_id) = arxiv::classify(
      fields.get("url").map(String::as_str),
      fields.get("journal").map(String::as_str),
      fields.get("volume").map(String::as_str),
    );

    records.push(Record {
      entry_type: EntryType::from_name(type_name),
      citation_key: citation_key.clone(),
      fields,
      from_arxiv,
      arxiv_id,
    });
  }

  debug!("parsed {} entries", records.len());
  records
}

/// Reads and parses a BibTeX file.
///
/// # Errors
///
/// Returns [`RebibError::Io`] when the file cannot be read. An unreadable
/// source is fatal for the whole conversion; no partial document is returned.
pub fn parse_file(path: &Path) -> Result<Vec<Record>, RebibError> {
  let content = std::fs::read_to_string(path)?;
  let records = parse_str(&content);
  info!("parsed {} entries from {}", records.len(), path.display());
  Ok(records)
}

/// Serializes records to BibTeX text.
///
/// Each entry renders its fields as `name = {value},` lines with the trailing
/// comma removed from the last field, and entries are separated by a blank
/// line. Record order in the slice is output order; no record is omitted.
pub fn write_str(records: &[Record]) -> String {
  let mut output = String::new();
  for record in records {
    let mut lines = vec![format!("@{}{{{},", record.entry_type, record.citation_key)];
    for (name, value) in &record.fields {
      lines.push(format!("  {name} = {{{value}}},"));
    }
    if let Some(last) = lines.last_mut() {
      if last.ends_with(',') {
        last.pop();
      }
    }
    lines.push("}\n".to_string());
    output.push_str(&lines.join("\n"));
    output.push('\n');
  }
  output
}

/// Writes records to a BibTeX file.
///
/// # Errors
///
/// Returns [`RebibError::Io`] when the destination cannot be written.
pub fn write_file(path: &Path, records: &[Record]) -> Result<(), RebibError> {
  std::fs::write(path, write_str(records))?;
  info!("wrote {} entries to {}", records.len(), path.display());
  Ok(())
}
