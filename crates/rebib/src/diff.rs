//! Structural comparison of two bibliography records sharing a citation key.
//!
//! The diff engine reports a type change plus added, removed, and modified
//! fields. Comparison is by field name, not position, and field values are
//! compared by exact string equality. An all-empty comparison is represented
//! as the absence of a diff rather than an empty one, which is what lets the
//! pipeline count "replaced but unchanged" records separately.

use super::*;

/// The old and new value of a field that changed.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
  /// Value in the original record.
  pub from: String,
  /// Value in the replacement record.
  pub to:   String,
}

/// The structural delta between an original record and its replacement.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDiff {
  /// Old and new entry type, when they differ.
  pub type_change: Option<(EntryType, EntryType)>,
  /// Fields present only in the replacement.
  pub added:       IndexMap<String, String>,
  /// Fields present only in the original.
  pub removed:     IndexMap<String, String>,
  /// Fields present in both with different values.
  pub modified:    IndexMap<String, FieldChange>,
}

/// Compares two records field by field.
///
/// Returns `None` when nothing differs. A field name can never appear in both
/// `added` and `removed` for the same comparison.
pub fn diff(old: &Record, new: &Record) -> Option<RecordDiff> {
  let mut changes = RecordDiff {
    type_change: None,
    added:       IndexMap::new(),
    removed:     IndexMap::new(),
    modified:    IndexMap::new(),
  };

  if old.entry_type != new.entry_type {
    changes.type_change = Some((old.entry_type, new.entry_type));
  }

  for (name, new_value) in &new.fields {
    match old.fields.get(name) {
      None => {
        changes.added.insert(name.clone(), new_value.clone());
      },
      Some(old_value) if old_value != new_value => {
        changes
          .modified
          .insert(name.clone(), FieldChange { from: old_value.clone(), to: new_value.clone() });
      },
      Some(_) => {},
    }
  }

  for (name, old_value) in &old.fields {
    if !new.fields.contains_key(name) {
      changes.removed.insert(name.clone(), old_value.clone());
    }
  }

  if changes.is_empty() {
    None
  } else {
    Some(changes)
  }
}

impl RecordDiff {
  /// Whether no category recorded any change.
  fn is_empty(&self) -> bool {
    self.type_change.is_none()
      && self.added.is_empty()
      && self.removed.is_empty()
      && self.modified.is_empty()
  }

  /// Renders the diff as plain text for log output, one line per field.
  pub fn render_log(&self, citation_key: &str) -> String {
    let mut lines = vec![format!("Changes for {citation_key}:")];
    if let Some((from, to)) = &self.type_change {
      lines.push(format!("  type: {from}  ->  {to}"));
    }
    if !self.added.is_empty() {
      lines.push("  added fields:".to_string());
      for (name, value) in &self.added {
        lines.push(format!("    + {name}: {value}"));
      }
    }
    if !self.removed.is_empty() {
      lines.push("  removed fields:".to_string());
      for (name, value) in &self.removed {
        lines.push(format!("    - {name}: {value}"));
      }
    }
    if !self.modified.is_empty() {
      lines.push("  modified fields:".to_string());
      for (name, change) in &self.modified {
        lines.push(format!("    * {name}: {}  ->  {}", change.from, change.to));
      }
    }
    lines.join("\n")
  }

  /// Renders the diff as a Markdown section for the change report.
  ///
  /// The section is headed by the citation key and a resolved title (the old
  /// record's title, falling back to the new record's, falling back to a
  /// placeholder) and ends with a blank line so that sections concatenate
  /// cleanly into one report.
  pub fn render_markdown(&self, citation_key: &str, old: &Record, new: &Record) -> String {
    let title = old.field("title").or_else(|| new.field("title")).unwrap_or("(no title)");

    let mut lines = vec![format!("### `{citation_key}` — {title}")];
    if let Some((from, to)) = &self.type_change {
      lines.push(format!("- **Type:** `{from}` → `{to}`"));
    }
    if !self.added.is_empty() {
      lines.push("- **Added fields:**".to_string());
      for (name, value) in &self.added {
        lines.push(format!("  - `{name}`: `{value}`"));
      }
    }
    if !self.removed.is_empty() {
      lines.push("- **Removed fields:**".to_string());
      for (name, value) in &self.removed {
        lines.push(format!("  - `{name}`: `{value}`"));
      }
    }
    if !self.modified.is_empty() {
      lines.push("- **Modified fields:**".to_string());
      for (name, change) in &self.modified {
        lines.push(format!("  - `{name}`: `{}` → `{}`", change.from, change.to));
      }
    }
    lines.push(String::new());
    lines.join("\n")
  }
}
