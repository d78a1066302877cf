//! Bibliography record types shared by every stage of the conversion.
//!
//! A [`Record`] is the unit of data flowing through the system: the parser
//! produces them, the DBLP client produces replacements for them, the diff
//! engine compares them, and the writer serializes them. Records are never
//! mutated in place; the pipeline only chooses which record to carry forward.

use super::*;

/// The closed set of BibTeX entry kinds recognized by the converter.
///
/// Any name outside this set, whether from a source file or from a DBLP
/// response, is normalized to [`EntryType::Misc`].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum EntryType {
  /// A journal article.
  Article,
  /// A book with an explicit publisher.
  Book,
  /// A bound work without a named publisher.
  Booklet,
  /// A conference paper (alias of `inproceedings`).
  Conference,
  /// A part of a book, such as a chapter.
  InBook,
  /// A titled part of a book with its own author.
  InCollection,
  /// A paper published in conference proceedings.
  InProceedings,
  /// Technical documentation.
  Manual,
  /// A master's thesis.
  MastersThesis,
  /// Anything that does not fit the other kinds.
  Misc,
  /// A PhD thesis.
  PhdThesis,
  /// The proceedings of a conference.
  Proceedings,
  /// A report published by an institution.
  TechReport,
  /// A document that has not been formally published.
  Unpublished,
}

impl EntryType {
  /// Normalizes an entry type name, falling back to [`EntryType::Misc`] for
  /// anything outside the recognized set. Matching is case-insensitive.
  pub fn from_name(name: &str) -> Self {
    match name.to_lowercase().as_str() {
      "article" => EntryType::Article,
      "book" => EntryType::Book,
      "booklet" => EntryType::Booklet,
      "conference" => EntryType::Conference,
      "inbook" => EntryType::InBook,
      "incollection" => EntryType::InCollection,
      "inproceedings" => EntryType::InProceedings,
      "manual" => EntryType::Manual,
      "mastersthesis" => EntryType::MastersThesis,
      "phdthesis" => EntryType::PhdThesis,
      "proceedings" => EntryType::Proceedings,
      "techreport" => EntryType::TechReport,
      "unpublished" => EntryType::Unpublished,
      _ => EntryType::Misc,
    }
  }
}

impl std::fmt::Display for EntryType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let name = match self {
      EntryType::Article => "article",
      EntryType::Book => "book",
      EntryType::Booklet => "booklet",
      EntryType::Conference => "conference",
      EntryType::InBook => "inbook",
      EntryType::InCollection => "incollection",
      EntryType::InProceedings => "inproceedings",
      EntryType::Manual => "manual",
      EntryType::MastersThesis => "mastersthesis",
      EntryType::Misc => "misc",
      EntryType::PhdThesis => "phdthesis",
      EntryType::Proceedings => "proceedings",
      EntryType::TechReport => "techreport",
      EntryType::Unpublished => "unpublished",
    };
    write!(f, "{name}")
  }
}

/// A single bibliography entry.
///
/// The `citation_key` is supplied by the source text and is never regenerated
/// or altered by any component; a replacement record fetched from DBLP carries
/// the original key, never the one DBLP uses internally. Field order follows
/// insertion order so that output formatting echoes input ordering for
/// unmodified records.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
  /// The entry kind, normalized against the recognized set.
  pub entry_type:   EntryType,
  /// The opaque identifier naming this entry within its file.
  pub citation_key: String,
  /// Field name to field value, in insertion order.
  pub fields:       IndexMap<String, String>,
  /// Whether the raw `url`/`journal`/`volume` text mentions arXiv.
  pub from_arxiv:   bool,
  /// The extracted arXiv identifier, when one of the known patterns matched.
  pub arxiv_id:     Option<String>,
}

impl Record {
  /// Returns the value of a field by name, if present.
  pub fn field(&self, name: &str) -> Option<&str> { self.fields.get(name).map(String::as_str) }

  /// Whether this record is eligible for a DBLP lookup: flagged as
  /// arXiv-derived with a successfully extracted identifier.
  ///
  /// A record can mention arXiv yet yield no identifier; such records are not
  /// candidates and are carried through unchanged.
  pub fn is_arxiv_candidate(&self) -> bool { self.from_arxiv && self.arxiv_id.is_some() }
}
