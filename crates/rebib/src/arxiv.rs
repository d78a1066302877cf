//! Detection of arXiv references and extraction of arXiv identifiers.
//!
//! BibTeX entries exported from arXiv carry the preprint's identity in
//! inconsistent places: sometimes a full `url`, sometimes an `arXiv:2301.07041`
//! marker in the `journal` field, sometimes a bare `abs/2301.07041` in
//! `volume`. [`classify`] inspects all three and is used identically by the
//! parser (to tag records) and by the pipeline (to decide whether a record is
//! worth looking up).

use super::*;

lazy_static! {
  /// Full URL form, e.g. "https://arxiv.org/abs/2301.07041" or a /pdf/ link.
  static ref ARXIV_URL: Regex = Regex::new(r"arxiv\.org/(?:abs|pdf)/([^\s/]+)").unwrap();
  /// Prefixed form, e.g. "arxiv:2301.07041".
  static ref ARXIV_PREFIX: Regex = Regex::new(r"arxiv:(\d+\.\d+)").unwrap();
  /// Bare abstract path, e.g. "abs/2301.07041".
  static ref ARXIV_ABS: Regex = Regex::new(r"abs/(\d+\.\d+)").unwrap();
}

/// Classifies an entry's raw `url`, `journal`, and `volume` field text.
///
/// Returns whether the entry is arXiv-derived (case-insensitive "arxiv"
/// substring in any of the three) and the extracted identifier, if one of the
/// known patterns matched. The identifier can be absent even when the flag is
/// set; such entries are candidates without a usable lookup key and are kept
/// unchanged by the pipeline.
pub fn classify(
  url: Option<&str>,
  journal: Option<&str>,
  volume: Option<&str>,
) -> (bool, Option<String>) {
  let lowered: Vec<String> =
    [url, journal, volume].into_iter().flatten().map(|text| text.to_lowercase()).collect();

  if !lowered.iter().any(|text| text.contains("arxiv")) {
    return (false, None);
  }
  (true, extract_id(&lowered))
}

/// Tries each known identifier pattern against each field text, in order.
/// First field wins, and within a field the URL form wins over the prefixed
/// and bare forms.
fn extract_id(texts: &[String]) -> Option<String> {
  for text in texts {
    for pattern in [&*ARXIV_URL, &*ARXIV_PREFIX, &*ARXIV_ABS] {
      if let Some(caps) = pattern.captures(text) {
        return Some(caps[1].to_string());
      }
    }
  }
  None
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_classify_from_url() {
    let (from_arxiv, id) = classify(Some("https://arxiv.org/abs/2301.12345"), None, None);
    assert!(from_arxiv);
    assert_eq!(id.as_deref(), Some("2301.12345"));
  }

  #[test]
  fn test_classify_from_pdf_url() {
    let (from_arxiv, id) = classify(Some("https://arxiv.org/pdf/1706.03762v5"), None, None);
    assert!(from_arxiv);
    assert_eq!(id.as_deref(), Some("1706.03762v5"));
  }

  #[test]
  fn test_classify_from_journal_prefix() {
    let (from_arxiv, id) = classify(None, Some("arXiv:1706.03762"), None);
    assert!(from_arxiv);
    assert_eq!(id.as_deref(), Some("1706.03762"));
  }

  #[test]
  fn test_classify_from_bare_abs_in_volume() {
    let (from_arxiv, id) = classify(None, Some("arXiv preprints"), Some("abs/2105.00001"));
    assert!(from_arxiv);
    assert_eq!(id.as_deref(), Some("2105.00001"));
  }

  #[test]
  fn test_first_field_wins() {
    let (_, id) =
      classify(Some("https://arxiv.org/abs/2301.00001"), Some("arxiv:1999.99999"), None);
    assert_eq!(id.as_deref(), Some("2301.00001"));
  }

  #[test]
  fn test_flagged_without_identifier() {
    let (from_arxiv, id) = classify(None, Some("arXiv preprint"), None);
    assert!(from_arxiv);
    assert_eq!(id, None);
  }

  #[test]
  fn test_not_arxiv() {
    let (from_arxiv, id) =
      classify(Some("https://doi.org/10.1145/1327452.1327492"), Some("CACM"), Some("51"));
    assert!(!from_arxiv);
    assert_eq!(id, None);
  }

  #[test]
  fn test_no_fields_at_all() {
    assert_eq!(classify(None, None, None), (false, None));
  }
}
