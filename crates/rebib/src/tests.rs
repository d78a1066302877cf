//! End-to-end tests for the conversion pipeline, run against a stubbed DBLP
//! server and temporary files.

use mockito::{Matcher, Server, ServerGuard};
use tempfile::{tempdir, TempDir};
use tracing_test::traced_test;

use super::*;
use crate::{
  dblp::RetryPolicy,
  pipeline::{run, RunOutcome},
};

/// Entry A: a regular journal article with no arXiv connection.
const ENTRY_A: &str = "@article{smith2020,\n  \
  title = {A Study of Things},\n  \
  author = {Jane Smith},\n  \
  journal = {Nature},\n  \
  year = {2020}\n}\n";

/// Entry B: an arXiv preprint that DBLP knows under a published record.
const ENTRY_B: &str = "@misc{vaswani2017,\n  \
  title = {Attention Is All You Need},\n  \
  author = {Vaswani, Ashish and others},\n  \
  url = {https://arxiv.org/abs/1706.03762},\n  \
  year = {2017}\n}\n";

/// Entry C: an arXiv preprint with no DBLP match.
const ENTRY_C: &str = "@misc{ghost2024,\n  \
  title = {A Phantom Preprint},\n  \
  url = {https://arxiv.org/abs/9999.00001},\n  \
  year = {2024}\n}\n";

const HIT_BODY: &str = r#"{
  "result": {
    "hits": {
      "@total": "1",
      "hit": [
        {
          "info": {
            "type": "Conference and Workshop Papers",
            "key": "conf/nips/VaswaniSPUJGKP17",
            "authors": {
              "author": [
                { "@pid": "126/8172", "text": "Ashish Vaswani" },
                { "@pid": "64/9064", "text": "Noam Shazeer" }
              ]
            },
            "title": "Attention is All you Need.",
            "venue": "NIPS",
            "year": "2017"
          }
        }
      ]
    }
  }
}"#;

const MISS_BODY: &str = r#"{"result": {"hits": {"@total": "0"}}}"#;

fn query_matcher(arxiv_id: &str) -> Matcher {
  Matcher::AllOf(vec![
    Matcher::UrlEncoded("q".into(), arxiv_id.into()),
    Matcher::UrlEncoded("format".into(), "json".into()),
  ])
}

fn stub_client(server: &ServerGuard) -> DblpClient {
  DblpClient::with_params(
    &format!("{}/search/publ/api", server.url()),
    RetryPolicy { max_attempts: 5, base_delay: Duration::from_millis(1) },
  )
}

fn write_input(dir: &TempDir, content: &str) -> std::path::PathBuf {
  let path = dir.path().join("input.bib");
  std::fs::write(&path, content).unwrap();
  path
}

#[tokio::test]
async fn test_three_entry_scenario() {
  let mut server = Server::new_async().await;
  let _hit = server
    .mock("GET", "/search/publ/api")
    .match_query(query_matcher("1706.03762"))
    .with_status(200)
    .with_body(HIT_BODY)
    .create_async()
    .await;
  let _miss = server
    .mock("GET", "/search/publ/api")
    .match_query(query_matcher("9999.00001"))
    .with_status(200)
    .with_body(MISS_BODY)
    .create_async()
    .await;

  let dir = tempdir().unwrap();
  let input = write_input(&dir, &format!("{ENTRY_A}\n{ENTRY_B}\n{ENTRY_C}"));
  let output = dir.path().join("output.bib");
  let report_path = dir.path().join("changes.md");

  let client = stub_client(&server);
  let report = run(&client, &input, &output, Some(&report_path)).await;

  assert!(report.is_ok());
  assert_eq!(report.stats.total_records, 3);
  assert_eq!(report.stats.arxiv_candidates, 2);
  assert_eq!(report.stats.replaced, 1);
  assert_eq!(report.stats.unchanged, 0);
  assert_eq!(report.stats.no_match, 1);
  assert_eq!(report.stats.diff_count, 1);

  let written = std::fs::read_to_string(&output).unwrap();

  // A and C pass through byte-identical; B keeps its key but carries the
  // DBLP-sourced fields.
  assert!(written.contains(ENTRY_A));
  assert!(written.contains(ENTRY_C));
  assert!(written.contains("@misc{vaswani2017,"));
  assert!(written.contains("  title = {Attention is All you Need.},"));
  assert!(written.contains("  author = {Ashish Vaswani and Noam Shazeer}"));
  assert!(written.contains("  venue = {NIPS},"));
  assert!(!written.contains("conf/nips/VaswaniSPUJGKP17"));

  // Order follows the input document.
  let pos = |needle: &str| written.find(needle).unwrap();
  assert!(pos("@article{smith2020,") < pos("@misc{vaswani2017,"));
  assert!(pos("@misc{vaswani2017,") < pos("@misc{ghost2024,"));

  let changes = std::fs::read_to_string(&report_path).unwrap();
  assert!(changes.starts_with("# BibTeX Changes Report"));
  assert!(changes.contains("### `vaswani2017`"));
  assert!(!changes.contains("smith2020"));
  assert!(!changes.contains("ghost2024"));
}

#[tokio::test]
async fn test_identical_replacement_counts_as_unchanged() {
  let mut server = Server::new_async().await;
  let body = r#"{
    "result": {
      "hits": {
        "@total": "1",
        "hit": [
          {
            "info": {
              "type": "Informal Publications",
              "authors": { "author": { "text": "Donald E. Knuth" } },
              "title": "Literate Programming.",
              "url": "https://arxiv.org/abs/8401.00001",
              "year": "1984"
            }
          }
        ]
      }
    }
  }"#;
  let _mock = server
    .mock("GET", "/search/publ/api")
    .match_query(query_matcher("8401.00001"))
    .with_status(200)
    .with_body(body)
    .create_async()
    .await;

  let dir = tempdir().unwrap();
  let input = write_input(
    &dir,
    "@misc{knuth1984,\n  \
     title = {Literate Programming.},\n  \
     url = {https://arxiv.org/abs/8401.00001},\n  \
     year = {1984},\n  \
     author = {Donald E. Knuth}\n}\n",
  );
  let output = dir.path().join("output.bib");

  let client = stub_client(&server);
  let report = run(&client, &input, &output, None).await;

  assert!(report.is_ok());
  assert_eq!(report.stats.arxiv_candidates, 1);
  assert_eq!(report.stats.replaced, 1);
  assert_eq!(report.stats.unchanged, 1);
  assert_eq!(report.stats.diff_count, 0);
  assert!(std::fs::read_to_string(&output).unwrap().contains("@misc{knuth1984,"));
}

#[traced_test]
#[tokio::test]
async fn test_flagged_without_identifier_is_kept_and_not_counted() {
  let server = Server::new_async().await;
  let dir = tempdir().unwrap();
  let input = write_input(
    &dir,
    "@misc{mystery2023,\n  \
     title = {Mystery Entry},\n  \
     journal = {arXiv preprint},\n  \
     year = {2023}\n}\n",
  );
  let output = dir.path().join("output.bib");

  let client = stub_client(&server);
  let report = run(&client, &input, &output, None).await;

  assert!(report.is_ok());
  assert_eq!(report.stats.total_records, 1);
  assert_eq!(report.stats.arxiv_candidates, 0);
  assert_eq!(report.stats.no_match, 0);
  assert!(std::fs::read_to_string(&output).unwrap().contains("@misc{mystery2023,"));
  assert!(logs_contain("no extractable identifier"));
}

#[tokio::test]
async fn test_parse_failure_produces_no_output() {
  let server = Server::new_async().await;
  let dir = tempdir().unwrap();
  let missing = dir.path().join("missing.bib");
  let output = dir.path().join("output.bib");

  let client = stub_client(&server);
  let report = run(&client, &missing, &output, None).await;

  assert_eq!(report.outcome, RunOutcome::ParseFailed);
  assert_eq!(report.stats, RunStats::default());
  assert!(!output.exists());
}

#[tokio::test]
async fn test_write_failure_keeps_stats() {
  let server = Server::new_async().await;
  let dir = tempdir().unwrap();
  let input = write_input(&dir, ENTRY_A);
  let output = dir.path().join("no/such/dir/output.bib");

  let client = stub_client(&server);
  let report = run(&client, &input, &output, None).await;

  assert_eq!(report.outcome, RunOutcome::WriteFailed);
  assert_eq!(report.stats.total_records, 1);
}

#[tokio::test]
async fn test_report_write_failure_does_not_escalate() {
  let server = Server::new_async().await;
  let dir = tempdir().unwrap();
  let input = write_input(&dir, ENTRY_A);
  let output = dir.path().join("output.bib");
  let bad_report = dir.path().join("no/such/dir/changes.md");

  let client = stub_client(&server);
  let report = run(&client, &input, &output, Some(&bad_report)).await;

  assert_eq!(report.outcome, RunOutcome::Completed);
  assert!(output.exists());
}

#[tokio::test]
async fn test_empty_report_uses_placeholder() {
  let server = Server::new_async().await;
  let dir = tempdir().unwrap();
  let input = write_input(&dir, ENTRY_A);
  let output = dir.path().join("output.bib");
  let report_path = dir.path().join("changes.md");

  let client = stub_client(&server);
  let report = run(&client, &input, &output, Some(&report_path)).await;

  assert!(report.is_ok());
  let changes = std::fs::read_to_string(&report_path).unwrap();
  assert_eq!(changes, "# BibTeX Changes Report\n\nNo changes found.\n");
}

#[tokio::test]
async fn test_citation_keys_survive_every_outcome() -> anyhow::Result<()> {
  let mut server = Server::new_async().await;
  let _hit = server
    .mock("GET", "/search/publ/api")
    .match_query(query_matcher("1706.03762"))
    .with_status(200)
    .with_body(HIT_BODY)
    .create_async()
    .await;
  let _miss = server
    .mock("GET", "/search/publ/api")
    .match_query(query_matcher("9999.00001"))
    .with_status(200)
    .with_body(MISS_BODY)
    .create_async()
    .await;

  let dir = tempdir().unwrap();
  let input = write_input(&dir, &format!("{ENTRY_A}\n{ENTRY_B}\n{ENTRY_C}"));
  let output = dir.path().join("output.bib");

  let client = stub_client(&server);
  run(&client, &input, &output, None).await;

  let input_keys: Vec<String> =
    bibtex::parse_file(&input)?.into_iter().map(|r| r.citation_key).collect();
  let output_keys: Vec<String> =
    bibtex::parse_file(&output)?.into_iter().map(|r| r.citation_key).collect();
  assert_eq!(input_keys, output_keys);
  Ok(())
}
