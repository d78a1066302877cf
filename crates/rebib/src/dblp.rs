//! Client for the DBLP publication search API.
//!
//! The client issues one search query per arXiv identifier against DBLP's
//! `search/publ/api` endpoint, retrying with exponential backoff, and maps the
//! highest-ranked hit into a [`Record`] that carries the caller's original
//! citation key. Every failure mode resolves to a miss rather than an error:
//! the pipeline treats "no data" and "server unreachable after retries"
//! identically and keeps the original record.
//!
//! # Examples
//!
//! ```no_run
//! use rebib::DblpClient;
//!
//! # async fn example() {
//! let client = DblpClient::new();
//! match client.lookup("1706.03762", "vaswani2017attention").await {
//!   Some(record) => println!("Found: {}", record.field("title").unwrap_or("?")),
//!   None => println!("No match, keeping the original entry"),
//! }
//! # }
//! ```

use super::*;

/// Retry budget applied to every lookup.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
  /// How many times a query is attempted before resolving to a miss.
  pub max_attempts: u32,
  /// Sleep after the first failed attempt; doubles after each further failure.
  pub base_delay:   Duration,
}

impl Default for RetryPolicy {
  fn default() -> Self { Self { max_attempts: 5, base_delay: Duration::from_secs(1) } }
}

/// Explicit backoff state machine: an attempt counter and the next delay.
///
/// Yields one delay per failed attempt (1s, 2s, 4s, 8s, 16s under the default
/// policy) and `None` once the attempt budget is spent, so attempt count and
/// total wait time are testable without sleeping.
#[derive(Debug)]
pub struct Backoff {
  /// The policy this state machine runs under.
  policy:  RetryPolicy,
  /// Number of attempts consumed so far.
  attempt: u32,
}

impl Backoff {
  /// Creates a fresh state machine with no attempts consumed.
  pub fn new(policy: RetryPolicy) -> Self { Self { policy, attempt: 0 } }

  /// Consumes one attempt and returns the sleep to take after it fails, or
  /// `None` once the budget is exhausted.
  pub fn next_delay(&mut self) -> Option<Duration> {
    if self.attempt >= self.policy.max_attempts {
      return None;
    }
    let delay = self.policy.base_delay * 2u32.pow(self.attempt);
    self.attempt += 1;
    Some(delay)
  }
}

/// Response envelope from the DBLP search API.
#[derive(Debug, Deserialize)]
struct DblpResponse {
  /// Top-level result container.
  result: DblpResult,
}

/// The `result` object of a DBLP search response.
#[derive(Debug, Deserialize)]
struct DblpResult {
  /// Hit list and total count.
  hits: DblpHits,
}

/// The `hits` object: a total count plus the ranked hit list.
#[derive(Debug, Deserialize)]
struct DblpHits {
  /// Total number of matches, serialized by DBLP as a string.
  #[serde(rename = "@total")]
  total: String,
  /// Ranked hits; absent entirely when there are no matches.
  #[serde(default)]
  hit:   Vec<DblpHit>,
}

/// One ranked hit.
#[derive(Debug, Deserialize)]
struct DblpHit {
  /// The bibliographic payload of the hit.
  info: DblpInfo,
}

/// The bibliographic payload of a hit.
///
/// `type`, `key`, and `authors` are handled specially; every other field is
/// captured verbatim and copied into the replacement record.
#[derive(Debug, Deserialize)]
struct DblpInfo {
  /// DBLP's declared publication type, e.g. "Journal Articles".
  #[serde(rename = "type")]
  record_type: Option<String>,
  /// DBLP's own record key. Deliberately discarded: the replacement record
  /// keeps the caller's citation key.
  key:         Option<String>,
  /// Author container, a single object or a list.
  authors:     Option<DblpAuthors>,
  /// All remaining bibliographic fields, in response order.
  #[serde(flatten)]
  rest:        serde_json::Map<String, serde_json::Value>,
}

/// The `authors` wrapper object.
#[derive(Debug, Deserialize)]
struct DblpAuthors {
  /// One author object or a list of them.
  author: DblpAuthorList,
}

/// DBLP serializes a single author as an object and several as a list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DblpAuthorList {
  /// Exactly one author.
  One(DblpAuthor),
  /// Two or more authors, in citation order.
  Many(Vec<DblpAuthor>),
}

/// One author entry.
#[derive(Debug, Deserialize)]
struct DblpAuthor {
  /// The author's display name.
  text: String,
}

/// Flattens the author container into a single BibTeX author string.
///
/// A single author passes through as-is; multiple authors are joined with
/// `" and "` in their original order.
fn format_authors(authors: Option<&DblpAuthors>) -> String {
  match authors.map(|wrapper| &wrapper.author) {
    None => String::new(),
    Some(DblpAuthorList::One(author)) => author.text.clone(),
    Some(DblpAuthorList::Many(list)) =>
      list.iter().map(|author| author.text.as_str()).collect::<Vec<_>>().join(" and "),
  }
}

/// Client for the DBLP publication search endpoint.
pub struct DblpClient {
  /// Internal web client used to connect to the API.
  client:   reqwest::Client,
  /// The base URL of the search endpoint.
  base_url: String,
  /// Retry budget applied to every lookup.
  retry:    RetryPolicy,
}

impl DblpClient {
  /// Creates a client against the public DBLP endpoint with the default retry
  /// policy (5 attempts, backoff starting at one second) and a 10 second
  /// per-attempt timeout.
  pub fn new() -> Self {
    Self::with_params("https://dblp.org/search/publ/api", RetryPolicy::default())
  }

  /// Creates a client against an arbitrary endpoint with an explicit retry
  /// policy. Tests point this at a local stub server with millisecond delays.
  pub fn with_params(base_url: &str, retry: RetryPolicy) -> Self {
    Self {
      client: reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap(),
      base_url: base_url.to_string(),
      retry,
    }
  }

  /// Looks up an arXiv identifier on DBLP.
  ///
  /// Resolves to `Some(record)` on a match, with the record carrying
  /// `original_key` as its citation key, the flattened author string under
  /// `author`, and every other field of the hit copied verbatim. Resolves to
  /// `None` (a miss) when the response has zero hits or when every attempt
  /// failed; callers cannot and should not distinguish the two.
  pub async fn lookup(&self, arxiv_id: &str, original_key: &str) -> Option<Record> {
    let response = self.fetch_with_retry(arxiv_id).await?;

    let hits = response.result.hits;
    if hits.total.parse::<u64>().unwrap_or(0) == 0 || hits.hit.is_empty() {
      warn!("no DBLP match found for citation key {original_key}");
      return None;
    }

    let info = hits.hit.into_iter().next()?.info;
    Some(build_record(info, original_key))
  }

  /// Runs the query through the backoff state machine. One delay is consumed
  /// per failed attempt, so the budget bounds both attempts and total sleep.
  async fn fetch_with_retry(&self, arxiv_id: &str) -> Option<DblpResponse> {
    let mut backoff = Backoff::new(self.retry);
    while let Some(delay) = backoff.next_delay() {
      debug!("querying DBLP for arXiv id {arxiv_id}");
      match self.fetch(arxiv_id).await {
        Ok(response) => return Some(response),
        Err(e) => warn!("DBLP query for {arxiv_id} failed: {e}"),
      }
      tokio::time::sleep(delay).await;
    }
    error!(
      "giving up on DBLP lookup for {arxiv_id} after {} attempts",
      self.retry.max_attempts
    );
    None
  }

  /// Issues a single search request and parses the JSON body.
  async fn fetch(&self, arxiv_id: &str) -> Result<DblpResponse, RebibError> {
    let response = self
      .client
      .get(&self.base_url)
      .query(&[("q", arxiv_id), ("format", "json")])
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      return Err(RebibError::Api(format!("DBLP returned {status} for {arxiv_id}")));
    }

    let text = response.text().await?;
    serde_json::from_str(&text)
      .map_err(|e| RebibError::Api(format!("failed to parse DBLP JSON: {e}")))
  }
}

impl Default for DblpClient {
  fn default() -> Self { Self::new() }
}

/// Converts a hit's payload into a replacement record.
///
/// The citation key is always the caller's `original_key`; the key DBLP
/// returns is logged and dropped.
fn build_record(info: DblpInfo, original_key: &str) -> Record {
  if let Some(dblp_key) = &info.key {
    debug!("discarding DBLP key {dblp_key} in favor of {original_key}");
  }

  let author = format_authors(info.authors.as_ref());
  if author.is_empty() {
    warn!("missing author data in DBLP record for {original_key}");
  }

  let mut fields = IndexMap::new();
  for (name, value) in info.rest {
    let value = match value {
      serde_json::Value::String(text) => text,
      other => other.to_string(),
    };
    fields.insert(name, value);
  }
  fields.insert("author".to_string(), author);

  Record {
    entry_type: EntryType::from_name(info.record_type.as_deref().unwrap_or("misc")),
    citation_key: original_key.to_string(),
    fields,
    from_arxiv: false,
    arxiv_id: None,
  }
}
