use std::path::PathBuf;

use clap::{builder::ArgAction, Parser};
use console::{style, Emoji};
use errors::RebibCliError;
use rebib::{
  pipeline::{self, RunOutcome},
  DblpClient,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

pub mod errors;

static LOOKING_GLASS: Emoji<'_, '_> = Emoji("🔍 ", "");
static PAPER: Emoji<'_, '_> = Emoji("📄 ", "");
static WARNING: Emoji<'_, '_> = Emoji("⚠️  ", "");
static SUCCESS: Emoji<'_, '_> = Emoji("✨ ", "");

#[derive(Parser)]
#[command(
  author,
  version,
  about = "Replace arXiv BibTeX entries with DBLP records and report per-entry diffs"
)]
struct Cli {
  /// Path to the input .bib file
  input: PathBuf,

  /// Path to write the converted .bib file
  #[arg(default_value = "output.bib")]
  output: PathBuf,

  /// Optional Markdown file for a per-entry change report
  #[arg(long)]
  diff_report: Option<PathBuf>,

  /// Verbose mode (-v, -vv, -vvv)
  #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true,
        help = "Increase logging verbosity"
    )]
  verbose: u8,
}

/// Setup logging with the specified verbosity level
fn setup_logging(verbosity: u8) {
  let filter = match verbosity {
    0 => "warn",
    1 => "info",
    2 => "debug",
    _ => "trace",
  };

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

  tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
}

#[tokio::main]
async fn main() -> Result<(), RebibCliError> {
  let cli = Cli::parse();
  setup_logging(cli.verbose);

  println!(
    "{} Converting {}",
    style(LOOKING_GLASS).cyan(),
    style(cli.input.display()).yellow()
  );

  let client = DblpClient::new();
  let report =
    pipeline::run(&client, &cli.input, &cli.output, cli.diff_report.as_deref()).await;
  let stats = report.stats;
  debug!("run finished: {stats:?}");

  match report.outcome {
    RunOutcome::Completed => {
      println!(
        "\n{} Wrote {}",
        style(PAPER).green(),
        style(cli.output.display()).yellow()
      );
      if let Some(report_path) = &cli.diff_report {
        println!(
          "{} Change report at {}",
          style(PAPER).green(),
          style(report_path.display()).yellow()
        );
      }
      println!(
        "\n{} {} total={} | arXiv candidates={} | replaced={} | unchanged={} | no match={} | \
         diffs={}",
        style(SUCCESS).green(),
        style("Summary:").green().bold(),
        style(stats.total_records).yellow(),
        style(stats.arxiv_candidates).yellow(),
        style(stats.replaced).yellow(),
        style(stats.unchanged).yellow(),
        style(stats.no_match).yellow(),
        style(stats.diff_count).yellow(),
      );
      Ok(())
    },
    RunOutcome::ParseFailed => {
      println!(
        "{} Could not parse {}",
        style(WARNING).yellow(),
        style(cli.input.display()).yellow()
      );
      Err(RebibCliError::ParseFailed(cli.input))
    },
    RunOutcome::WriteFailed => {
      println!(
        "{} Could not write {}",
        style(WARNING).yellow(),
        style(cli.output.display()).yellow()
      );
      Err(RebibCliError::WriteFailed(cli.output))
    },
  }
}
