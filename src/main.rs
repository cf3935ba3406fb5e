//! prepress - article export pipeline

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use prepress::collab::{AssetStore, KeywordHighlighter, PdfLatexCompiler, UreqFetcher};
use prepress::transform::PassContext;

#[derive(Parser)]
#[command(name = "prepress")]
#[command(version, about = "Prepare an issue's articles for import", long_about = None)]
#[command(after_help = "EXAMPLES:
    prepress v141i3 dump.xml                Export issue v141i3 to issue.xml
    prepress v141i3 dump.xml -o out.xml     Choose the output file
    prepress v141i3 dump.xml -a ./assets    Choose the asset directory")]
struct Cli {
    /// Issue tag to export, e.g. v141i3
    #[arg(value_name = "ISSUE")]
    issue: String,

    /// XML export dump to read articles from
    #[arg(value_name = "DUMP")]
    dump: PathBuf,

    /// Output file
    #[arg(short, long, default_value = "issue.xml")]
    output: PathBuf,

    /// Directory for generated assets (recreated on every run)
    #[arg(short, long, default_value = "assets")]
    assets: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> prepress::Result<()> {
    let dump = std::fs::read_to_string(&cli.dump)?;

    tracing::info!(issue = %cli.issue, "filtering articles");
    let mut articles = prepress::import::parse_dump(&dump, &cli.issue)?;
    tracing::info!(count = articles.len(), "articles selected");

    // Stale assets from a previous run would mix into the new issue.
    let _ = std::fs::remove_dir_all(&cli.assets);
    let assets = AssetStore::create(&cli.assets)?;

    let fetcher = UreqFetcher::default();
    let ctx = PassContext {
        fetcher: &fetcher,
        math: &PdfLatexCompiler,
        highlighter: &KeywordHighlighter,
        assets: &assets,
    };

    let mut finished = Vec::with_capacity(articles.len());
    for mut article in articles.drain(..) {
        match prepress::transform::run_pipeline(&mut article, &ctx) {
            Ok(()) => finished.push(article),
            Err(e) => {
                tracing::error!(
                    article = %article.title,
                    error = %e,
                    "article failed, leaving it out of the issue"
                );
            }
        }
    }

    let issue = prepress::export::serialize_issue(&finished);
    std::fs::write(&cli.output, issue)?;
    tracing::info!(path = %cli.output.display(), "issue written");
    Ok(())
}
