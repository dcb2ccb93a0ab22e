//! Command-line front end for the research pipeline.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use congress_research::{
    AnalysisResult, ContentFetcher, LlmConfig, OpenAiCompatClient, Orchestrator, ResearchConfig,
    ResearchReport, SearxSearcher, TimeRange,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TimeArg {
    /// No freshness constraint.
    Any,
    /// Roughly the last twelve months.
    Year,
    /// Roughly the last month.
    Month,
}

impl From<TimeArg> for TimeRange {
    fn from(arg: TimeArg) -> Self {
        match arg {
            TimeArg::Any => TimeRange::Any,
            TimeArg::Year => TimeRange::Year,
            TimeArg::Month => TimeRange::Month,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Triage each source: relevant (titled summary) or not.
    Summarize,
    /// Pull a sample abstract and a generated parsing script per source.
    Extract,
}

/// Find and triage medical congress abstracts on the open web.
#[derive(Parser, Debug)]
#[command(name = "research", version)]
struct Args {
    /// Disease or research topic, e.g. "Paroxysmal Nocturnal Hemoglobinuria".
    topic: String,

    /// Maximum number of sources to analyze.
    #[arg(long, default_value_t = 5)]
    max_sites: usize,

    /// Freshness window for search results.
    #[arg(long, value_enum, default_value_t = TimeArg::Any)]
    time: TimeArg,

    /// What to do with each relevant source.
    #[arg(long, value_enum, default_value_t = ModeArg::Summarize)]
    mode: ModeArg,

    /// Candidates processed concurrently. 1 keeps search-result order.
    #[arg(long, default_value_t = 1)]
    concurrency: usize,

    /// SearxNG instance to search against.
    #[arg(long, env = "SEARX_URL", default_value = "https://searxng.site")]
    searx_url: String,

    /// Emit the full report as JSON instead of human-readable text.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let llm_config = LlmConfig::from_env().context("LLM endpoint configuration")?;
    let config = ResearchConfig::default().with_concurrency(args.concurrency);

    let fetcher = ContentFetcher::new(config.fetch.clone(), config.pdf.clone())
        .context("building content fetcher")?;
    let llm = Arc::new(OpenAiCompatClient::new(&llm_config).context("building LLM client")?);
    let models = llm_config.models.clone();

    let orchestrator = Orchestrator::new(
        config,
        SearxSearcher::new(&args.searx_url),
        fetcher,
        llm,
        models,
    );

    let report = match args.mode {
        ModeArg::Summarize => {
            orchestrator
                .run_research(&args.topic, args.max_sites, args.time.into())
                .await
        }
        ModeArg::Extract => orchestrator.run_extraction(&args.topic, args.max_sites).await,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&args.topic, &report);
    }

    Ok(())
}

fn print_report(topic: &str, report: &ResearchReport) {
    println!("Research report for: {topic}");
    println!(
        "  {} queries planned, {} candidates analyzed, {} relevant, {} skipped",
        report.queries_planned,
        report.results.len(),
        report.relevant_count(),
        report.skipped.len()
    );
    println!();

    for result in &report.results {
        match result {
            AnalysisResult::Relevant {
                url,
                title,
                summary,
            } => {
                println!("RELEVANT  {url}");
                println!("  Title: {title}");
                for line in summary.lines() {
                    println!("  {line}");
                }
            }
            AnalysisResult::NotRelevant { url } => {
                println!("NOT RELEVANT  {url}");
            }
            AnalysisResult::Extraction { url, sample, script } => {
                println!("EXTRACTED  {url}");
                println!("  Sample title: {}", sample.title);
                println!("  Sample authors: {}", sample.authors);
                println!("  Parsing script ({} lines):", script.lines().count());
                for line in script.lines() {
                    println!("    {line}");
                }
            }
            AnalysisResult::Error { url, message } => {
                println!("ERROR  {url}");
                println!("  {message}");
            }
        }
        println!();
    }

    if !report.skipped.is_empty() {
        println!("Skipped candidates:");
        for skipped in &report.skipped {
            println!("  {}  ({})", skipped.url, skipped.reason);
        }
    }
}
