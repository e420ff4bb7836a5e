//! # CulturaCheck — 丝路通
//!
//! Middle East business-culture compliance advisor: lexical knowledge
//! retrieval plus LLM review reports.
//!
//! Usage:
//!   culturacheck serve                       # Start the HTTP gateway
//!   culturacheck check --text "..."          # One-shot review, JSON report
//!   culturacheck search 斋月 --country 沙特阿拉伯

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use cultura_core::config::CulturaConfig;
use cultura_knowledge::{Category, CorpusStore, Country, LexicalRanker, SearchFilter};

#[derive(Parser)]
#[command(
    name = "culturacheck",
    version,
    about = "🌙 CulturaCheck — 丝路通 中东商务文化合规顾问"
)]
struct Cli {
    /// Path to config.toml (default: ~/.culturacheck/config.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP gateway
    Serve,
    /// Review content for cultural-compliance risks, print the JSON report
    Check {
        /// Text to review
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,
        /// Read the text to review from a file
        #[arg(long)]
        file: Option<PathBuf>,
        /// Target market (e.g., 沙特阿拉伯)
        #[arg(long)]
        country: Option<String>,
        /// Content type hint (e.g., 营销文案)
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Search the knowledge corpus directly (no model calls)
    Search {
        query: String,
        #[arg(long)]
        country: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value = "10")]
        limit: usize,
    },
}

fn load_config(cli: &Cli) -> Result<CulturaConfig> {
    let config = match &cli.config {
        Some(path) => {
            let expanded = shellexpand::tilde(path).to_string();
            CulturaConfig::load_from(Path::new(&expanded))?
        }
        None => CulturaConfig::load()?,
    };
    Ok(config)
}

fn load_corpus(config: &CulturaConfig) -> Result<Arc<CorpusStore>> {
    let path = shellexpand::tilde(&config.knowledge.corpus_path).to_string();
    Ok(Arc::new(CorpusStore::load_from(Path::new(&path))?))
}

fn parse_country(value: &str) -> Result<Country> {
    Country::parse(value).ok_or_else(|| {
        let valid: Vec<&str> = Country::ALL.iter().map(|c| c.as_str()).collect();
        anyhow::anyhow!("未知的国家 '{}'，有效值：{}", value, valid.join("、"))
    })
}

fn parse_category(value: &str) -> Result<Category> {
    Category::parse(value).ok_or_else(|| {
        let valid: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
        anyhow::anyhow!("未知的类别 '{}'，有效值：{}", value, valid.join("、"))
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "culturacheck=debug,cultura_gateway=debug,cultura_agent=debug,cultura_knowledge=debug,tower_http=debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config = load_config(&cli)?;
    tracing::info!(
        "CulturaCheck v{} — provider: {}, model: {}",
        env!("CARGO_PKG_VERSION"),
        config.default_provider,
        config.default_model
    );

    match cli.command {
        Command::Serve => {
            let corpus = load_corpus(&config)?;
            let agent = Arc::new(cultura_agent::CheckAgent::new(config.clone(), corpus)?);
            cultura_gateway::serve(cultura_gateway::AppState::new(config, agent)).await?;
        }

        Command::Check {
            text,
            file,
            country,
            content_type,
        } => {
            let body = match (text, file) {
                (Some(t), _) => t,
                (None, Some(f)) => std::fs::read_to_string(&f)?,
                (None, None) => anyhow::bail!("需要 --text 或 --file 提供待审核内容"),
            };
            let target = country.as_deref().map(parse_country).transpose()?;
            let corpus = load_corpus(&config)?;
            let agent = cultura_agent::CheckAgent::new(config, corpus)?;
            let report = agent
                .check_content(&body, target, content_type.as_deref())
                .await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Command::Search {
            query,
            country,
            category,
            limit,
        } => {
            let filter = SearchFilter {
                country: country.as_deref().map(parse_country).transpose()?,
                category: category.as_deref().map(parse_category).transpose()?,
            };
            let corpus = load_corpus(&config)?;
            let ranker = LexicalRanker::new(corpus);
            let results = ranker.search(&query, &filter, limit);
            if results.is_empty() {
                println!("没有匹配的知识条目。");
            }
            for r in results {
                println!(
                    "{:>4}  [{}] {}（{}）{}",
                    r.score,
                    r.chunk.country.as_str(),
                    r.chunk.category.as_str(),
                    r.chunk.severity.as_str(),
                    r.chunk.content
                );
            }
        }
    }

    Ok(())
}
