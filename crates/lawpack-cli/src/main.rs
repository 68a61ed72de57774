//! `lawpack` command line.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lawpack_core::{ArticlePack, Case, LawPack, VerificationEngine, VerifyResult};
use lawpack_runtime::{
    CorpusGateway, DrfGateway, ExampleSearchGateway, GenerationService, NaverSearchGateway, Pipeline,
    PipelineContext, ProviderRegistry, ResultCache, RuntimeConfig,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(author, version, about = "Find and verify the statute behind a complaint", long_about = None)]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline on a complaint
    Find {
        /// Complaint text
        text: String,

        /// Skip the supporting example search
        #[arg(long)]
        no_examples: bool,
    },
    /// Search the statute corpus
    Search {
        query: String,

        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    /// Fetch one article of a statute
    Article {
        /// Corpus identifier (MST)
        id: String,

        /// Article number to select
        #[arg(long)]
        article: Option<u32>,
    },
    /// Verify an article text against a case file
    Verify {
        /// Case as YAML or JSON
        #[arg(long)]
        case: PathBuf,

        /// Article title
        #[arg(long, default_value = "")]
        title: String,

        /// File holding the article text
        #[arg(long)]
        text_file: PathBuf,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lawpack=info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<RuntimeConfig> {
    match path {
        Some(path) => RuntimeConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(RuntimeConfig::default()),
    }
}

fn corpus(config: &RuntimeConfig) -> Result<DrfGateway> {
    DrfGateway::from_env(&config.corpus, config.candidate_loop.index_limit)
        .context("Statute corpus needs LAW_API_ID")
}

async fn generation(config: &RuntimeConfig) -> GenerationService {
    let service = match GenerationService::from_registry(&ProviderRegistry::with_defaults(), config.generation.clone()) {
        Ok(service) => service,
        Err(e) => {
            tracing::warn!(error = %e, "generation unavailable, using deterministic paths only");
            return GenerationService::disabled(config.generation.clone());
        }
    };
    if !service.is_ready().await {
        tracing::warn!(provider = %config.generation.provider, "generation provider not ready, using deterministic paths only");
        return GenerationService::disabled(config.generation.clone());
    }
    service
}

fn examples(config: &RuntimeConfig) -> Option<Arc<dyn ExampleSearchGateway>> {
    match NaverSearchGateway::from_config(&config.examples, &serde_json::json!({})) {
        Ok(gateway) => Some(Arc::new(gateway)),
        Err(e) => {
            tracing::warn!(error = %e, "example search unavailable");
            None
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_verify(verify: &VerifyResult) {
    let b = &verify.breakdown;
    println!("{} {}/100", verify.verdict, verify.total);
    println!(
        "  relevance {} | scope {} | article {} | risk -{}",
        b.relevance, b.scope_fit, b.article_match, b.hallucination_risk
    );
    for note in &verify.notes {
        println!("  - {}", note);
    }
}

fn print_article(pack: &ArticlePack) {
    println!("{} ({})", pack.statute_name, pack.statute_id);
    if let Some(link) = &pack.link {
        println!("{}", link);
    }
    println!();
    println!("{}", pack.display_text());
    if !pack.index.is_empty() {
        println!();
        for entry in pack.index.iter().take(20) {
            println!("  제{}조 {}", entry.number, entry.title);
        }
        if pack.index.len() > 20 {
            println!("  ... {} more", pack.index.len() - 20);
        }
    }
}

fn print_best(best: &LawPack) {
    if best.is_no_evidence() {
        println!("No statute evidence found");
        return;
    }
    print_article(&best.article);
    println!();
    print_verify(&best.verify);
}

fn print_context(ctx: &PipelineContext) {
    if let Some(case) = &ctx.case {
        println!("Case: {} | keywords: {}", case.task.label_ko(), case.keywords.join(", "));
    }
    println!(
        "Candidates: {}",
        ctx.candidates
            .iter()
            .map(|c| c.law_name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!();

    if let Some(outcome) = &ctx.outcome {
        print_best(&outcome.best);
        println!();
        println!("[{}]", outcome.status_message());
        println!();
        for record in outcome.trace.attempts() {
            match (record.outcome.verify(), record.outcome.skip_reason()) {
                (Some(verify), _) => println!(
                    "  #{} {} -> {} {}",
                    record.index + 1,
                    record.candidate.law_name,
                    verify.verdict,
                    verify.total
                ),
                (None, Some(reason)) => println!(
                    "  #{} {} -> skipped ({})",
                    record.index + 1,
                    record.candidate.law_name,
                    reason
                ),
                (None, None) => {}
            }
        }
    }

    if !ctx.examples.is_empty() {
        println!();
        println!("Examples:");
        for item in &ctx.examples {
            println!("  - {} <{}>", item.title, item.link);
        }
    }
    println!();
    println!("({} ms)", ctx.timings.total_ms());
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Find { text, no_examples } => {
            let cache = Arc::new(ResultCache::new(&config.cache));
            let mut builder = Pipeline::builder(config.clone())
                .corpus(Arc::new(corpus(&config)?))
                .generation(Arc::new(generation(&config).await))
                .cache(cache);
            if !no_examples {
                if let Some(gateway) = examples(&config) {
                    builder = builder.examples(gateway);
                }
            }
            let pipeline = builder.build()?;

            let ctx = pipeline.find(&text).await;
            if cli.json {
                print_json(&ctx)?;
            } else {
                print_context(&ctx);
            }
        }
        Commands::Search { query, limit } => {
            let hits = corpus(&config)?.search(&query, limit).await;
            if cli.json {
                print_json(&hits)?;
            } else if hits.is_empty() {
                println!("No results");
            } else {
                for hit in &hits {
                    println!("{}  {}  {}", hit.id, hit.name, hit.promulgation_date);
                }
            }
        }
        Commands::Article { id, article } => {
            let hint = article.map(|n| n.to_string());
            let pack = corpus(&config)?.fetch(&id, hint.as_deref()).await;
            if cli.json {
                print_json(&pack)?;
            } else {
                print_article(&pack);
            }
        }
        Commands::Verify { case, title, text_file } => {
            let case = Case::from_file(&case).with_context(|| format!("Failed to load case {}", case.display()))?;
            let text = std::fs::read_to_string(&text_file)
                .with_context(|| format!("Failed to read {}", text_file.display()))?;
            let verify = VerificationEngine::new(config.verifier.clone()).verify(&case, &title, &text);
            if cli.json {
                print_json(&verify)?;
            } else {
                print_verify(&verify);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["lawpack", "search", "건설기계관리법", "--limit", "3", "--json"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Search { ref query, limit: 3 } if query == "건설기계관리법"));
    }

    #[test]
    fn test_parse_article_and_verify() {
        let cli = Cli::try_parse_from(["lawpack", "article", "000123", "--article", "33"]).unwrap();
        assert!(matches!(cli.command, Commands::Article { article: Some(33), .. }));

        let missing = Cli::try_parse_from(["lawpack", "verify", "--title", "주기"]);
        assert!(missing.is_err());
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        assert!(load_config(Some(Path::new("/nonexistent/lawpack.yaml"))).is_err());
        assert_eq!(load_config(None).unwrap(), RuntimeConfig::default());
    }
}
