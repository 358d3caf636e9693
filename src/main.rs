use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

use graybench_core::config::constants::redteam as redteam_defaults;
use graybench_core::config::{ConfigManager, FallbackModel, GraybenchConfig};
use graybench_core::core::manager::{GenerateRequest, ModelManager};
use graybench_core::redteam::{
    AttackCategory, Benchmarker, CategoryReport, ChallengeTracker, PromptGenerator,
};
use graybench_core::storage::DocStore;
use graybench_core::workspace::Workspace;

#[derive(Parser, Debug)]
#[command(
    name = "graybench",
    version,
    about = "Multi-provider LLM orchestration with a learning workspace and a red-team benchmark toolkit"
)]
struct Cli {
    /// Path to graybench.toml; defaults to the standard search locations
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the default provider for this invocation
    #[arg(long, global = true)]
    provider: Option<String>,

    /// Override the default model for this invocation
    #[arg(long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default graybench.toml into the current directory
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Ask the learning workspace a question
    Ask {
        prompt: Vec<String>,

        /// Track the exchange as a session and persist the transcript
        #[arg(long)]
        session: bool,

        /// Return a mock response without calling any provider
        #[arg(long)]
        dry_run: bool,
    },

    /// Print generated red-team prompts for a category and target
    Generate {
        /// Attack category (see `graybench categories`)
        category: String,
        /// Target of the attack (e.g. system_prompt, credentials)
        target: String,

        /// Emit the JSON-injection payload instead of the composed prompt
        #[arg(long)]
        json: bool,

        /// Number of prompts to generate
        #[arg(long, default_value_t = 1)]
        count: usize,
    },

    /// Run a benchmark sweep and record results to the store
    Benchmark {
        /// Restrict to one category; all categories when omitted
        #[arg(long)]
        category: Option<String>,

        /// Targets to test (at least one)
        #[arg(required = true)]
        targets: Vec<String>,
    },

    /// Show recorded challenge attempts and success rates
    Challenges,

    /// Summarize the most recent metrics snapshot
    Metrics,

    /// List supported attack categories
    Categories,

    /// Ask the knowledge agent for next-topic recommendations
    Recommend {
        /// Topics already covered
        covered: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Cli::parse();

    let config_manager = match &args.config {
        Some(path) => ConfigManager::load_from_file(path)?,
        None => ConfigManager::load()?,
    };
    let mut config = config_manager.config().clone();
    if let Some(provider) = &args.provider {
        config.agent.provider = provider.clone();
    }
    if let Some(model) = &args.model {
        config.agent.model = model.clone();
    }

    match args.command {
        Commands::Init { force } => init_config(force),
        Commands::Ask {
            prompt,
            session,
            dry_run,
        } => ask(config, prompt.join(" "), session, dry_run).await,
        Commands::Generate {
            category,
            target,
            json,
            count,
        } => generate_prompts(&category, &target, json, count),
        Commands::Benchmark { category, targets } => benchmark(config, category, targets).await,
        Commands::Challenges => challenges(config),
        Commands::Metrics => metrics_summary(config),
        Commands::Categories => {
            for category in redteam_defaults::CATEGORIES {
                println!("{category}");
            }
            Ok(())
        }
        Commands::Recommend { covered } => recommend(config, covered).await,
    }
}

fn init_config(force: bool) -> Result<()> {
    let cwd = std::env::current_dir().context("cannot determine current dir")?;
    match GraybenchConfig::bootstrap(&cwd, force)? {
        Some(path) => println!("{} {}", "created".green(), path.display()),
        None => println!("graybench.toml already exists; use --force to overwrite"),
    }
    Ok(())
}

fn open_store(config: &GraybenchConfig) -> Result<DocStore> {
    DocStore::open(&config.storage.root).context("failed to open document store")
}

async fn ask(config: GraybenchConfig, prompt: String, session: bool, dry_run: bool) -> Result<()> {
    if prompt.trim().is_empty() {
        anyhow::bail!("empty prompt; usage: graybench ask <question>");
    }

    let manager = Arc::new(ModelManager::new(&ConfigManager::from_config(config.clone())));

    if dry_run {
        let outcome = manager
            .generate(GenerateRequest::new(prompt).dry_run())
            .await?;
        println!("{}", outcome.content.unwrap_or_default());
        return Ok(());
    }

    let store = open_store(&config)?;
    let workspace = Workspace::new(config.workspace.clone(), manager, Some(store));

    let response = if session {
        workspace.process_session(&prompt).await?
    } else {
        workspace.process_message(&prompt).await?
    };

    println!(
        "{} {}",
        "agent:".dimmed(),
        response.routed_to.cyan().bold()
    );
    if !response.matched_topics.is_empty() {
        println!(
            "{} {}",
            "topics:".dimmed(),
            response.matched_topics.join(", ")
        );
    }
    if let Some(session_id) = &response.session_id {
        println!("{} {}", "session:".dimmed(), session_id);
    }
    if let Some(fallback) = &response.reply.outcome.fallback {
        println!(
            "{} {} (original: {}/{})",
            "fallback:".yellow(),
            fallback.strategy.as_str(),
            fallback.original_provider,
            fallback.original_model
        );
    }
    println!();
    println!("{}", response.reply.content);
    Ok(())
}

fn parse_category(name: &str) -> Result<AttackCategory> {
    AttackCategory::parse(name).with_context(|| {
        format!(
            "unknown category '{name}'; expected one of: {}",
            redteam_defaults::CATEGORIES.join(", ")
        )
    })
}

fn generate_prompts(category: &str, target: &str, json: bool, count: usize) -> Result<()> {
    let category = parse_category(category)?;
    let generator = PromptGenerator::new();

    for index in 0..count.max(1) {
        if index > 0 {
            println!("{}", "---".dimmed());
        }
        if json {
            let payload = generator.json_injection(category, target);
            println!("{}", serde_json::to_string_pretty(&payload)?);
        } else {
            println!("{}", generator.generate(category, target));
        }
    }
    Ok(())
}

fn print_report(report: &CategoryReport) {
    let rate = format!("{:.0}%", report.success_rate * 100.0);
    let rate = if report.success_rate > 0.5 {
        rate.red().bold()
    } else {
        rate.green().bold()
    };
    println!(
        "{} {} success rate {} ({} cells)",
        "category:".dimmed(),
        report.category.as_str().cyan(),
        rate,
        report.results.len()
    );
    for cell in &report.results {
        let marker = if cell.success {
            "breached".red()
        } else {
            "held".green()
        };
        println!(
            "  {:<30} {}/{}: {} (best strategy: {})",
            cell.target, cell.provider, cell.model, marker, cell.best_strategy
        );
    }
}

async fn benchmark(
    config: GraybenchConfig,
    category: Option<String>,
    targets: Vec<String>,
) -> Result<()> {
    let models = if config.redteam.models.is_empty() {
        vec![FallbackModel {
            provider: config.agent.provider.clone(),
            model: config.agent.model.clone(),
        }]
    } else {
        config.redteam.models.clone()
    };

    let manager = Arc::new(ModelManager::new(&ConfigManager::from_config(config.clone())));
    let store = DocStore::open(&config.redteam.results_dir)
        .context("failed to open benchmark results store")?;
    let benchmarker = Benchmarker::new(manager.clone(), store);

    let reports = match category {
        Some(name) => vec![
            benchmarker
                .benchmark_category(parse_category(&name)?, &targets, &models)
                .await?,
        ],
        None => benchmarker.benchmark_all(&targets, &models).await?,
    };

    for report in &reports {
        print_report(report);
    }

    let metrics_dir = PathBuf::from(&config.metrics.storage_dir);
    if let Some(path) = manager.metrics().save_snapshot(&metrics_dir) {
        println!("{} {}", "metrics snapshot:".dimmed(), path.display());
    }
    Ok(())
}

fn challenges(config: GraybenchConfig) -> Result<()> {
    let store = open_store(&config)?;
    let tracker = ChallengeTracker::new(store);
    let statuses = tracker.list_challenges()?;

    if statuses.is_empty() {
        println!("no challenge attempts recorded yet");
        return Ok(());
    }

    for status in statuses {
        println!(
            "{} {}/{} successful attempts",
            status.challenge.cyan().bold(),
            status.successes,
            status.attempts
        );
        for (model, breakdown) in &status.by_model {
            println!("  {:<40} {}/{}", model, breakdown.successes, breakdown.attempts);
        }
    }
    Ok(())
}

fn metrics_summary(config: GraybenchConfig) -> Result<()> {
    let dir = PathBuf::from(&config.metrics.storage_dir);
    let mut snapshots: Vec<PathBuf> = match std::fs::read_dir(&dir) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect(),
        Err(_) => Vec::new(),
    };
    snapshots.sort();

    let Some(latest) = snapshots.last() else {
        println!("no metrics snapshots under {}", dir.display());
        return Ok(());
    };

    let body = std::fs::read_to_string(latest)
        .with_context(|| format!("failed to read {}", latest.display()))?;
    let snapshot: serde_json::Value = serde_json::from_str(&body)
        .with_context(|| format!("failed to parse {}", latest.display()))?;

    let empty = Vec::new();
    let response_times = snapshot["response_times"].as_array().unwrap_or(&empty);
    let token_usage = snapshot["token_usage"].as_array().unwrap_or(&empty);
    let errors = snapshot["errors"].as_array().unwrap_or(&empty);

    let avg_seconds = if response_times.is_empty() {
        0.0
    } else {
        response_times
            .iter()
            .filter_map(|r| r["seconds"].as_f64())
            .sum::<f64>()
            / response_times.len() as f64
    };
    let total_tokens: u64 = token_usage
        .iter()
        .filter_map(|r| r["total_tokens"].as_u64())
        .sum();

    println!("{} {}", "snapshot:".dimmed(), latest.display());
    println!("requests:      {}", response_times.len());
    println!("avg response:  {avg_seconds:.2}s");
    println!("total tokens:  {total_tokens}");
    println!("errors:        {}", errors.len());
    Ok(())
}

async fn recommend(config: GraybenchConfig, covered: Vec<String>) -> Result<()> {
    let manager = Arc::new(ModelManager::new(&ConfigManager::from_config(config.clone())));
    let store = open_store(&config)?;
    let workspace = Workspace::new(config.workspace.clone(), manager, Some(store));

    let response = workspace.recommendations(&covered).await?;
    println!("{}", response.reply.content);
    Ok(())
}
