//! Floorplan Extractor CLI
//!
//! Structured room extraction from floorplan images, with CubiCasa5K ground
//! truth and evaluation.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use floorplan_extractor::{
    annotation::AnnotationParser,
    config::{Config, Provider},
    dataset::{DatasetLoader, Split},
    evaluate::Evaluator,
    llm::{LlmClient, VisionExtractor},
    persistence::{resolve_instruction, save_artifact, PromptArtifact},
    scoring::{score_prediction, Prediction},
    FloorplanError,
};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Floorplan Extractor - structured room data from floorplan images
#[derive(Parser)]
#[command(name = "floorplan-extractor")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// LLM provider: gemini, openai, openrouter
    #[arg(long, global = true)]
    provider: Option<Provider>,

    /// Dataset root (overrides config)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the extractor on a data split
    Eval {
        /// Split to evaluate: train, val, test
        #[arg(short, long, default_value = "test")]
        split: String,

        /// Max examples to evaluate
        #[arg(short, long)]
        limit: Option<usize>,

        /// Prompt artifact file or optimizer output directory
        #[arg(short, long)]
        prompt: Option<PathBuf>,

        /// Save results to JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Save the instruction with its score as a prompt artifact (.json or .bin)
        #[arg(long)]
        save_prompt: Option<PathBuf>,
    },

    /// Extract room data from a single image
    Extract {
        /// Path to floorplan image
        image: PathBuf,

        /// Prompt artifact file or optimizer output directory
        #[arg(short, long)]
        prompt: Option<PathBuf>,

        /// Output as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Show the ground-truth label of an annotation file
    Label {
        /// Path to the SVG annotation
        annotation: PathBuf,

        /// Output as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Score a prediction JSON file against an annotation
    Score {
        /// Path to the SVG annotation (gold)
        annotation: PathBuf,

        /// Path to the prediction JSON
        prediction: PathBuf,
    },

    /// Count usable samples in each split
    Splits,

    /// Test LLM connection
    Test,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("info")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(provider) = cli.provider {
        config.llm.provider = provider;
    }
    if let Some(data_dir) = cli.data_dir {
        config.dataset.root = data_dir;
    }

    match cli.command {
        Commands::Eval {
            split,
            limit,
            prompt,
            output,
            save_prompt,
        } => cmd_eval(config, split, limit, prompt, output, save_prompt).await,
        Commands::Extract { image, prompt, json } => cmd_extract(config, image, prompt, json).await,
        Commands::Label { annotation, json } => cmd_label(annotation, json),
        Commands::Score {
            annotation,
            prediction,
        } => cmd_score(annotation, prediction),
        Commands::Splits => cmd_splits(config),
        Commands::Test => cmd_test(config).await,
    }
}

fn build_extractor(config: &Config, prompt: Option<PathBuf>) -> Result<VisionExtractor> {
    config.validate().context("Invalid configuration")?;
    let client = LlmClient::new(config.llm.clone());

    let instruction = match prompt {
        Some(path) => resolve_instruction(&path)
            .with_context(|| format!("Failed to load prompt from {}", path.display()))?,
        None => None,
    };

    Ok(match instruction {
        Some(instruction) => {
            println!("Using optimized instruction");
            VisionExtractor::with_instruction(client, instruction)
        }
        None => VisionExtractor::new(client),
    })
}

async fn cmd_eval(
    config: Config,
    split: String,
    limit: Option<usize>,
    prompt: Option<PathBuf>,
    output: Option<PathBuf>,
    save_prompt: Option<PathBuf>,
) -> Result<()> {
    let extractor = build_extractor(&config, prompt)?;
    println!("Using LLM: {}", config.llm.resolved_model());

    let evaluator = Evaluator::new(DatasetLoader::new(config.dataset.clone()));

    match limit {
        Some(n) => println!("Evaluating on {} (limit={})...", split, n),
        None => println!("Evaluating on {}...", split),
    }
    let report = evaluator
        .evaluate_limited(&extractor, &split, limit)
        .await
        .context("Evaluation failed")?;

    report.print_summary();
    println!("Results: {:.2}% average score", report.avg_score * 100.0);

    if let Some(output_path) = output {
        report
            .save_json(&output_path)
            .context("Failed to save results")?;
        println!("Results saved to {}", output_path.display());
    }

    if let Some(artifact_path) = save_prompt {
        let artifact = PromptArtifact {
            instruction: extractor.instruction().to_string(),
            model: Some(config.llm.resolved_model().to_string()),
            score: Some(report.avg_score),
            split: Some(report.split.to_string()),
        };
        save_artifact(&artifact, &artifact_path).context("Failed to save prompt artifact")?;
        println!("Prompt artifact saved to {}", artifact_path.display());
    }

    Ok(())
}

async fn cmd_extract(
    config: Config,
    image: PathBuf,
    prompt: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let extractor = build_extractor(&config, prompt)?;

    let start = Instant::now();
    let label = extractor
        .extract(&image)
        .await
        .context("Extraction failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&label)?);
        return Ok(());
    }

    println!("\nExtracted data ({:.2?}):", start.elapsed());
    println!("  Total rooms: {}", label.total_rooms);
    println!("  Bedrooms:    {}", label.num_bedrooms);
    println!("  Bathrooms:   {}", label.num_bathrooms);
    println!("  Has garage:  {}", label.has_garage);
    println!("  Room types:  {:?}", label.room_types());
    if !label.is_consistent() {
        println!("  Note: counts disagree with the room list");
    }

    Ok(())
}

fn cmd_label(annotation: PathBuf, json: bool) -> Result<()> {
    let label = AnnotationParser::default()
        .parse_file(&annotation)
        .context("Failed to parse annotation")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&label)?);
        return Ok(());
    }

    println!("Ground truth for {}", annotation.display());
    println!("{}", "─".repeat(40));
    println!("  Total rooms: {}", label.total_rooms);
    println!("  Bedrooms:    {}", label.num_bedrooms);
    println!("  Bathrooms:   {}", label.num_bathrooms);
    println!("  Has garage:  {}", label.has_garage);
    println!("  Room types:  {:?}", label.room_types());

    Ok(())
}

fn cmd_score(annotation: PathBuf, prediction: PathBuf) -> Result<()> {
    let gold = AnnotationParser::default()
        .parse_file(&annotation)
        .context("Failed to parse annotation")?;

    let content = std::fs::read_to_string(&prediction)
        .with_context(|| format!("Failed to read {}", prediction.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&content).context("Prediction is not valid JSON")?;

    let result = score_prediction(&gold, &Prediction::from_value(value), true);

    println!("Score: {:.3}", result.score);
    if let Some(feedback) = result.feedback {
        for line in feedback.lines() {
            println!("  {}", line);
        }
    }

    Ok(())
}

fn cmd_splits(config: Config) -> Result<()> {
    let loader = DatasetLoader::new(config.dataset);
    println!("Dataset root: {}", loader.config().root.display());
    println!("{}", "─".repeat(40));

    for split in Split::ALL {
        match loader.load(split, None) {
            Ok(samples) => println!("  {:<6} {} samples", split, samples.len()),
            Err(FloorplanError::ManifestNotFound(path)) => {
                println!("  {:<6} missing manifest ({})", split, path.display())
            }
            Err(e) => return Err(e).context(format!("Failed to load split {}", split)),
        }
    }

    Ok(())
}

async fn cmd_test(config: Config) -> Result<()> {
    println!("Testing LLM connection...\n");

    println!("Configuration:");
    println!("  Provider:  {}", config.llm.provider);
    println!("  API Base:  {}", config.llm.resolved_api_base());
    println!("  Model:     {}", config.llm.resolved_model());
    println!(
        "  API Key:   {}...",
        config.llm.api_key.chars().take(8).collect::<String>()
    );
    println!();

    if let Err(e) = config.validate() {
        println!("Configuration error: {}", e);
        return Ok(());
    }

    let client = LlmClient::new(config.llm);

    println!("Sending test request...");
    match client.test_connection().await {
        Ok(()) => {
            println!("Connection successful!");
        }
        Err(e) => {
            println!("Connection failed: {}", e);
        }
    }

    Ok(())
}
