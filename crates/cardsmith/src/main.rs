//! Command-line entry point for Cardsmith.

use anyhow::Context;
use cardsmith::{init_logging, open_store};
use cardsmith_config::{CardsmithConfig, LayeredConfigOptions, ProviderConfig};
use cardsmith_core::{BillingProvider, FlashcardGenerator, LlmTextProvider, StaticBillingProvider};
use cardsmith_protocol::{Flashcard, FlashcardId, GenerationRequest, TextProvider};
use cardsmith_server::AppState;
use clap::{Args, Parser, Subcommand};
use log::{debug, info};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Command-line options for the Cardsmith binary.
#[derive(Debug, Parser)]
#[command(name = "cardsmith", version, about = "Turn study notes into flashcards")]
struct Cli {
    /// Optional path to a cardsmith.json5 config file, applied over the layered config
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the HTTP API
    Serve {
        /// Address to bind, overriding server.bind
        #[arg(long)]
        bind: Option<String>,
    },
    /// Generate flashcards from a notes file and print them as JSON
    Generate(GenerateArgs),
    /// List a user's saved flashcards
    List {
        #[arg(long)]
        user: String,
    },
    /// Delete one of a user's flashcards
    Delete {
        #[arg(long)]
        user: String,
        #[arg(long)]
        id: FlashcardId,
    },
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// Notes file, or `-` for stdin
    #[arg(long)]
    notes: String,
    /// Number of cards to request
    #[arg(long, default_value_t = 5)]
    count: i64,
    /// easy, medium, hard or mixed
    #[arg(long, default_value = "mixed")]
    difficulty: String,
    /// Optional subject hint
    #[arg(long)]
    subject: Option<String>,
    /// Save the generated cards for --user
    #[arg(long, requires = "user")]
    save: bool,
    /// User the cards belong to; also selects the plan limit
    #[arg(long)]
    user: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Serve { bind } => serve(config, bind).await,
        Command::Generate(args) => generate(config, args).await,
        Command::List { user } => list(&config, &user).await,
        Command::Delete { user, id } => delete(&config, &user, id).await,
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<CardsmithConfig> {
    let cwd = std::env::current_dir().context("failed to resolve current working directory")?;
    let mut options = LayeredConfigOptions::new(&cwd);
    if let Some(path) = path {
        info!("loading config with runtime override: {}", path.display());
        options = options.with_runtime_path(path);
    }
    let layered =
        CardsmithConfig::load_layered_with_options(options).context("failed to load config")?;
    debug!("layered config loaded (layers={})", layered.layers.len());
    Ok(layered.config)
}

fn build_provider(config: &ProviderConfig) -> anyhow::Result<Arc<dyn TextProvider>> {
    let api_key = std::env::var(&config.api_key_env)
        .with_context(|| format!("{} is required to generate flashcards", config.api_key_env))?;
    let provider =
        LlmTextProvider::openai(config, api_key).context("failed to build text provider")?;
    Ok(Arc::new(provider))
}

async fn serve(config: CardsmithConfig, bind: Option<String>) -> anyhow::Result<()> {
    let bind = bind.unwrap_or_else(|| config.server.bind.clone());
    let generator = FlashcardGenerator::new(build_provider(&config.provider)?, &config);
    let store = open_store(&config.store).context("failed to open flashcard store")?;
    let billing = Arc::new(StaticBillingProvider::new(config.billing.clone()));
    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    cardsmith_server::serve(listener, AppState::new(generator, store, billing, config))
        .await
        .context("server failed")
}

async fn generate(config: CardsmithConfig, args: GenerateArgs) -> anyhow::Result<()> {
    let notes = read_notes(&args.notes)?;
    let mut request = GenerationRequest::new(notes, args.count, args.difficulty);
    request.subject = args.subject;

    let billing = StaticBillingProvider::new(config.billing.clone());
    let plan = billing
        .plan_for(args.user.as_deref().unwrap_or_default())
        .await?;
    let ceiling = billing.limits(plan).max_cards_per_request;

    let generator = FlashcardGenerator::new(build_provider(&config.provider)?, &config);
    let result = generator.generate(&request, ceiling).await?;

    if args.save {
        let user = args.user.context("--user is required with --save")?;
        let store = open_store(&config.store).context("failed to open flashcard store")?;
        for draft in &result.cards {
            store
                .save(Flashcard::from_draft(user.clone(), draft.clone()))
                .await
                .context("failed to save flashcard")?;
        }
        info!(
            "saved generated flashcards (user_id={}, count={})",
            user,
            result.cards.len()
        );
    }
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn list(config: &CardsmithConfig, user: &str) -> anyhow::Result<()> {
    let store = open_store(&config.store).context("failed to open flashcard store")?;
    let cards = store.list(user).await.context("failed to list flashcards")?;
    println!("{}", serde_json::to_string_pretty(&cards)?);
    Ok(())
}

async fn delete(config: &CardsmithConfig, user: &str, id: FlashcardId) -> anyhow::Result<()> {
    let store = open_store(&config.store).context("failed to open flashcard store")?;
    store
        .delete(user, id)
        .await
        .with_context(|| format!("failed to delete flashcard {id}"))?;
    println!("deleted {id}");
    Ok(())
}

/// Read notes from a file, or from stdin when `source` is `-`.
fn read_notes(source: &str) -> anyhow::Result<String> {
    if source == "-" {
        let mut notes = String::new();
        std::io::stdin()
            .read_to_string(&mut notes)
            .context("failed to read notes from stdin")?;
        return Ok(notes);
    }
    std::fs::read_to_string(source).with_context(|| format!("failed to read notes from {source}"))
}
