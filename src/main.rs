use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tandem_agent::checkpoint::{Checkpointer, MemorySaver, SqliteSaver};
use tandem_agent::workflow::{research_workflow_with, translation_workflow_with};
use tandem_agent::InvokeConfig;
use tandem_core::config::{AppConfig, ModelConfig};
use tandem_core::state::AgentState;
use tandem_core::traits::LlmClient;
use tandem_core::types::ThreadId;
use tandem_llm::create_client;

#[derive(Parser)]
#[command(name = "tandem", version, about = "Co-agent workflow nodes on a linear state graph")]
struct Cli {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Model provider: "openai" or "anthropic" (ignored when --config is set)
    #[arg(long)]
    provider: Option<String>,

    /// Override the model id
    #[arg(long)]
    model: Option<String>,

    /// SQLite checkpoint database (default: in-memory)
    #[arg(long)]
    checkpoint_db: Option<PathBuf>,

    /// Conversation thread id (auto-generated if not provided)
    #[arg(long)]
    thread: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate stdin lines into Spanish, French and German
    Translate,
    /// Summarize the pending search step of a state snapshot
    Summarize {
        /// Path to a JSON state snapshot file
        state: PathBuf,
    },
}

fn resolve_model(cli: &Cli) -> anyhow::Result<ModelConfig> {
    let mut model = if let Some(ref path) = cli.config {
        AppConfig::load(path)?.model
    } else {
        match cli.provider.as_deref().unwrap_or("openai") {
            "anthropic" | "claude" => ModelConfig::anthropic_default(),
            _ => ModelConfig::openai_default(),
        }
    };

    if let Some(ref id) = cli.model {
        model.model_id = id.clone();
    }

    // Credentials come from the environment unless the config supplied them
    if model.api_key.is_none() {
        let var = match model.provider.as_str() {
            "anthropic" | "claude" => "ANTHROPIC_API_KEY",
            _ => "OPENAI_API_KEY",
        };
        model.api_key = std::env::var(var).ok();
    }

    Ok(model)
}

fn resolve_checkpointer(cli: &Cli) -> anyhow::Result<Arc<dyn Checkpointer>> {
    let db_path = cli.checkpoint_db.clone().or_else(|| {
        cli.config
            .as_ref()
            .and_then(|path| AppConfig::load(path).ok())
            .and_then(|config| config.checkpoint)
            .and_then(|cp| cp.db_path.map(PathBuf::from))
    });

    Ok(match db_path {
        Some(path) => Arc::new(SqliteSaver::open(&path)?),
        None => Arc::new(MemorySaver::new()),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tandem=info,warn")),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let model = resolve_model(&cli)?;
    let checkpointer = resolve_checkpointer(&cli)?;
    let client: Arc<dyn LlmClient> = Arc::from(create_client(&model)?);
    let thread = cli
        .thread
        .as_deref()
        .map(ThreadId::from_str)
        .unwrap_or_default();

    info!(provider = %model.provider, model = %model.model_id, thread = %thread, "Starting");

    match cli.command {
        Commands::Translate => {
            let graph = translation_workflow_with(client, model, checkpointer)?;
            let config = InvokeConfig::with_thread(thread);

            let mut state = AgentState::default();
            for line in io::stdin().lock().lines() {
                let line = line?;
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }

                state.input = input.to_string();
                state = graph.invoke(state, &config).await?;

                match &state.translations {
                    Some(t) => {
                        println!("es: {}", t.translation_es);
                        println!("fr: {}", t.translation_fr);
                        println!("de: {}", t.translation_de);
                    }
                    None => {
                        if let Some(last) = state.messages.last() {
                            println!("{}", last.text());
                        }
                    }
                }
            }
        }
        Commands::Summarize { state: state_path } => {
            let json = std::fs::read_to_string(&state_path)?;
            let state: AgentState = serde_json::from_str(&json)?;

            let graph = research_workflow_with(client, model, checkpointer)?;
            let updated = graph.invoke(state, &InvokeConfig::with_thread(thread)).await?;

            println!("{}", serde_json::to_string_pretty(&updated)?);
        }
    }

    Ok(())
}
