use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use dswipe_execution::SwipeEventLayer;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, Layer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

#[derive(Parser)]
#[command(name = "dswipe")]
#[command(about = "Deep Swipe - swipe navigation and generation for chat transcripts", long_about = None)]
struct Cli {
    /// Directory holding config.toml (defaults to the platform config dir)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Print captured swipe lifecycle events as JSON lines on stderr
    #[arg(long, global = true)]
    events: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Swipe right: cycle user alternatives or generate a new one
    Forward {
        #[command(flatten)]
        target: TargetArgs,
        #[command(flatten)]
        generation: GenerationArgs,
    },
    /// Swipe left: native navigation for assistant messages
    Back {
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Make a stored alternative of a user message active again
    Restore {
        #[command(flatten)]
        target: TargetArgs,
        /// Alternative to restore
        #[arg(long)]
        swipe_id: usize,
    },
    /// Show or change the [swipe] settings
    Config {
        #[command(flatten)]
        changes: commands::config::ConfigArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Transcript JSON file; rewritten on exit
    #[arg(long)]
    pub transcript: PathBuf,

    /// Index of the message to swipe
    #[arg(long)]
    pub message_id: usize,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GenerationArgs {
    /// Delay between streamed chunks of the simulated backend
    #[arg(long, default_value_t = 50)]
    pub delay_ms: u64,

    /// Emit the stop signal after this many milliseconds
    #[arg(long)]
    pub stop_after_ms: Option<u64>,

    /// Make the simulated backend fail after streaming
    #[arg(long)]
    pub fail: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (event_layer, events) = if cli.events {
        let (layer, receiver) = SwipeEventLayer::channel();
        (Some(layer), Some(receiver))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(
                    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
                ),
        )
        .with(event_layer)
        .init();

    let options = commands::swipe::RunOptions {
        config_dir: cli.config_dir,
    };

    let result = match cli.command {
        Commands::Config { changes } => {
            let settings = commands::config::run(&options, &changes)?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
            return Ok(());
        }
        Commands::Forward { target, generation } => {
            commands::swipe::forward(&options, &target, &generation).await
        }
        Commands::Back { target } => commands::swipe::back(&options, &target).await,
        Commands::Restore { target, swipe_id } => {
            commands::swipe::restore(&options, &target, swipe_id).await
        }
    };

    if let Some(mut events) = events {
        while let Ok(event) = events.try_recv() {
            eprintln!("{}", serde_json::to_string(&event)?);
        }
    }

    let outcome = result?;
    println!("{}", serde_json::to_string(&outcome)?);
    Ok(())
}
