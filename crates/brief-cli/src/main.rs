use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::FormArgs;

#[derive(Parser)]
#[command(name = "brief")]
#[command(about = "Brief - package a problem statement and its source files for review", long_about = None)]
struct Cli {
    /// Workspace root the selected file paths are relative to
    #[arg(long, global = true)]
    workspace: Option<PathBuf>,

    /// Config file (defaults to ~/.config/brief/config.toml, or $BRIEF_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create and generate a new intent
    Create {
        name: String,
        /// Workspace-relative files to include
        #[arg(short, long = "file")]
        files: Vec<String>,
        #[command(flatten)]
        form: FormArgs,
    },
    /// List intents in the workspace
    List,
    /// Print an intent's metadata as JSON
    Show { name: String },
    /// Add files to an intent
    Add {
        name: String,
        #[arg(required = true)]
        files: Vec<String>,
    },
    /// Remove a file from an intent
    Remove { name: String, file: String },
    /// Generate an intent again, marking it completed
    Generate {
        name: String,
        #[command(flatten)]
        form: FormArgs,
    },
    /// Refresh an intent's content and snapshot without changing its status
    Regenerate {
        name: String,
        #[command(flatten)]
        form: FormArgs,
    },
    /// Set the status (draft, in-progress, completed, archived)
    Status { name: String, status: String },
    /// Advance the workflow stage
    Stage { name: String, stage: String },
    /// Print the token estimate
    Tokens { name: String },
    /// Rebuild the snapshot document
    Snapshot { name: String },
    /// Delete an intent folder
    Delete {
        name: String,
        /// Required; deletion cannot be undone
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("brief=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let ctx = commands::Context::load(cli.workspace, cli.config).await?;

    match cli.command {
        Commands::Create { name, files, form } => {
            commands::intent::create(&ctx, &name, files, form).await?
        }
        Commands::List => commands::intent::list(&ctx).await?,
        Commands::Show { name } => commands::intent::show(&ctx, &name).await?,
        Commands::Add { name, files } => commands::files::add(&ctx, &name, files).await?,
        Commands::Remove { name, file } => commands::files::remove(&ctx, &name, &file).await?,
        Commands::Generate { name, form } => {
            commands::intent::generate(&ctx, &name, form).await?
        }
        Commands::Regenerate { name, form } => {
            commands::intent::regenerate(&ctx, &name, form).await?
        }
        Commands::Status { name, status } => {
            commands::state::status(&ctx, &name, &status).await?
        }
        Commands::Stage { name, stage } => commands::state::stage(&ctx, &name, &stage).await?,
        Commands::Tokens { name } => commands::files::tokens(&ctx, &name).await?,
        Commands::Snapshot { name } => commands::files::snapshot(&ctx, &name).await?,
        Commands::Delete { name, yes } => commands::intent::delete(&ctx, &name, yes).await?,
    }

    Ok(())
}
