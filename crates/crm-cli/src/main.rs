use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crm_infrastructure::CrmPaths;

mod commands;

#[derive(Parser)]
#[command(name = "crm")]
#[command(about = "Chat CRM - sort chat conversations into categories", long_about = None)]
struct Cli {
    /// Directory holding the durable storage file
    #[arg(long, global = true)]
    storage_dir: Option<PathBuf>,

    /// Path to config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List categories and their conversations
    List {
        /// Print the stored JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show category statistics
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Create a category
    Create { name: String },
    /// Rename a category
    Rename { id: String, name: String },
    /// Delete a category; its conversations become uncategorized
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Move a conversation to a category (id or name) or to "uncategorized"
    Assign { conversation: String, target: String },
    /// Delete every category
    Reset {
        #[arg(long)]
        yes: bool,
    },
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Print the config file location
    Path,
    /// Write the default configuration if no file exists
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let paths = CrmPaths::new()
        .with_config_file(cli.config)
        .with_storage_dir(cli.storage_dir);

    match cli.command {
        Commands::List { json } => commands::categories::list(&paths, json).await?,
        Commands::Stats { json } => commands::stats::run(&paths, json).await?,
        Commands::Create { name } => commands::categories::create(&paths, &name).await?,
        Commands::Rename { id, name } => commands::categories::rename(&paths, &id, &name).await?,
        Commands::Delete { id, yes } => commands::categories::delete(&paths, &id, yes).await?,
        Commands::Assign {
            conversation,
            target,
        } => commands::categories::assign(&paths, &conversation, &target).await?,
        Commands::Reset { yes } => commands::reset::run(&paths, yes).await?,
        Commands::Config { action } => match action.unwrap_or(ConfigAction::Show) {
            ConfigAction::Show => commands::config::show(&paths)?,
            ConfigAction::Path => commands::config::path(&paths)?,
            ConfigAction::Init => commands::config::init(&paths)?,
        },
    }

    Ok(())
}
