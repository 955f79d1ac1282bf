//! episode-finder: Command-line interface and HTTP service

use anyhow::Result;
use clap::{Parser, Subcommand};
use episode_finder::config::{path_resolver, AppConfig};
use episode_finder::{api, DiscussionFinder, OutlierFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// ============================================================================
// CLI Implementation
// ============================================================================

/// episode-finder: find a community's episode discussion threads
#[derive(Parser)]
#[command(name = "episode-finder")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file (default: $XDG_CONFIG_HOME/episode-finder/config.toml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize episode-finder configuration
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
    /// Start the HTTP server
    Serve {
        /// Address to bind, e.g. 0.0.0.0:8000
        #[arg(short, long)]
        bind: Option<String>,

        /// Submissions fetched per community
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Print the discussions of one community as JSON
    Discussions {
        /// Community name, without the r/ prefix
        community: String,

        /// Submissions to fetch
        #[arg(short, long)]
        limit: Option<usize>,

        /// Include submission, discussion and season counts
        #[arg(short, long)]
        summary: bool,
    },
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let path = cli
        .config
        .as_deref()
        .map(path_resolver::resolve_path)
        .transpose()?;
    AppConfig::load(path.as_deref())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match (&cli.command, cli.verbose) {
        (_, true) => "debug",
        (Commands::Serve { .. }, false) => "info",
        _ => "warn",
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match &cli.command {
        Commands::Init { force } => {
            let config_dir = path_resolver::get_config_dir();
            let config_path = path_resolver::get_default_config_path();

            eprintln!("Initializing episode-finder configuration...");
            eprintln!("Config directory: {}", config_dir.display());

            if !config_dir.exists() {
                std::fs::create_dir_all(&config_dir)?;
                eprintln!("Created config directory");
            }

            if config_path.exists() && !force {
                eprintln!("Configuration file already exists: {}", config_path.display());
                eprintln!("Use --force to overwrite");
                return Ok(());
            }

            let default_config = AppConfig::default();
            std::fs::write(&config_path, default_config.to_toml()?)?;

            eprintln!("Created configuration file: {}", config_path.display());
            eprintln!("\nAdd reddit_client_id and reddit_client_secret to {} before serving.", config_path.display());
            Ok(())
        }
        Commands::Serve { bind, limit } => {
            let mut config = load_config(&cli)?;
            if let Some(bind) = bind {
                config = config.with_bind_address(bind);
            }
            if let Some(limit) = limit {
                config = config.with_search_limit(*limit);
            }
            config.validate()?;

            eprintln!("episode-finder API starting on {}...", config.bind_address());
            api::serve(&config).await
        }
        Commands::Discussions {
            community,
            limit,
            summary,
        } => {
            let mut config = load_config(&cli)?;
            if let Some(limit) = limit {
                config = config.with_search_limit(*limit);
            }
            config.validate()?;

            let finder = DiscussionFinder::new(config.reddit_client()?)
                .with_limit(config.search_limit())
                .with_filter(OutlierFilter::with_threshold(config.outlier_threshold()));

            let report = finder.report(community, None).await?;
            let output = if *summary {
                serde_json::to_string_pretty(&report)?
            } else {
                serde_json::to_string_pretty(&report.discussions)?
            };
            println!("{}", output);
            Ok(())
        }
    }
}
