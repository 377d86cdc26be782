use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser)]
#[command(name = "launchpad")]
#[command(version, about = "Clone git repositories and launch them with Docker")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a launchpad.toml. Defaults to ./launchpad.toml when present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum, default_value = "text", global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the deployment HTTP API
    Serve {
        /// Address to bind (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to serve on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory holding one sub-directory per deployment (overrides config)
        #[arg(long)]
        projects_base: Option<PathBuf>,
    },
    /// Point every published port in a compose file at one port and drop service volumes
    Rewrite {
        /// Compose file to rewrite in place
        file: PathBuf,

        /// Public port to publish
        #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
        port: u16,

        /// Print the rewritten document instead of writing it
        #[arg(long)]
        dry_run: bool,
    },
    /// Show the effective configuration
    Config,
}

fn init_tracing(verbose: bool, format: LogFormat) {
    let default_directive = if verbose {
        "launchpad=debug,tower_http=debug"
    } else {
        "launchpad=info,tower_http=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_format);

    match cli.command {
        Commands::Serve {
            host,
            port,
            projects_base,
        } => {
            cmd::cmd_serve(cli.config.as_deref(), host, port, projects_base).await?;
        }
        Commands::Rewrite {
            file,
            port,
            dry_run,
        } => cmd::cmd_rewrite(&file, port, dry_run)?,
        Commands::Config => cmd::cmd_config(cli.config.as_deref())?,
    }

    Ok(())
}
