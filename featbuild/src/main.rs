mod commands;
mod formatting;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use featbuild_core::config::DEFAULT_CONFIG_FILE;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use commands::{Context, Executor};

#[derive(Parser)]
#[command(name = "featbuild")]
#[command(about = "Incremental feature builds driven by content fingerprints")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Builder file describing the features (YAML or TOML)
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Cache directory, overriding the builder file's `cache_dir`
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[arg(short, long, global = true, action)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a feature and its dependencies, skipping unchanged ones
    Build {
        feature: String,
        #[arg(long, value_enum, default_value = "docker")]
        executor: Executor,
        /// Container CLI used by the docker executor
        #[arg(long, default_value = "docker")]
        docker_bin: String,
        /// Reject shell operators in commands run by the shell executor
        #[arg(long, action)]
        strict: bool,
    },
    /// Show what a build would do without running it
    Plan {
        feature: String,
        #[arg(long, action)]
        json: bool,
    },
    /// Print the resolved build order of a feature
    Order {
        feature: String,
        #[arg(long, action)]
        json: bool,
    },
    /// List features that rebuild when the given feature changes
    Affected { feature: String },
    /// Remove cached fingerprints (all, or one feature)
    Clean { feature: Option<String> },
    /// List the features in the builder file
    List {
        #[arg(long, action)]
        json: bool,
    },
}

fn init_tracing(verbose: u8, quiet: bool) {
    let log_level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if let Err(e) = run(cli) {
        formatting::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let ctx = Context::new(cli.config, cli.cache_dir);

    match cli.command {
        Commands::Build {
            feature,
            executor,
            docker_bin,
            strict,
        } => commands::cmd_build(&ctx, &feature, executor, docker_bin, strict)?,
        Commands::Plan { feature, json } => commands::cmd_plan(&ctx, &feature, json)?,
        Commands::Order { feature, json } => commands::cmd_order(&ctx, &feature, json)?,
        Commands::Affected { feature } => commands::cmd_affected(&ctx, &feature)?,
        Commands::Clean { feature } => commands::cmd_clean(&ctx, feature.as_deref())?,
        Commands::List { json } => commands::cmd_list(&ctx, json)?,
    }

    Ok(())
}
