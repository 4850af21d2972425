//! feedcast - announce a random article from a JSON feed
//!
//! Meant to be run by a scheduler with no arguments; all settings come from
//! the environment (and a `.env` file outside production).

use clap::Parser;
use libfeedcast::config::{self, Config};
use libfeedcast::feed::JsonFeedClient;
use libfeedcast::logging::{self, LogFormat};
use libfeedcast::platforms::mastodon::MastodonClient;
use libfeedcast::publisher::EmitOutcome;
use libfeedcast::{run_once, PublishMode, Result, RunSettings};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Debug)]
#[command(name = "feedcast")]
#[command(version)]
#[command(about = "Announce a random, not recently posted article from a JSON feed", long_about = None)]
struct Cli {
    /// Never publish, only log the post that would be sent
    #[arg(long)]
    dry_run: bool,

    /// Log output format (text, json or pretty)
    #[arg(long)]
    log_format: Option<LogFormat>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let production = std::env::var("RUN_MODE").as_deref() == Ok("production");
    let env_file = if production {
        None
    } else {
        config::load_env_file()?
    };

    let mut config = Config::from_env()?;
    if cli.dry_run {
        config.mode = PublishMode::DryRun;
    }

    logging::init_for_mode(config.mode, cli.log_format, cli.verbose);
    info!("feedcast {} ({})", VERSION, config.mode);
    if let Some(path) = env_file {
        info!("Loaded environment from {}", path.display());
    }

    let feed = JsonFeedClient::new(config.feed_url.clone(), VERSION)?;
    let platform = MastodonClient::from_config(&config)?;
    let mut rng = StdRng::from_entropy();

    let report = run_once(&RunSettings::from(&config), &feed, &platform, &mut rng).await?;

    match report.outcome {
        EmitOutcome::DryRun { text } => info!("Dry run complete: {}", text),
        EmitOutcome::Published { post_id, .. } => info!("Published post {}", post_id),
    }

    Ok(())
}
