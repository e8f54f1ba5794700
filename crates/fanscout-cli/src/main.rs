mod extract;
mod pipeline;
mod ranking;
mod records;
mod resolve;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "fanscout")]
#[command(about = "Rank a YouTube channel's most engaged commenters and find their Instagram profiles")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Harvest comments from a channel's recent uploads
    Extract {
        /// Channel URL (/channel/<id>, /@handle, /c/<name> or /user/<name>)
        #[arg(long)]
        channel_url: String,
        #[arg(long)]
        output_file: PathBuf,
        /// Number of recent uploads to harvest
        #[arg(long, default_value_t = 10)]
        video_count: usize,
        /// Only keep comments from the last N days (0 keeps all)
        #[arg(long, default_value_t = 30)]
        days_back: u32,
    },
    /// Rank commenters from an extracted comments file
    Rank {
        #[arg(long)]
        input_file: PathBuf,
        #[arg(long)]
        output_file: PathBuf,
        /// Number of top commenters to keep
        #[arg(long, default_value_t = 100)]
        limit: usize,
    },
    /// Find Instagram profiles for a ranked commenters file
    Resolve {
        #[arg(long)]
        input_file: PathBuf,
        #[arg(long)]
        output_file: PathBuf,
    },
    /// Extract, rank and resolve in one go
    Run {
        #[arg(long)]
        channel_url: String,
        /// Directory for comments.csv, ranked_commenters.csv and instagram_profiles.csv
        #[arg(long)]
        output_dir: PathBuf,
        #[arg(long, default_value_t = 10)]
        video_count: usize,
        #[arg(long, default_value_t = 30)]
        days_back: u32,
        #[arg(long, default_value_t = 100)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = fanscout_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    // Plain output with targets in production.
    let production = config.env.is_production();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_ansi(!production)
        .with_target(production)
        .init();
    tracing::debug!(env = %config.env, "configuration loaded");

    let cancel = interrupt_flag();

    match cli.command {
        Commands::Extract {
            channel_url,
            output_file,
            video_count,
            days_back,
        } => {
            extract::run_extract(&config, &channel_url, &output_file, video_count, days_back)
                .await?;
        }
        Commands::Rank {
            input_file,
            output_file,
            limit,
        } => ranking::run_rank(&input_file, &output_file, limit)?,
        Commands::Resolve {
            input_file,
            output_file,
        } => resolve::run_resolve(&config, &input_file, &output_file, &cancel).await?,
        Commands::Run {
            channel_url,
            output_dir,
            video_count,
            days_back,
            limit,
        } => {
            pipeline::run_pipeline(
                &config,
                &channel_url,
                &output_dir,
                video_count,
                days_back,
                limit,
                &cancel,
            )
            .await?;
        }
    }

    Ok(())
}

/// Set on the first Ctrl-C. Resolution checks it between commenters and
/// writes what it has.
fn interrupt_flag() -> Arc<AtomicBool> {
    let flag = Arc::new(AtomicBool::new(false));
    let handle = Arc::clone(&flag);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received; stopping after the current commenter");
            handle.store(true, Ordering::SeqCst);
        }
    });
    flag
}
