//! `run`: extract, rank and resolve in one go.

use std::path::Path;
use std::sync::atomic::AtomicBool;

use fanscout_core::AppConfig;

use crate::extract::run_extract;
use crate::ranking::rank_and_write;
use crate::resolve::resolve_and_write;

pub(crate) const COMMENTS_FILE: &str = "comments.csv";
pub(crate) const RANKED_FILE: &str = "ranked_commenters.csv";
pub(crate) const PROFILES_FILE: &str = "instagram_profiles.csv";

/// Run the whole pipeline, writing all three files into `output_dir`.
///
/// # Errors
///
/// Propagates the first stage failure; files from earlier stages are left
/// in place.
pub(crate) async fn run_pipeline(
    config: &AppConfig,
    channel_url: &str,
    output_dir: &Path,
    video_count: usize,
    days_back: u32,
    limit: usize,
    cancel: &AtomicBool,
) -> anyhow::Result<()> {
    println!("=== Step 1/3: extracting comments ===");
    let comments = run_extract(
        config,
        channel_url,
        &output_dir.join(COMMENTS_FILE),
        video_count,
        days_back,
    )
    .await?;

    println!("\n=== Step 2/3: ranking commenters ===");
    let ranked = rank_and_write(&comments, &output_dir.join(RANKED_FILE), limit)?;

    println!("\n=== Step 3/3: finding Instagram profiles ===");
    resolve_and_write(config, ranked, &output_dir.join(PROFILES_FILE), cancel).await?;

    println!("\nDone. Results in {}", output_dir.display());
    Ok(())
}
