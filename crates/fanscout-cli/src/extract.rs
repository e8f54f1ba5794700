//! `extract`: harvest channel comments into `comments.csv`.

use std::path::Path;

use anyhow::Context;
use fanscout_core::{AppConfig, CommentRecord};
use fanscout_youtube::YoutubeClient;

use crate::records::{write_csv_file, CommentRow, COMMENT_COLUMNS};

/// Harvest comments from a channel's recent uploads and write them to
/// `output_file`. Returns the harvested records so `run` can keep going
/// without re-reading the file.
///
/// # Errors
///
/// Returns an error if `YOUTUBE_API_KEY` is missing, the channel cannot be
/// resolved, the API quota is exhausted, or the file cannot be written.
pub(crate) async fn run_extract(
    config: &AppConfig,
    channel_url: &str,
    output_file: &Path,
    video_count: usize,
    days_back: u32,
) -> anyhow::Result<Vec<CommentRecord>> {
    let api_key = config.require_youtube_api_key()?;
    let client = YoutubeClient::new(api_key, config.request_timeout_secs, &config.user_agent)?
        .with_retry(config.max_retries, config.retry_backoff_base_ms)
        .with_comments_per_video(config.comments_per_video);

    println!("Getting recent videos from channel: {channel_url}");
    let comments = client
        .fetch_channel_comments(channel_url, video_count, days_back)
        .await
        .with_context(|| format!("harvesting comments from {channel_url}"))?;

    let rows: Vec<CommentRow> = comments.iter().map(CommentRow::from_record).collect();
    write_csv_file(output_file, COMMENT_COLUMNS, &rows)?;

    if comments.is_empty() {
        println!("No comments to save; wrote empty {}", output_file.display());
    } else {
        println!(
            "Saved {} comments to {}",
            comments.len(),
            output_file.display()
        );
    }
    Ok(comments)
}
