//! `rank`: aggregate `comments.csv` into `ranked_commenters.csv`.

use std::path::Path;

use fanscout_core::{CommentRecord, CommenterAggregate};

use crate::records::{read_csv_file, write_csv_file, CommentRow, RankedRow, RANKED_COLUMNS};

const TOP_PREVIEW: usize = 5;

/// Read a comments file, rank its commenters, and write the ranked file.
///
/// # Errors
///
/// Returns an error if either file cannot be opened.
pub(crate) fn run_rank(input_file: &Path, output_file: &Path, limit: usize) -> anyhow::Result<()> {
    let rows: Vec<CommentRow> = read_csv_file(input_file)?;
    let comments: Vec<CommentRecord> = rows
        .into_iter()
        .filter_map(|row| {
            let comment_id = row.comment_id.clone();
            match row.into_record() {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(comment_id = %comment_id, error = %e, "skipping comment row");
                    None
                }
            }
        })
        .collect();
    println!(
        "Loaded {} comments from {}",
        comments.len(),
        input_file.display()
    );

    rank_and_write(&comments, output_file, limit)?;
    Ok(())
}

/// Rank `comments`, write the ranked file, and print the top of the list.
///
/// # Errors
///
/// Returns an error if the output file cannot be written.
pub(crate) fn rank_and_write(
    comments: &[CommentRecord],
    output_file: &Path,
    limit: usize,
) -> anyhow::Result<Vec<CommenterAggregate>> {
    let ranked = fanscout_ranker::rank(comments, limit);
    let rows: Vec<RankedRow> = ranked.iter().map(RankedRow::from).collect();
    write_csv_file(output_file, RANKED_COLUMNS, &rows)?;

    println!("Ranked {} commenters", ranked.len());
    if !ranked.is_empty() {
        println!("Top {} commenters:", ranked.len().min(TOP_PREVIEW));
        for c in ranked.iter().take(TOP_PREVIEW) {
            println!(
                "{}. {} - {} comments, {} likes (score {:.2})",
                c.rank, c.author.name, c.total_comments, c.total_likes, c.engagement_score
            );
        }
    }
    Ok(ranked)
}
