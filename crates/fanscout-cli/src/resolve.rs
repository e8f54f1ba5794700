//! `resolve`: look up Instagram profiles for `ranked_commenters.csv`.

use std::path::Path;
use std::sync::atomic::AtomicBool;

use anyhow::Context;
use fanscout_core::{AppConfig, CommenterAggregate};
use fanscout_resolver::{
    resolve_all, GoogleSearchClient, Pacer, ResolutionReport, SearchBudget,
};

use crate::records::{read_csv_file, write_csv_file, ProfileRow, RankedRow, PROFILE_COLUMNS};

/// Read a ranked file, resolve every commenter, and write the profile file.
///
/// # Errors
///
/// Returns an error if either file cannot be opened or the search client
/// cannot be built.
pub(crate) async fn run_resolve(
    config: &AppConfig,
    input_file: &Path,
    output_file: &Path,
    cancel: &AtomicBool,
) -> anyhow::Result<()> {
    let rows: Vec<RankedRow> = read_csv_file(input_file)?;
    println!(
        "Loaded {} commenters from {}",
        rows.len(),
        input_file.display()
    );
    let commenters = rows.into_iter().map(RankedRow::into_aggregate).collect();
    resolve_and_write(config, commenters, output_file, cancel).await
}

/// Resolve `commenters` in rank order and write one profile row each.
///
/// Without Google search credentials only bio text is consulted and
/// unresolved rows are marked "API Not Configured". On Ctrl-C the rows
/// resolved so far are still written.
///
/// # Errors
///
/// Returns an error if the search client cannot be built or the output
/// file cannot be written.
pub(crate) async fn resolve_and_write(
    config: &AppConfig,
    commenters: Vec<CommenterAggregate>,
    output_file: &Path,
    cancel: &AtomicBool,
) -> anyhow::Result<()> {
    if commenters.is_empty() {
        println!("No data to process!");
    }

    let search = build_search_client(config)?;
    let budget = SearchBudget::new(config.search_budget);
    let pacer = Pacer::from_millis(config.search_min_interval_ms);

    let report = resolve_all(commenters, search.as_ref(), &budget, &pacer, cancel).await;

    let rows: Vec<ProfileRow> = report
        .resolved
        .iter()
        .map(|r| ProfileRow::new(r, report.summary.search_configured))
        .collect();
    write_csv_file(output_file, PROFILE_COLUMNS, &rows)?;
    println!("Saved {} rows to {}", rows.len(), output_file.display());

    print_summary(&report, &budget);
    Ok(())
}

fn build_search_client(config: &AppConfig) -> anyhow::Result<Option<GoogleSearchClient>> {
    let Some(credentials) = config.search_credentials() else {
        tracing::warn!(
            "GOOGLE_SEARCH_API_KEY or GOOGLE_SEARCH_ENGINE_ID not set; only bio text will be checked"
        );
        return Ok(None);
    };
    let client = GoogleSearchClient::new(
        &credentials,
        config.request_timeout_secs,
        &config.user_agent,
        config.search_results_per_query,
    )
    .context("building search client")?;
    Ok(Some(client))
}

fn print_summary(report: &ResolutionReport, budget: &SearchBudget) {
    let s = &report.summary;
    println!();
    println!("=== RESULTS ===");
    if report.cancelled {
        println!("Interrupted: kept the {} commenters resolved so far", s.total);
    }
    println!("Found from channel descriptions: {}", s.found_via_bio);
    if s.search_configured {
        println!("Found from Google search: {}", s.found_via_search);
        println!(
            "Searches used: {}/{} commenters, {} queries sent ({} failed)",
            budget.used(),
            budget.limit(),
            s.queries_sent,
            s.search_errors
        );
        if s.budget_skipped > 0 {
            println!(
                "Skipped after the budget ran out: {} commenters",
                s.budget_skipped
            );
        }
    } else {
        println!("Google search: not configured");
    }
    println!("Total Instagram profiles found: {}/{}", s.total_found(), s.total);
}
