use std::str::FromStr;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a numeric value cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a numeric value cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// All credentials are optional here. Missing search credentials put the
/// resolver into "not configured" mode; a missing `YouTube` key only fails the
/// commands that need it (see [`AppConfig::require_youtube_api_key`]).
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let env = parse_environment(&or_default("FANSCOUT_ENV", "development"));
    let log_level = or_default("FANSCOUT_LOG_LEVEL", "info");

    let youtube_api_key = optional("YOUTUBE_API_KEY");
    let google_search_api_key = optional("GOOGLE_SEARCH_API_KEY");
    let google_search_engine_id = optional("GOOGLE_SEARCH_ENGINE_ID");

    let request_timeout_secs: u64 = parse_var(
        "FANSCOUT_REQUEST_TIMEOUT_SECS",
        &or_default("FANSCOUT_REQUEST_TIMEOUT_SECS", "30"),
    )?;
    let user_agent = or_default("FANSCOUT_USER_AGENT", "fanscout/0.1 (audience-research)");
    let search_budget: usize = parse_var(
        "FANSCOUT_SEARCH_BUDGET",
        &or_default("FANSCOUT_SEARCH_BUDGET", "50"),
    )?;
    let search_min_interval_ms: u64 = parse_var(
        "FANSCOUT_SEARCH_MIN_INTERVAL_MS",
        &or_default("FANSCOUT_SEARCH_MIN_INTERVAL_MS", "200"),
    )?;
    let search_results_per_query: u32 = parse_var(
        "FANSCOUT_SEARCH_RESULTS_PER_QUERY",
        &or_default("FANSCOUT_SEARCH_RESULTS_PER_QUERY", "5"),
    )?;
    let max_retries: u32 = parse_var(
        "FANSCOUT_MAX_RETRIES",
        &or_default("FANSCOUT_MAX_RETRIES", "3"),
    )?;
    let retry_backoff_base_ms: u64 = parse_var(
        "FANSCOUT_RETRY_BACKOFF_BASE_MS",
        &or_default("FANSCOUT_RETRY_BACKOFF_BASE_MS", "1000"),
    )?;
    let comments_per_video: usize = parse_var(
        "FANSCOUT_COMMENTS_PER_VIDEO",
        &or_default("FANSCOUT_COMMENTS_PER_VIDEO", "100"),
    )?;

    // The Custom Search API rejects `num` outside 1..=10.
    if !(1..=10).contains(&search_results_per_query) {
        return Err(ConfigError::InvalidEnvVar {
            var: "FANSCOUT_SEARCH_RESULTS_PER_QUERY".to_string(),
            reason: format!("must be between 1 and 10, got {search_results_per_query}"),
        });
    }

    Ok(AppConfig {
        env,
        log_level,
        youtube_api_key,
        google_search_api_key,
        google_search_engine_id,
        request_timeout_secs,
        user_agent,
        search_budget,
        search_min_interval_ms,
        search_results_per_query,
        max_retries,
        retry_backoff_base_ms,
        comments_per_video,
    })
}

fn parse_var<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
