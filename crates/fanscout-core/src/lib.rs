//! Shared records and configuration for the fanscout workspace.

pub mod app_config;
pub mod config;
pub mod error;
pub mod types;

pub use app_config::{AppConfig, Environment, SearchCredentials};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{ConfigError, CoreError};
pub use types::{
    parse_timestamp, AuthorIdentity, CandidateOrigin, CommentRecord, CommenterAggregate,
    Confidence, ProfileCandidate, ResolutionSource, ResolvedCommenter, ResolvedProfile,
};
