//! `YouTube` Data API v3 comment harvester.
//!
//! Turns a channel URL into a flat list of [`fanscout_core::CommentRecord`]s
//! covering the channel's most recent uploads, replies included, with each
//! commenter's channel description attached as bio text.

pub mod channel;
pub mod client;
pub mod error;
mod retry;
mod types;

pub use channel::{parse_channel_url, ChannelRef};
pub use client::{Video, YoutubeClient};
pub use error::YoutubeError;
