//! Search collaborators that turn a text query into profile candidates.

mod google;
mod instagram;

use std::future::Future;

use fanscout_core::ProfileCandidate;

use crate::error::SearchError;

pub use google::GoogleSearchClient;
pub use instagram::profile_handle_from_url;

/// Anything that can answer a text query with Instagram profile candidates.
///
/// Implementations make a single attempt per call and must return an error
/// rather than panic on provider failures.
pub trait SearchCollaborator {
    fn query(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<Vec<ProfileCandidate>, SearchError>> + Send;
}
