use reqwest::StatusCode;
use thiserror::Error;

/// Result type alias for page operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can interrupt populating a page.
///
/// Callers are free to drop these: the page either fills in fully or
/// degrades to an empty shell. Keeping the variants explicit keeps that
/// policy visible instead of hiding it in a missing error channel.
#[derive(Debug, Error)]
pub enum Error {
    /// The request never reached a terminal success state.
    #[error("network failure: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with something other than 200.
    #[error("unexpected status {0}")]
    Status(StatusCode),

    /// The releases endpoint returned a body that is not a release list.
    #[error("malformed release list: {0}")]
    MalformedReleases(#[source] serde_json::Error),

    /// No release carries an asset matching the selector.
    #[error("no release carries a matching asset")]
    NoAssetMatched,
}
