use std::time::Duration;

use reqwest::Client;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::changelog::append_releases;
use crate::error::Result;
use crate::github::{find_asset, request_releases, Release};
use crate::page::Page;

/// Where release bodies get rendered to html.
pub const GITHUB_MARKDOWN_URL: &str = "https://api.github.com/markdown";

/// How long the automatic download gets before the manual fallback link is
/// revealed.
const DEFAULT_REVEAL_DELAY: Duration = Duration::from_millis(5000);

// Changelog rendering kicks off this long after the release list arrives.
// It deliberately does not wait for the download click.
const CHANGELOG_DELAY: Duration = Duration::from_millis(10);

/// Knobs for [`populate_page`].
pub struct PageOptions {
    /// Markdown render endpoint. Overridable so tests can point it at a
    /// local server.
    pub markdown_endpoint: String,
    /// Delay before the fallback link is revealed.
    pub reveal_delay: Duration,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            markdown_endpoint: GITHUB_MARKDOWN_URL.to_string(),
            reveal_delay: DEFAULT_REVEAL_DELAY,
        }
    }
}

/// Populate a download page.
///
/// Fetches the release list from `releases_endpoint`, and if any release
/// carries an asset named what `asset_name` wants, points the page's anchor
/// at it, clicks it, and reveals the fallback link once `reveal_delay` has
/// passed. The changelog is rendered underneath either way. Returns the
/// fetched release list.
///
/// Only the initial list fetch can fail the call. Everything after it is
/// swallowed: a dead render endpoint leaves the changelog truncated, a
/// missing asset leaves the anchor untouched, and neither surfaces here.
pub async fn populate_page<P, F>(
    client: &Client,
    releases_endpoint: &str,
    asset_name: F,
    page: &P,
    options: &PageOptions,
) -> Result<Vec<Release>>
where
    P: Page,
    F: Fn(&Release) -> String,
{
    let releases = request_releases(client, releases_endpoint).await?;
    info!(count = releases.len(), "fetched release list");

    let selected =
        find_asset(&releases, asset_name).map(|asset| asset.browser_download_url.clone());

    let download = async {
        if let Some(url) = &selected {
            info!(url = %url, "triggering download");
            page.set_download(url);
            page.click_download();
            sleep(options.reveal_delay).await;
            page.reveal_fallback();
        } else {
            debug!("no release carries a matching asset, skipping download");
        }
    };

    let changelog = async {
        sleep(CHANGELOG_DELAY).await;
        if let Err(err) =
            append_releases(client, &options.markdown_endpoint, page, &releases, 0).await
        {
            debug!(%err, "changelog rendering stopped early");
        }
    };

    tokio::join!(download, changelog);

    Ok(releases)
}
