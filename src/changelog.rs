use reqwest::Client;
use serde::Serialize;

use crate::error::Result;
use crate::fetch::{execute_ok, GITHUB_ACCEPT, USER_AGENT};
use crate::github::Release;
use crate::page::Page;

/// Payload for the markdown render endpoint.
#[derive(Serialize)]
struct RenderRequest<'a> {
    text: &'a str,
}

/// Convert one markdown body to html through the remote renderer.
async fn render_markdown(client: &Client, endpoint: &str, text: &str) -> Result<String> {
    let request = client
        .post(endpoint)
        .header("Accept", GITHUB_ACCEPT)
        .header("User-Agent", USER_AGENT)
        .json(&RenderRequest { text })
        .build()?;
    let response = execute_ok(client, request).await?;
    Ok(response.text().await?)
}

/// Append every release from `start` onwards to the page, one heading and
/// one rendered body per release.
///
/// Appends are strictly in order: release `n + 1` is never appended before
/// release `n`'s render completed, since each render is awaited before the
/// next is dispatched. The first render that fails stops the walk; entries
/// already appended stay put. An out-of-range `start` appends nothing.
pub async fn append_releases(
    client: &Client,
    endpoint: &str,
    page: &impl Page,
    releases: &[Release],
    start: usize,
) -> Result<()> {
    if start >= releases.len() {
        return Ok(());
    }

    for release in &releases[start..] {
        let html = render_markdown(client, endpoint, &release.body).await?;
        page.append_release(&release.tag_name, &html);
    }

    Ok(())
}
