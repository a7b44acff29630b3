use reqwest::{Client, Request, Response, StatusCode};
use tracing::debug;

use crate::error::{Error, Result};

/// Pins the api version on every github call.
pub const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

// github rejects api requests that carry no user agent.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:136.0) Gecko/20100101 Firefox/136.0";

/// Dispatch a fully configured request, yielding the response only if it
/// completed with status 200 exactly. Every other outcome is a typed error
/// the caller is free to drop.
pub async fn execute_ok(client: &Client, request: Request) -> Result<Response> {
    let response = client.execute(request).await?;
    match response.status() {
        StatusCode::OK => Ok(response),
        status => {
            debug!(%status, url = %response.url(), "dropping non-200 response");
            Err(Error::Status(status))
        }
    }
}
