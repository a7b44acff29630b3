use reqwest::Client;
use semver::Version;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::fetch::{execute_ok, GITHUB_ACCEPT, USER_AGENT};

/// A release's asset. Does not contain all fields.
#[derive(Debug, Deserialize)]
pub struct Asset {
    pub name: String,
    pub browser_download_url: String,
}

/// A github release. Does not contain all fields.
///
/// See the github [docs](https://docs.github.com/en/rest/releases/releases?apiVersion=2022-11-28#list-releases) for more information
#[derive(Debug, Deserialize)]
pub struct Release {
    pub tag_name: String,
    /// Markdown release notes. The api can omit this on drafts.
    #[serde(default)]
    pub body: String,
    pub assets: Vec<Asset>,
}

/// Fetch the full release list from `endpoint`, newest first, in the order
/// the api returns it.
pub async fn request_releases(client: &Client, endpoint: &str) -> Result<Vec<Release>> {
    let request = client
        .get(endpoint)
        .header("Accept", GITHUB_ACCEPT)
        .header("User-Agent", USER_AGENT)
        .build()?;
    let response = execute_ok(client, request).await?;
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(Error::MalformedReleases)
}

/// Scan for the first release (in list order) carrying an asset whose name is
/// what `asset_name` wants for that release. The first hit stops the scan, so
/// older releases never shadow newer ones.
pub fn find_asset<'a, F>(releases: &'a [Release], asset_name: F) -> Option<&'a Asset>
where
    F: Fn(&Release) -> String,
{
    for release in releases {
        let wanted = asset_name(release);
        if let Some(asset) = release.assets.iter().find(|a| a.name == wanted) {
            debug!(tag = %release.tag_name, asset = %asset.name, "matched asset");
            return Some(asset);
        }
    }
    None
}

/// Parse a release tag as a version, skipping the v in `v0.0.1`.
pub fn tag_version(release: &Release) -> Option<Version> {
    let tag = release
        .tag_name
        .strip_prefix('v')
        .unwrap_or(&release.tag_name);
    Version::parse(tag).ok()
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn release(tag: &str, assets: &[(&str, &str)]) -> Release {
        Release {
            tag_name: tag.to_string(),
            body: String::new(),
            assets: assets
                .iter()
                .map(|(name, url)| Asset {
                    name: (*name).to_string(),
                    browser_download_url: (*url).to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn first_release_in_list_order_wins() {
        let releases = vec![
            release("v2", &[("app.exe", "u2")]),
            release("v1", &[("app.exe", "u1")]),
        ];
        let asset = find_asset(&releases, |_| "app.exe".to_string()).unwrap();
        assert_eq!(asset.browser_download_url, "u2");
    }

    #[test]
    fn selector_is_consulted_per_release() {
        let releases = vec![
            release("v2", &[("app-v1.zip", "u2")]),
            release("v1", &[("app-v1.zip", "u1")]),
        ];
        // wants the tag baked into the name, so only v1's asset matches
        // even though v2 carries a file with the same name.
        let asset = find_asset(&releases, |r| format!("app-{}.zip", r.tag_name)).unwrap();
        assert_eq!(asset.browser_download_url, "u1");
    }

    #[test]
    fn no_matching_asset_yields_none() {
        let releases = vec![release("v1", &[("other.zip", "u1")])];
        assert!(find_asset(&releases, |_| "app.exe".to_string()).is_none());
    }

    #[test]
    fn releases_without_assets_are_skipped() {
        let releases = vec![release("v2", &[]), release("v1", &[("app.exe", "u1")])];
        let asset = find_asset(&releases, |_| "app.exe".to_string()).unwrap();
        assert_eq!(asset.browser_download_url, "u1");
    }

    #[test]
    fn tag_version_skips_the_v_prefix() {
        assert_eq!(
            tag_version(&release("v1.2.3", &[])),
            Some(Version::new(1, 2, 3))
        );
        assert_eq!(
            tag_version(&release("1.2.3", &[])),
            Some(Version::new(1, 2, 3))
        );
        assert_eq!(tag_version(&release("nightly", &[])), None);
    }

    #[test]
    fn release_body_defaults_to_empty() {
        let release: Release =
            serde_json::from_str(r#"{"tag_name": "v1", "assets": [], "html_url": "ignored"}"#)
                .unwrap();
        assert_eq!(release.tag_name, "v1");
        assert!(release.body.is_empty());
    }

    #[tokio::test]
    async fn request_releases_parses_the_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/releases"))
            .and(header("Accept", GITHUB_ACCEPT))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "tag_name": "v2",
                    "body": "# Two",
                    "assets": [{ "name": "app.zip", "browser_download_url": "u2" }]
                },
                {
                    "tag_name": "v1",
                    "body": "# One",
                    "assets": []
                }
            ])))
            .mount(&server)
            .await;

        let client = Client::new();
        let releases = request_releases(&client, &format!("{}/releases", server.uri()))
            .await
            .unwrap();

        assert_eq!(releases.len(), 2);
        assert_eq!(releases[0].tag_name, "v2");
        assert_eq!(releases[0].assets[0].name, "app.zip");
        assert_eq!(releases[1].body, "# One");
    }

    #[tokio::test]
    async fn non_200_is_a_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = request_releases(&Client::new(), &server.uri())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Status(status) if status.as_u16() == 500));
    }

    #[tokio::test]
    async fn malformed_body_is_a_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = request_releases(&Client::new(), &server.uri())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MalformedReleases(_)));
    }
}
