//! Populate a "your download should begin shortly" page from a github
//! releases endpoint: pick the newest release with a matching asset, trigger
//! its download, and render every release's markdown changelog underneath.

pub mod changelog;
pub mod error;
pub mod fetch;
pub mod github;
pub mod page;
pub mod populate;

pub use error::{Error, Result};
pub use github::{find_asset, request_releases, Asset, Release};
pub use page::{HtmlDocument, Page};
pub use populate::{populate_page, PageOptions, GITHUB_MARKDOWN_URL};

pub fn get_error_chain(err: &anyhow::Error) -> String {
    err.chain()
        .rev()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" => ")
}
