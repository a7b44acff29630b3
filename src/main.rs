use std::{
    env,
    fs::{self, File},
    io::{stdout, Write},
    path::{Path, PathBuf},
    process::exit,
    time::{Duration, Instant},
};

use anyhow::anyhow;
use dlpage::{
    get_error_chain, github::tag_version, populate_page, Error, HtmlDocument, PageOptions,
};
use futures_util::StreamExt;
use humantime::format_duration;
use reqwest::Client;
use tokio::runtime;
use tracing_subscriber::EnvFilter;

const PAGE_NAME: &str = "index.html";
const DEFAULT_OUT_DIR: &str = "page";

/// Streams `url` into `out_dir`, painting progress over one terminal line.
async fn download_asset(client: &Client, url: &str, out_dir: &Path) -> anyhow::Result<PathBuf> {
    let file_name = url
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .ok_or(anyhow!("could not get a file name from {url}"))?;

    let downloaded = client.get(url).send().await?.error_for_status()?;

    let download_size = downloaded
        .content_length()
        .ok_or(anyhow!("could not get content_length"))?;

    let download_start = Instant::now();
    let download_output = out_dir.join(file_name);
    let mut file = File::create(&download_output)?;

    let msg = format!("downloading {file_name}");
    let term_cols = termsize::get().map_or(0, |s| s.cols as usize);
    let mut progress = 0;

    let mut stdout = stdout().lock();
    let mut bytes_stream = downloaded.bytes_stream();
    while let Some(chunk) = bytes_stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)?;
        progress += chunk.len();

        let msg = format!(
            "\r{msg}, {} bytes left",
            download_size.saturating_sub(progress as u64)
        );
        write!(stdout, "{msg}{}", " ".repeat(term_cols.saturating_sub(msg.len())))?;
        stdout.flush()?;
    }

    let elapsed = Duration::from_secs(download_start.elapsed().as_secs());
    writeln!(stdout, "\ndone! took {}", format_duration(elapsed))?;

    Ok(download_output)
}

async fn inner_main() -> anyhow::Result<()> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    let (Some(slug), Some(asset_name)) = (args.first(), args.get(1)) else {
        println!("usage: dlpage <owner/repo> <asset-name> [output-dir]");
        exit(2);
    };
    let out_dir = args
        .get(2)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR));

    let endpoint = format!("https://api.github.com/repos/{slug}/releases");
    let client = Client::new();
    let document = HtmlDocument::new();

    let wanted = asset_name.clone();
    let populated = populate_page(
        &client,
        &endpoint,
        move |_| wanted.clone(),
        &document,
        &PageOptions::default(),
    )
    .await;

    let releases = match populated {
        Ok(releases) => releases,
        Err(err) => {
            // the page degrades to nothing rather than failing loudly.
            println!("failed to fetch releases!");
            println!("errors: {}", get_error_chain(&anyhow::Error::from(err)));
            return Ok(());
        }
    };

    if let Some(version) = releases.first().and_then(tag_version) {
        println!("latest release is {version}");
    }

    fs::create_dir_all(&out_dir)?;
    fs::write(out_dir.join(PAGE_NAME), document.render())?;

    match document.download_url() {
        Some(url) => {
            download_asset(&client, &url, &out_dir).await?;
        }
        None => {
            println!(
                "errors: {}",
                get_error_chain(&anyhow::Error::from(Error::NoAssetMatched))
            );
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dlpage=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let rt = runtime::Builder::new_current_thread()
        .enable_io()
        .enable_time()
        .build()?;

    rt.block_on(inner_main())
}
