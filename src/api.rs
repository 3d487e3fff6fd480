use log::{info, warn};
use reqwest::IntoUrl;
use thiserror::Error;

use crate::{parser::parse_all_dams, schema::DamTable};

pub const DAM_LEVELS_URL: &str = "http://www.seqwater.com.au/water-supply/dam-levels";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to fetch the dam levels page: {0}")]
    Network(#[from] reqwest::Error),
}

pub fn reqwest_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .connection_verbose(true)
        .build()
}

/// Downloads the page body as text.
///
/// An error status is not treated as a failure: whatever body came back
/// is returned, and the parser decides whether it is usable.
pub async fn fetch(client: &reqwest::Client, url: impl IntoUrl) -> Result<String, FetchError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    info!("GET {} -> {status}", response.url());
    if !status.is_success() {
        warn!("Server answered {status}; using the body anyway");
    }
    Ok(response.text().await?)
}

pub async fn download_dam_table(
    client: &reqwest::Client,
    url: impl IntoUrl,
) -> anyhow::Result<DamTable> {
    let html = fetch(client, url).await?;
    Ok(parse_all_dams(&html)?)
}
