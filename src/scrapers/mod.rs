pub mod fallback;
pub mod table;

use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION};
use thiserror::Error;

pub use fallback::parse_loose_listings;
pub use table::{parse_listings, parse_listings_at};

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },
    #[error("README at {0} is empty")]
    EmptyBody(String),
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
}

/// Raw README URL for a GitHub repository branch.
pub fn readme_url(owner: &str, repo: &str, branch: &str) -> String {
    format!(
        "https://raw.githubusercontent.com/{}/{}/{}/README.md",
        owner, repo, branch
    )
}

/// Fetch the README markdown, sending `token` as a bearer token when given.
pub fn fetch_readme(url: &str, token: Option<&str>) -> Result<String, ScrapeError> {
    tracing::info!("Fetching README: {}", url);

    let client = reqwest::blocking::Client::builder()
        .user_agent("Mozilla/5.0 (compatible; InternshipWatch/0.1)")
        .timeout(Duration::from_secs(30))
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()?;

    let mut request = client
        .get(url)
        .header(ACCEPT, "application/vnd.github.v3.raw, text/plain");
    if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
        request = request.header(AUTHORIZATION, format!("Bearer {}", token.trim()));
    }

    let response = request.send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(ScrapeError::Http {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let body = response.text()?;
    if body.trim().is_empty() {
        return Err(ScrapeError::EmptyBody(url.to_string()));
    }

    tracing::debug!("Fetched {} bytes", body.len());
    Ok(body)
}
