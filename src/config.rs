use std::env;
use std::path::PathBuf;

use crate::scrapers::readme_url;

pub const DEFAULT_OWNER: &str = "jobright-ai";
pub const DEFAULT_REPO: &str = "2025-Product-Management-Internship";
pub const DEFAULT_BRANCH: &str = "master";
pub const DEFAULT_SNAPSHOT_FILE: &str = "previous_listings.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub root: PathBuf,
    pub readme_url: String,
    /// Human-facing repository page, linked from the digest footer
    pub repo_page_url: String,
    pub snapshot_file: String,
    pub github_token: Option<String>,
    pub log_level: String,
}

impl Settings {
    /// Read settings from the process environment, after loading `.env`
    /// if one is present.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let owner = var("REPO_OWNER").unwrap_or_else(|| DEFAULT_OWNER.to_string());
        let repo = var("REPO_NAME").unwrap_or_else(|| DEFAULT_REPO.to_string());
        let branch = var("REPO_BRANCH").unwrap_or_else(|| DEFAULT_BRANCH.to_string());

        Settings {
            root: PathBuf::from(var("ROOT").unwrap_or_else(|| ".".to_string())),
            readme_url: var("README_URL").unwrap_or_else(|| readme_url(&owner, &repo, &branch)),
            repo_page_url: format!("https://github.com/{}/{}", owner, repo),
            snapshot_file: var("SNAPSHOT_FILE").unwrap_or_else(|| DEFAULT_SNAPSHOT_FILE.to_string()),
            github_token: var("GITHUB_TOKEN"),
            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        }
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.root.join(&self.snapshot_file)
    }
}
