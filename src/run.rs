use anyhow::Result;

use crate::config::Settings;
use crate::filter::{dedup_by_identity, find_new_listings};
use crate::notify::{send_digest, EmailCredentials, Mailer, NotifyOutcome};
use crate::scrapers::{parse_listings, ScrapeError};
use crate::storage::{load_listings, save_listings};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// README could not be fetched; snapshot left untouched
    FetchFailed(String),
    Completed {
        total: usize,
        previous: usize,
        new: usize,
        notify: NotifyOutcome,
    },
}

/// One pass: load snapshot, fetch, parse, diff, notify, save.
///
/// Only a fetch failure stops the pass early. A snapshot write error is
/// the one failure returned to the caller.
pub fn run_once<F>(
    settings: &Settings,
    fetch: F,
    credentials: Option<&EmailCredentials>,
    mailer: &dyn Mailer,
) -> Result<RunOutcome>
where
    F: FnOnce(&str, Option<&str>) -> Result<String, ScrapeError>,
{
    let snapshot_path = settings.snapshot_path();
    let previous = load_listings(&snapshot_path);

    let readme = match fetch(&settings.readme_url, settings.github_token.as_deref()) {
        Ok(readme) => readme,
        Err(e) => {
            tracing::error!("Error fetching README: {}", e);
            return Ok(RunOutcome::FetchFailed(e.to_string()));
        }
    };

    let current = parse_listings(&readme);
    tracing::info!("Found {} total listings", current.len());
    tracing::info!("Previously had {} listings", previous.len());

    let new_listings = find_new_listings(&current, &previous);
    if new_listings.is_empty() {
        tracing::info!("No new listings found");
    } else {
        tracing::info!("Found {} new listings!", new_listings.len());
        for listing in &new_listings {
            tracing::info!("  - {}: {}", listing.company, listing.position);
        }
    }

    let notify = send_digest(&new_listings, &settings.repo_page_url, credentials, mailer);

    let total = current.len();
    save_listings(&snapshot_path, &dedup_by_identity(current))?;
    tracing::info!("Saved snapshot to {:?}", snapshot_path);

    Ok(RunOutcome::Completed {
        total,
        previous: previous.len(),
        new: new_listings.len(),
        notify,
    })
}
