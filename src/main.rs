use anyhow::Result;

use internship_watch::config::Settings;
use internship_watch::logging::init_logging;
use internship_watch::notify::{EmailCredentials, SmtpMailer};
use internship_watch::run::{run_once, RunOutcome};
use internship_watch::scrapers::fetch_readme;

fn main() -> Result<()> {
    let settings = Settings::from_env();
    init_logging(&settings.log_level);

    tracing::info!("Starting scraper at {}", chrono::Utc::now().to_rfc3339());

    let credentials = EmailCredentials::from_env();
    let mailer = SmtpMailer::default();

    match run_once(&settings, fetch_readme, credentials.as_ref(), &mailer)? {
        RunOutcome::FetchFailed(_) => {
            tracing::warn!("Failed to fetch README content, snapshot left unchanged");
        }
        RunOutcome::Completed { .. } => {
            tracing::info!("Scraper completed successfully");
        }
    }

    Ok(())
}
