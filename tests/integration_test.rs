//! Integration tests for the watch pipeline
//! Runs the full pass against the fixture README with a stubbed fetch and mailer

use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use internship_watch::config::Settings;
use internship_watch::notify::{Digest, EmailCredentials, Mailer, NotifyOutcome};
use internship_watch::run::{run_once, RunOutcome};
use internship_watch::scrapers::{parse_listings_at, ScrapeError};
use internship_watch::storage::{load_listings, save_listings};
use internship_watch::Listing;

const FOUND: &str = "2025-01-02T08:00:00Z";

#[derive(Default)]
struct RecordingMailer {
    sent: RefCell<Vec<Digest>>,
}

impl Mailer for RecordingMailer {
    fn deliver(&self, digest: &Digest, _credentials: &EmailCredentials) -> Result<()> {
        self.sent.borrow_mut().push(digest.clone());
        Ok(())
    }
}

fn fixture() -> String {
    fs::read_to_string("tests/fixtures/readme.md").expect("Failed to read readme.md fixture")
}

fn settings_in(root: &std::path::Path) -> Settings {
    let root = root.to_string_lossy().to_string();
    Settings::from_lookup(|key| match key {
        "ROOT" => Some(root.clone()),
        _ => None,
    })
}

fn credentials() -> EmailCredentials {
    EmailCredentials {
        username: "watcher@gmail.com".to_string(),
        app_password: "app-pass".to_string(),
        recipient: "me@example.com".to_string(),
    }
}

fn listing(company: &str, position: &str) -> Listing {
    Listing {
        company: company.to_string(),
        position: position.to_string(),
        location: String::new(),
        work_model: String::new(),
        date_posted: String::new(),
        apply_link: String::new(),
        company_url: String::new(),
        found_date: String::new(),
    }
}

#[test]
fn test_fixture_parses_qualifying_rows_in_order() {
    let listings = parse_listings_at(&fixture(), FOUND);

    let ids: Vec<(String, String)> = listings
        .iter()
        .map(|l| (l.company.clone(), l.position.clone()))
        .collect();
    assert_eq!(
        ids,
        vec![
            ("Acme".to_string(), "PM Intern".to_string()),
            ("Acme".to_string(), "Growth PM Intern".to_string()),
            ("Globex".to_string(), "Ops Intern".to_string()),
            ("Hooli".to_string(), "APM Intern".to_string()),
        ]
    );

    assert_eq!(listings[0].company_url, "https://acme.com");
    assert_eq!(listings[0].apply_link, "https://acme.com/apply");
    assert_eq!(listings[1].location, "San Francisco, CA");
    assert_eq!(listings[1].work_model, "On Site");
    assert!(listings.iter().all(|l| l.found_date == FOUND));
}

#[test]
fn test_first_run_notifies_everything_and_saves() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(dir.path());
    let mailer = RecordingMailer::default();

    let outcome = run_once(&settings, |_, _| Ok(fixture()), Some(&credentials()), &mailer).unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Completed {
            total: 4,
            previous: 0,
            new: 4,
            notify: NotifyOutcome::Sent(4),
        }
    );
    assert_eq!(mailer.sent.borrow()[0].subject, "[Internship Alert] 4 new listing(s)");
    assert_eq!(load_listings(&settings.snapshot_path()).len(), 4);
}

#[test]
fn test_second_run_only_reports_unseen() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(dir.path());
    save_listings(
        &settings.snapshot_path(),
        &[listing("Acme", "PM Intern"), listing("Globex", "Ops Intern"), listing("Gone", "Old Intern")],
    )
    .unwrap();
    let mailer = RecordingMailer::default();

    let outcome = run_once(&settings, |_, _| Ok(fixture()), Some(&credentials()), &mailer).unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Completed {
            total: 4,
            previous: 3,
            new: 2,
            notify: NotifyOutcome::Sent(2),
        }
    );
    let sent = mailer.sent.borrow();
    assert!(sent[0].text_body.contains("Acme - Growth PM Intern"));
    assert!(sent[0].text_body.contains("Hooli - APM Intern"));
    assert!(!sent[0].text_body.contains("Globex"));

    // snapshot replaced wholesale
    let saved = load_listings(&settings.snapshot_path());
    assert_eq!(saved.len(), 4);
    assert!(saved.iter().all(|l| l.company != "Gone"));
}

#[test]
fn test_unchanged_readme_sends_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(dir.path());
    let mailer = RecordingMailer::default();

    run_once(&settings, |_, _| Ok(fixture()), Some(&credentials()), &mailer).unwrap();
    let outcome = run_once(&settings, |_, _| Ok(fixture()), Some(&credentials()), &mailer).unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Completed {
            total: 4,
            previous: 4,
            new: 0,
            notify: NotifyOutcome::NothingToSend,
        }
    );
    assert_eq!(mailer.sent.borrow().len(), 1);
}

#[test]
fn test_missing_credentials_still_saves_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(dir.path());
    let mailer = RecordingMailer::default();

    let outcome = run_once(&settings, |_, _| Ok(fixture()), None, &mailer).unwrap();

    match outcome {
        RunOutcome::Completed { notify, .. } => assert_eq!(notify, NotifyOutcome::NotConfigured),
        other => panic!("unexpected outcome {:?}", other),
    }
    assert!(mailer.sent.borrow().is_empty());
    assert_eq!(load_listings(&settings.snapshot_path()).len(), 4);
}

#[test]
fn test_fetch_failure_leaves_snapshot_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(dir.path());
    let previous = vec![listing("Acme", "PM Intern")];
    save_listings(&settings.snapshot_path(), &previous).unwrap();
    let before = fs::read_to_string(settings.snapshot_path()).unwrap();
    let mailer = RecordingMailer::default();

    let outcome = run_once(
        &settings,
        |url, _| {
            Err(ScrapeError::Http {
                status: 500,
                url: url.to_string(),
            })
        },
        Some(&credentials()),
        &mailer,
    )
    .unwrap();

    assert!(matches!(outcome, RunOutcome::FetchFailed(ref msg) if msg.starts_with("HTTP 500")));
    assert!(mailer.sent.borrow().is_empty());
    assert_eq!(fs::read_to_string(settings.snapshot_path()).unwrap(), before);
}

#[test]
fn test_corrupt_snapshot_counts_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(dir.path());
    fs::write(settings.snapshot_path(), "[{\"company\": ").unwrap();
    let mailer = RecordingMailer::default();

    let outcome = run_once(&settings, |_, _| Ok(fixture()), Some(&credentials()), &mailer).unwrap();

    assert!(matches!(outcome, RunOutcome::Completed { previous: 0, new: 4, .. }));
    let path: PathBuf = settings.snapshot_path();
    assert_eq!(load_listings(&path).len(), 4);
}
