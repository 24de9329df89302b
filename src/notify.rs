use std::env;
use std::fmt::{self, Display};

use anyhow::{Context, Result};
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::{Credentials, Mechanism};
use lettre::{Message, SmtpTransport, Transport};

use crate::types::Listing;

pub const SMTP_HOST: &str = "smtp.gmail.com";
pub const SMTP_PORT: u16 = 587;

/// A composed digest, ready for any transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailCredentials {
    pub username: String,
    pub app_password: String,
    pub recipient: String,
}

impl EmailCredentials {
    /// `None` unless `GMAIL_USERNAME`, `GMAIL_APP_PASSWORD` and
    /// `RECIPIENT_EMAIL` are all set and non-empty.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(get: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Some(EmailCredentials {
            username: var("GMAIL_USERNAME")?,
            app_password: var("GMAIL_APP_PASSWORD")?,
            recipient: var("RECIPIENT_EMAIL")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    NothingToSend,
    NotConfigured,
    Sent(usize),
    Failed(String),
}

pub trait Mailer {
    fn deliver(&self, digest: &Digest, credentials: &EmailCredentials) -> Result<()>;
}

/// STARTTLS submission with PLAIN/LOGIN auth.
#[derive(Debug, Clone)]
pub struct SmtpMailer {
    pub host: String,
    pub port: u16,
}

impl Default for SmtpMailer {
    fn default() -> Self {
        SmtpMailer {
            host: SMTP_HOST.to_string(),
            port: SMTP_PORT,
        }
    }
}

impl Mailer for SmtpMailer {
    fn deliver(&self, digest: &Digest, credentials: &EmailCredentials) -> Result<()> {
        let from: Mailbox = credentials
            .username
            .parse()
            .with_context(|| format!("Invalid sender address {:?}", credentials.username))?;
        let to: Mailbox = credentials
            .recipient
            .parse()
            .with_context(|| format!("Invalid recipient address {:?}", credentials.recipient))?;

        let email = Message::builder()
            .from(from)
            .to(to)
            .subject(digest.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                digest.text_body.clone(),
                digest.html_body.clone(),
            ))
            .context("Failed to build digest message")?;

        let mailer = SmtpTransport::starttls_relay(&self.host)
            .with_context(|| format!("Failed to set up STARTTLS relay {}", self.host))?
            .port(self.port)
            .credentials(Credentials::new(
                credentials.username.clone(),
                credentials.app_password.clone(),
            ))
            .authentication(vec![Mechanism::Plain, Mechanism::Login])
            .build();

        mailer.send(&email).context("SMTP delivery failed")?;
        Ok(())
    }
}

/// Build the digest for `listings`; `None` when there is nothing new.
pub fn compose_digest(listings: &[Listing], source_url: &str) -> Option<Digest> {
    if listings.is_empty() {
        return None;
    }

    Some(Digest {
        subject: format!("[Internship Alert] {} new listing(s)", listings.len()),
        text_body: text_body(listings),
        html_body: DigestTemplate {
            listings,
            source_url,
        }
        .to_string(),
    })
}

/// Compose and deliver. Never fails the run: every problem is logged and
/// reported through the outcome.
pub fn send_digest(
    listings: &[Listing],
    source_url: &str,
    credentials: Option<&EmailCredentials>,
    mailer: &dyn Mailer,
) -> NotifyOutcome {
    let digest = match compose_digest(listings, source_url) {
        Some(digest) => digest,
        None => return NotifyOutcome::NothingToSend,
    };

    let credentials = match credentials {
        Some(credentials) => credentials,
        None => {
            tracing::warn!("Email configuration incomplete, skipping notification");
            return NotifyOutcome::NotConfigured;
        }
    };

    tracing::debug!("Sending digest to {}", credentials.recipient);
    match mailer.deliver(&digest, credentials) {
        Ok(()) => {
            tracing::info!("Email sent: {} new listing(s)", listings.len());
            NotifyOutcome::Sent(listings.len())
        }
        Err(e) => {
            tracing::error!("Error sending email: {:#}", e);
            NotifyOutcome::Failed(format!("{:#}", e))
        }
    }
}

fn text_body(listings: &[Listing]) -> String {
    let mut body = format!("New internship listings ({} found):\n\n", listings.len());
    for listing in listings {
        body.push_str(&format!("• {} - {}\n", listing.company, listing.position));
        let details = listing.details_line();
        if !details.is_empty() {
            body.push_str(&format!("  {}\n", details));
        }
        if !listing.apply_link.is_empty() {
            body.push_str(&format!("  Apply: {}\n", listing.apply_link));
        }
        body.push('\n');
    }
    body
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

struct DigestTemplate<'a> {
    listings: &'a [Listing],
    source_url: &'a str,
}

impl<'a> Display for DigestTemplate<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries = String::new();
        for listing in self.listings {
            let company = if listing.company_url.is_empty() {
                escape_html(&listing.company)
            } else {
                format!(
                    r#"<a href="{}">{}</a>"#,
                    escape_html(&listing.company_url),
                    escape_html(&listing.company)
                )
            };
            let apply = if listing.apply_link.is_empty() {
                String::new()
            } else {
                format!(
                    r#"<a href="{}" class="apply-btn">Apply</a>"#,
                    escape_html(&listing.apply_link)
                )
            };
            entries.push_str(&format!(
                r#"
                <div class="listing">
                    <div class="company">{}</div>
                    <div class="position">{}</div>
                    <div class="details">{}</div>
                    {}
                </div>"#,
                company,
                escape_html(&listing.position),
                escape_html(&listing.details_line()),
                apply
            ));
        }

        write!(
            f,
            r#"<!DOCTYPE html>
            <html>
            <head>
                <meta charset="utf-8">
                <style>
                    body {{ font-family: Arial, sans-serif; margin: 20px; }}
                    .header {{ background-color: #f8f9fa; padding: 15px; border-left: 4px solid #007bff; }}
                    .listing {{ margin: 15px 0; padding: 15px; border: 1px solid #ddd; border-radius: 5px; }}
                    .company {{ font-weight: bold; font-size: 16px; color: #333; }}
                    .position {{ font-size: 14px; color: #666; margin: 5px 0; }}
                    .details {{ font-size: 12px; color: #888; }}
                    .apply-btn {{
                        background-color: #007bff;
                        color: white;
                        padding: 8px 16px;
                        text-decoration: none;
                        border-radius: 3px;
                        display: inline-block;
                        margin-top: 10px;
                    }}
                    .footer {{ margin-top: 20px; font-size: 12px; color: #666; }}
                </style>
            </head>
            <body>
                <div class="header">
                    <h2>New Internship Listings</h2>
                    <p>Found {} new internship opportunity(ies)!</p>
                </div>{}
                <div class="footer">
                    <p>Source: <a href="{}">GitHub Repository</a></p>
                    <p>This alert was generated automatically.</p>
                </div>
            </body>
            </html>
            "#,
            self.listings.len(),
            entries,
            escape_html(self.source_url)
        )
    }
}
