//! Markdown Table Parser
//!
//! Walks the README line by line, entering table mode on a `TABLE_START`
//! comment or a recognised header row. A marked table ends at `TABLE_END`;
//! a header-started table ends at the first line that is not a pipe row.
//! Each qualifying row becomes one [`Listing`]; rows whose company cell is
//! a continuation marker inherit the company of the previous listing.

use chrono::{SecondsFormat, Utc};
use thiserror::Error;

use crate::normalize::{clean_cell, extract_link, find_apply_link, is_continuation_marker};
use crate::types::Listing;

/// Company, title, location, work model, date posted
pub const MIN_CELLS: usize = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RowError {
    #[error("expected at least 5 cells, found {0}")]
    TooFewCells(usize),
    #[error("continuation row with no previous company")]
    OrphanContinuation,
    #[error("empty company name")]
    EmptyCompany,
    #[error("empty position title")]
    EmptyPosition,
}

#[derive(Debug, Clone)]
struct Company {
    name: String,
    url: String,
}

/// Where the scan currently is relative to a listings table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum TableMode {
    #[default]
    Outside,
    /// Opened by `TABLE_START`, closed only by `TABLE_END`
    Marked,
    /// Opened by a header row, closed by the first non-pipe line
    Headed,
}

/// How one line relates to the listings table.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum TableLine<'a> {
    /// Marker, header, separator or non-row text inside a marked table
    Structure,
    Row(Vec<&'a str>),
    Outside,
}

impl TableMode {
    /// Advance the table state past `line` and classify it.
    pub(crate) fn step<'a>(&mut self, line: &'a str) -> TableLine<'a> {
        if is_start_marker(line) {
            *self = TableMode::Marked;
            return TableLine::Structure;
        }
        if is_end_marker(line) {
            *self = TableMode::Outside;
            return TableLine::Structure;
        }
        if !line.starts_with('|') {
            return match *self {
                TableMode::Marked => TableLine::Structure,
                TableMode::Headed | TableMode::Outside => {
                    *self = TableMode::Outside;
                    TableLine::Outside
                }
            };
        }

        let cells = split_cells(line);
        if is_header_row(&cells) {
            if *self == TableMode::Outside {
                *self = TableMode::Headed;
            }
            return TableLine::Structure;
        }
        match *self {
            TableMode::Outside => TableLine::Outside,
            _ if is_separator_row(line) => TableLine::Structure,
            _ => TableLine::Row(cells),
        }
    }
}

#[derive(Debug, Default)]
struct TableScan {
    mode: TableMode,
    last_company: Option<Company>,
    listings: Vec<Listing>,
}

/// Parse every listing table in `markdown`, stamping listings with the
/// current time.
pub fn parse_listings(markdown: &str) -> Vec<Listing> {
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    parse_listings_at(markdown, &now)
}

/// Same as [`parse_listings`] with a caller-supplied discovery timestamp.
pub fn parse_listings_at(markdown: &str, found_date: &str) -> Vec<Listing> {
    let scan = markdown
        .lines()
        .enumerate()
        .fold(TableScan::default(), |mut scan, (index, raw)| {
            let line = raw.trim();
            let cells = match scan.mode.step(line) {
                TableLine::Row(cells) => cells,
                TableLine::Structure | TableLine::Outside => return scan,
            };

            match parse_row(&cells, line, scan.last_company.as_ref(), found_date) {
                Ok(listing) => {
                    scan.last_company = Some(Company {
                        name: listing.company.clone(),
                        url: listing.company_url.clone(),
                    });
                    scan.listings.push(listing);
                }
                Err(RowError::TooFewCells(n)) => {
                    tracing::debug!("Skipping line {}: {} cells", index + 1, n);
                }
                Err(e) => {
                    tracing::warn!("Skipping line {}: {}", index + 1, e);
                }
            }
            scan
        });

    tracing::debug!("Parsed {} listings from table rows", scan.listings.len());
    scan.listings
}

fn parse_row(
    cells: &[&str],
    line: &str,
    last_company: Option<&Company>,
    found_date: &str,
) -> Result<Listing, RowError> {
    if cells.len() < MIN_CELLS {
        return Err(RowError::TooFewCells(cells.len()));
    }

    let (company_name, company_url) = extract_link(cells[0]);
    let company = if company_name.is_empty() || is_continuation_marker(&company_name) {
        last_company.cloned().ok_or(RowError::OrphanContinuation)?
    } else {
        Company {
            name: company_name,
            url: company_url,
        }
    };
    if company.name.is_empty() {
        return Err(RowError::EmptyCompany);
    }

    let (position, title_url) = extract_link(cells[1]);
    if position.is_empty() {
        return Err(RowError::EmptyPosition);
    }
    let apply_link = if title_url.is_empty() {
        find_apply_link(line).unwrap_or_default()
    } else {
        title_url
    };

    Ok(Listing {
        company: company.name,
        position,
        location: clean_cell(cells[2]),
        work_model: clean_cell(cells[3]),
        date_posted: clean_cell(cells[4]),
        apply_link,
        company_url: company.url,
        found_date: found_date.to_string(),
    })
}

/// Split a pipe row into trimmed cells, dropping the edge pipes.
pub fn split_cells(line: &str) -> Vec<&str> {
    let inner = line.trim();
    let inner = inner.strip_prefix('|').unwrap_or(inner);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    inner.split('|').map(str::trim).collect()
}

fn is_start_marker(line: &str) -> bool {
    line.starts_with("<!--") && line.contains("TABLE_START")
}

fn is_end_marker(line: &str) -> bool {
    line.starts_with("<!--") && line.contains("TABLE_END")
}

fn is_separator_row(line: &str) -> bool {
    line.contains('-')
        && line
            .chars()
            .all(|c| c == '|' || c == '-' || c == ':' || c.is_whitespace())
}

fn is_header_row(cells: &[&str]) -> bool {
    if cells.len() < MIN_CELLS {
        return false;
    }
    let headers: Vec<String> = cells.iter().map(|c| clean_cell(c).to_lowercase()).collect();
    headers[0] == "company"
        && ["job title", "position", "role", "title"].contains(&headers[1].as_str())
        && headers[2] == "location"
        && headers[3].contains("work")
        && headers[4].contains("date")
}
