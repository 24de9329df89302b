//! Loose-line parser for READMEs that list internships as bullets or
//! ad-hoc pipe lines instead of a proper table.
//!
//! Not part of the regular run; callers opt in when the table parser
//! comes back empty.

use chrono::{SecondsFormat, Utc};

use crate::normalize::{clean_cell, extract_link, find_apply_link, is_continuation_marker};
use crate::types::Listing;

use super::table::{split_cells, TableLine, TableMode};

const MIN_PARTS: usize = 3;

pub fn parse_loose_listings(text: &str) -> Vec<Listing> {
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    parse_loose_listings_at(text, &now)
}

pub fn parse_loose_listings_at(text: &str, found_date: &str) -> Vec<Listing> {
    let mut mode = TableMode::default();
    let mut listings = Vec::new();

    for line in text.lines().map(str::trim) {
        if mode.step(line) != TableLine::Outside {
            continue;
        }
        if !line.to_lowercase().contains("intern") {
            continue;
        }
        if let Some(listing) = parse_loose_line(line, found_date) {
            listings.push(listing);
        }
    }

    tracing::debug!("Parsed {} listings from loose lines", listings.len());
    listings
}

fn parse_loose_line(line: &str, found_date: &str) -> Option<Listing> {
    let parts: Vec<&str> = if line.contains('|') {
        split_cells(line)
    } else {
        let unbulleted = line
            .strip_prefix("* ")
            .or_else(|| line.strip_prefix("- "))
            .unwrap_or(line);
        unbulleted.split(" - ").map(str::trim).collect()
    };

    // columns are positional; blanks count as missing, never shift
    let filled = parts.iter().filter(|p| !clean_cell(p).is_empty()).count();
    if filled < MIN_PARTS {
        return None;
    }

    let (company, company_url) = extract_link(parts[0]);
    let (position, title_url) = extract_link(parts[1]);
    if company.is_empty() || is_continuation_marker(&company) || position.is_empty() {
        return None;
    }

    let apply_link = if title_url.is_empty() {
        find_apply_link(line).unwrap_or_default()
    } else {
        title_url
    };
    let rest = |i: usize| parts.get(i).map(|p| clean_cell(p)).unwrap_or_default();

    Some(Listing {
        company,
        position,
        location: rest(2),
        work_model: rest(3),
        date_posted: rest(4),
        apply_link,
        company_url,
        found_date: found_date.to_string(),
    })
}
