use std::collections::{HashMap, HashSet};

use crate::types::{Listing, ListingId};

/// Listings in `current` whose (company, position) identity is not in
/// `previous`, in `current` order. Duplicates within `current` pass through.
pub fn find_new_listings(current: &[Listing], previous: &[Listing]) -> Vec<Listing> {
    let seen: HashSet<ListingId> = previous.iter().map(Listing::identity).collect();

    current
        .iter()
        .filter(|listing| !seen.contains(&listing.identity()))
        .cloned()
        .collect()
}

/// Collapse listings sharing an identity. The later record's fields win but
/// the first occurrence keeps its position.
pub fn dedup_by_identity(listings: Vec<Listing>) -> Vec<Listing> {
    let mut slots: HashMap<ListingId, usize> = HashMap::new();
    let mut out: Vec<Listing> = Vec::with_capacity(listings.len());

    for listing in listings {
        match slots.get(&listing.identity()) {
            Some(&slot) => out[slot] = listing,
            None => {
                slots.insert(listing.identity(), out.len());
                out.push(listing);
            }
        }
    }

    out
}
