use serde::{Deserialize, Serialize};

/// One internship posting as it appears in the watched README.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Listing {
    pub company: String,
    pub position: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub work_model: String,
    #[serde(default)]
    pub date_posted: String,
    #[serde(default)]
    pub apply_link: String,
    #[serde(default)]
    pub company_url: String,
    /// RFC 3339 time of the parse that produced this listing
    #[serde(default)]
    pub found_date: String,
}

/// Logical identity used for dedup and new-vs-seen comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListingId {
    pub company: String,
    pub position: String,
}

impl Listing {
    pub fn identity(&self) -> ListingId {
        ListingId {
            company: self.company.clone(),
            position: self.position.clone(),
        }
    }

    /// Location, work model and date joined for one-line display.
    /// Empty parts are left out.
    pub fn details_line(&self) -> String {
        [&self.location, &self.work_model, &self.date_posted]
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" · ")
    }
}

/// All listings visible in one run, in README order.
pub type Snapshot = Vec<Listing>;
