//! Screen states of a browse session.
//!
//! Each state owns a full copy of the state it was reached from, so any
//! screen (including the ones behind "Back") can be rendered from the state
//! alone.

use serde::{Deserialize, Serialize};

use crate::media::{MediaEntry, Offer};

/// Results of one search query, in provider order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub query: String,
    pub entries: Vec<MediaEntry>,
}

/// One title picked from a search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailsState {
    pub parent: SearchResult,
    pub entry: MediaEntry,
}

/// The offers of one type for the title in `parent`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffersState {
    pub parent: DetailsState,
    pub offer_type: String,
    pub offers: Vec<Offer>,
}

/// Any renderable screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Screen {
    #[serde(rename = "s")]
    SearchResults(SearchResult),
    #[serde(rename = "d")]
    Details(DetailsState),
    #[serde(rename = "o")]
    Offers(OffersState),
}

impl Screen {
    /// The search result at the start of the parent chain
    pub fn root(&self) -> &SearchResult {
        match self {
            Screen::SearchResults(results) => results,
            Screen::Details(details) => &details.parent,
            Screen::Offers(offers) => &offers.parent.parent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_walks_parent_chain() {
        let results = SearchResult {
            query: "heat".to_string(),
            entries: vec![MediaEntry::new("Heat").with_release_year(1995)],
        };
        let details = DetailsState {
            parent: results.clone(),
            entry: results.entries[0].clone(),
        };
        let offers = OffersState {
            parent: details.clone(),
            offer_type: "BUY".to_string(),
            offers: Vec::new(),
        };

        assert_eq!(Screen::SearchResults(results.clone()).root(), &results);
        assert_eq!(Screen::Details(details).root(), &results);
        assert_eq!(Screen::Offers(offers).root(), &results);
    }
}
