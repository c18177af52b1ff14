//! # Navigation Module
//!
//! The browse state machine:
//!
//! ```text
//! AwaitingQuery -> SearchResults -> Details -> Offers
//!                       ^              ^         |
//!                       |              +- back --+
//!                       +---- back to search ----+
//! ```
//!
//! Button presses carry a [`Payload`] holding every state they need, so all
//! transitions except the initial search are pure functions of the payload.
//! A new query restarts the chain from any state.

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::config::RenderSettings;
use crate::errors::NavigationError;
use crate::screens::{DetailsState, OffersState, Screen, SearchResult};
use crate::search::SearchProvider;

/// Data attached to a button, naming the transition it triggers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Payload {
    /// Open the details of `results.entries[index]`
    #[serde(rename = "e")]
    SelectEntry { results: SearchResult, index: usize },
    /// Open the offers of one type
    #[serde(rename = "t")]
    SelectOfferType {
        details: DetailsState,
        offer_type: String,
    },
    /// Return from an offer list to its details screen
    #[serde(rename = "d")]
    BackToDetails(OffersState),
    /// Return to the search results at the root of the chain
    #[serde(rename = "s")]
    BackToSearch(Screen),
}

/// Inbound events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    SubmitQuery(String),
    Press(Payload),
    /// A button press whose data could not be resolved
    Stale,
}

/// Outcome of one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Show(Screen),
    /// Empty query; the provider was not called
    Rejected,
    /// The provider failed
    Failed { query: String },
    /// The pressed button's data has expired
    Expired,
}

/// Trim a query and reject it when nothing is left
pub fn validate_query(text: &str) -> Result<String, NavigationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(NavigationError::EmptyQuery);
    }
    Ok(trimmed.to_string())
}

/// Details of one search entry.
///
/// An index past the end falls back to the first entry. This mirrors how
/// buttons of an older result list used to behave and is kept as is.
pub fn select_entry(results: &SearchResult, index: usize) -> Result<DetailsState, NavigationError> {
    let index = if index < results.entries.len() {
        index
    } else {
        warn!(
            query = %results.query,
            index,
            entries = results.entries.len(),
            "Entry index out of range, falling back to first entry"
        );
        0
    };

    let entry = results.entries.get(index).cloned().ok_or_else(|| {
        NavigationError::InvalidSelection(format!("no entries for '{}'", results.query))
    })?;

    Ok(DetailsState {
        parent: results.clone(),
        entry,
    })
}

/// Offers of one type for the title in `details`
pub fn select_offer_type(
    details: &DetailsState,
    offer_type: &str,
) -> Result<OffersState, NavigationError> {
    let group = details.entry.offers_of_type(offer_type).ok_or_else(|| {
        NavigationError::InvalidSelection(format!(
            "'{}' has no {} offers",
            details.entry.title, offer_type
        ))
    })?;

    Ok(OffersState {
        parent: details.clone(),
        offer_type: group.offer_type.clone(),
        offers: group.offers.clone(),
    })
}

pub fn back_to_details(offers: OffersState) -> DetailsState {
    offers.parent
}

pub fn back_to_search(screen: Screen) -> SearchResult {
    match screen {
        Screen::SearchResults(results) => results,
        Screen::Details(details) => details.parent,
        Screen::Offers(offers) => offers.parent.parent,
    }
}

/// Resolve a button press to the screen it leads to.
///
/// Invalid selections leave the user on the screen the button was on.
pub fn press(payload: Payload) -> Screen {
    match payload {
        Payload::SelectEntry { results, index } => match select_entry(&results, index) {
            Ok(details) => Screen::Details(details),
            Err(e) => {
                warn!(error = %e, "Ignoring entry selection");
                Screen::SearchResults(results)
            }
        },
        Payload::SelectOfferType {
            details,
            offer_type,
        } => match select_offer_type(&details, &offer_type) {
            Ok(offers) => Screen::Offers(offers),
            Err(e) => {
                warn!(error = %e, "Ignoring offer type selection");
                Screen::Details(details)
            }
        },
        Payload::BackToDetails(offers) => Screen::Details(back_to_details(offers)),
        Payload::BackToSearch(screen) => Screen::SearchResults(back_to_search(screen)),
    }
}

/// Drives the state machine; owns the search provider
pub struct Navigator<P> {
    provider: P,
    render: RenderSettings,
}

impl<P: SearchProvider> Navigator<P> {
    pub fn new(provider: P, render: RenderSettings) -> Self {
        Self { provider, render }
    }

    pub fn render_settings(&self) -> &RenderSettings {
        &self.render
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Run a search. Empty queries never reach the provider.
    pub async fn submit_query(&self, text: &str) -> Result<SearchResult, NavigationError> {
        let query = validate_query(text)?;
        info!(query = %query, "Looking for titles");

        let entries = self.provider.search(&query).await?;
        info!(query = %query, entries = entries.len(), "Search completed");

        Ok(SearchResult { query, entries })
    }

    /// Handle one event. Errors are turned into steps, never returned.
    pub async fn step(&self, event: Event) -> Step {
        match event {
            Event::SubmitQuery(text) => match self.submit_query(&text).await {
                Ok(results) => Step::Show(Screen::SearchResults(results)),
                Err(NavigationError::EmptyQuery) => Step::Rejected,
                Err(e) => {
                    error!(error = %e, "Search failed");
                    Step::Failed {
                        query: text.trim().to_string(),
                    }
                }
            },
            Event::Press(payload) => Step::Show(press(payload)),
            Event::Stale => Step::Expired,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaEntry;

    fn results(titles: &[&str]) -> SearchResult {
        SearchResult {
            query: "q".to_string(),
            entries: titles.iter().map(|t| MediaEntry::new(*t)).collect(),
        }
    }

    #[test]
    fn test_validate_query() {
        assert_eq!(validate_query("  Inception ").unwrap(), "Inception");
        assert!(matches!(
            validate_query(" \t\n"),
            Err(NavigationError::EmptyQuery)
        ));
    }

    #[test]
    fn test_select_entry_in_range() {
        let details = select_entry(&results(&["A", "B"]), 1).unwrap();
        assert_eq!(details.entry.title, "B");
    }

    #[test]
    fn test_select_entry_falls_back_to_first() {
        let details = select_entry(&results(&["A", "B"]), 2).unwrap();
        assert_eq!(details.entry.title, "A");
    }

    #[test]
    fn test_select_entry_on_empty_results() {
        let err = select_entry(&results(&[]), 0).unwrap_err();
        assert!(matches!(err, NavigationError::InvalidSelection(_)));
    }

    #[test]
    fn test_press_on_empty_results_stays_on_search() {
        let empty = results(&[]);
        let screen = press(Payload::SelectEntry {
            results: empty.clone(),
            index: 0,
        });
        assert_eq!(screen, Screen::SearchResults(empty));
    }
}
