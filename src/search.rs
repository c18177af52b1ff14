//! Search provider boundary.
//!
//! The navigation layer only sees [`SearchProvider`]. [`HttpSearchProvider`]
//! is the adapter used by the bot binary: it calls a configured endpoint and
//! decodes a JSON list of titles with flat offer lists.

use serde::Deserialize;
use std::future::Future;
use tracing::{debug, info};

use crate::config::SearchSettings;
use crate::errors::SearchError;
use crate::media::{MediaEntry, Offer};

/// Anything that turns a query into an ordered list of titles
pub trait SearchProvider: Send + Sync {
    /// Search for `query`; entries come back most relevant first
    fn search(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<MediaEntry>, SearchError>> + Send;
}

/// Title as sent by the search endpoint, offers not yet grouped
#[derive(Debug, Deserialize)]
struct RawEntry {
    title: String,
    #[serde(default)]
    release_year: Option<i32>,
    #[serde(default)]
    runtime_minutes: Option<u32>,
    #[serde(default)]
    poster: Option<String>,
    #[serde(default)]
    imdb_id: Option<String>,
    #[serde(default)]
    offers: Vec<Offer>,
}

impl From<RawEntry> for MediaEntry {
    fn from(raw: RawEntry) -> Self {
        let mut entry = MediaEntry::new(raw.title).with_offers(raw.offers);
        entry.release_year = raw.release_year;
        entry.runtime_minutes = raw.runtime_minutes;
        entry.poster = raw.poster.filter(|url| !url.is_empty());
        entry.imdb_id = raw.imdb_id.filter(|id| !id.is_empty());
        entry
    }
}

/// Decode a search endpoint response body
pub fn parse_search_response(body: &str, limit: usize) -> Result<Vec<MediaEntry>, SearchError> {
    let raw: Vec<RawEntry> =
        serde_json::from_str(body).map_err(|e| SearchError::Decode(e.to_string()))?;
    Ok(raw.into_iter().take(limit).map(MediaEntry::from).collect())
}

/// HTTP search provider
pub struct HttpSearchProvider {
    client: reqwest::Client,
    settings: SearchSettings,
}

impl HttpSearchProvider {
    pub fn new(settings: SearchSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            settings,
        }
    }
}

impl SearchProvider for HttpSearchProvider {
    async fn search(&self, query: &str) -> Result<Vec<MediaEntry>, SearchError> {
        debug!(query = %query, url = %self.settings.api_url, "Sending search request");

        let count = self.settings.count.to_string();
        let response = self
            .client
            .get(&self.settings.api_url)
            .query(&[
                ("q", query),
                ("country", self.settings.country.as_str()),
                ("language", self.settings.language.as_str()),
                ("count", count.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        let entries = parse_search_response(&body, self.settings.count)?;

        info!(query = %query, entries = entries.len(), "Received search response");
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_response_groups_offers() {
        let body = r#"[
            {
                "title": "Inception",
                "release_year": 2010,
                "runtime_minutes": 148,
                "poster": "https://images.example.com/inception.jpg",
                "imdb_id": "tt1375666",
                "offers": [
                    {"provider_name": "Netflix", "monetization_type": "FLATRATE", "presentation_type": "HD", "url": "https://netflix.com/inception"},
                    {"provider_name": "Apple TV", "monetization_type": "RENT", "price_string": "$3.99", "url": "https://tv.apple.com/inception"},
                    {"provider_name": "Max", "monetization_type": "FLATRATE", "url": "https://max.com/inception"}
                ]
            },
            {"title": "Inception: The Cobol Job", "poster": "", "imdb_id": ""}
        ]"#;

        let entries = parse_search_response(body, 10).unwrap();
        assert_eq!(entries.len(), 2);

        let inception = &entries[0];
        assert_eq!(inception.release_year, Some(2010));
        assert_eq!(inception.offers_by_type.len(), 2);
        assert_eq!(inception.offers_by_type[0].offer_type, "FLATRATE");
        assert_eq!(inception.offers_by_type[0].offers.len(), 2);
        assert_eq!(
            inception.offers_by_type[1].offers[0].price_string.as_deref(),
            Some("$3.99")
        );

        let cobol = &entries[1];
        assert_eq!(cobol.release_year, None);
        assert_eq!(cobol.poster, None);
        assert_eq!(cobol.imdb_id, None);
        assert!(cobol.offers_by_type.is_empty());
    }

    #[test]
    fn test_parse_search_response_respects_limit() {
        let body = r#"[{"title": "A"}, {"title": "B"}, {"title": "C"}]"#;
        let entries = parse_search_response(body, 2).unwrap();
        let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);
    }

    #[test]
    fn test_parse_search_response_rejects_malformed_body() {
        let err = parse_search_response("{\"error\": true}", 4).unwrap_err();
        assert!(matches!(err, SearchError::Decode(_)));
    }
}
