//! # Media Model Module
//!
//! Read-only shapes returned by the search provider: titles, their offers,
//! and the per-title grouping of offers by monetization type.

use serde::{Deserialize, Serialize};

/// One purchase or streaming option for a title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    /// Name of the service selling or streaming the title (e.g. "Netflix")
    pub provider_name: String,
    /// Grouping key, e.g. "FLATRATE", "RENT", "BUY"
    pub monetization_type: String,
    /// Quality label such as "HD", "_4K" or "SD"
    #[serde(default)]
    pub presentation_type: Option<String>,
    /// Human readable price, absent for subscription offers
    #[serde(default)]
    pub price_string: Option<String>,
    /// Outbound link to the offer
    pub url: String,
}

/// All offers of one monetization type, in provider order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferGroup {
    pub offer_type: String,
    pub offers: Vec<Offer>,
}

/// A title as returned by the search provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaEntry {
    pub title: String,
    pub release_year: Option<i32>,
    pub runtime_minutes: Option<u32>,
    pub poster: Option<String>,
    pub imdb_id: Option<String>,
    /// Offers grouped by type; keys are unique and kept in first-seen order
    pub offers_by_type: Vec<OfferGroup>,
}

impl MediaEntry {
    /// Create an entry without offers or optional metadata
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            release_year: None,
            runtime_minutes: None,
            poster: None,
            imdb_id: None,
            offers_by_type: Vec::new(),
        }
    }

    pub fn with_release_year(mut self, year: i32) -> Self {
        self.release_year = Some(year);
        self
    }

    pub fn with_runtime(mut self, minutes: u32) -> Self {
        self.runtime_minutes = Some(minutes);
        self
    }

    pub fn with_poster(mut self, poster: impl Into<String>) -> Self {
        self.poster = Some(poster.into());
        self
    }

    pub fn with_imdb_id(mut self, imdb_id: impl Into<String>) -> Self {
        self.imdb_id = Some(imdb_id.into());
        self
    }

    /// Replace the offers, grouping them by monetization type
    pub fn with_offers(mut self, offers: Vec<Offer>) -> Self {
        self.offers_by_type = group_offers(offers);
        self
    }

    /// Look up the offers of one type
    pub fn offers_of_type(&self, offer_type: &str) -> Option<&OfferGroup> {
        self.offers_by_type
            .iter()
            .find(|group| group.offer_type == offer_type)
    }

    /// Offer groups with the types listed in `priority` moved to the front,
    /// in listed order. Unlisted types keep their first-seen order.
    pub fn ordered_groups(&self, priority: &[String]) -> Vec<&OfferGroup> {
        let mut groups: Vec<&OfferGroup> = self.offers_by_type.iter().collect();
        if !priority.is_empty() {
            // sort_by_key is stable, so ties keep first-seen order
            groups.sort_by_key(|group| {
                priority
                    .iter()
                    .position(|p| p == &group.offer_type)
                    .unwrap_or(priority.len())
            });
        }
        groups
    }

    /// Runtime as "h:mm", e.g. 148 minutes -> "2:28"
    pub fn runtime_label(&self) -> Option<String> {
        self.runtime_minutes
            .map(|minutes| format!("{}:{:02}", minutes / 60, minutes % 60))
    }
}

/// Group a flat offer list by exact monetization type.
///
/// Groups appear in the order their type is first seen; offers keep their
/// relative order inside a group.
pub fn group_offers(offers: Vec<Offer>) -> Vec<OfferGroup> {
    let mut groups: Vec<OfferGroup> = Vec::new();
    for offer in offers {
        match groups
            .iter_mut()
            .find(|group| group.offer_type == offer.monetization_type)
        {
            Some(group) => group.offers.push(offer),
            None => groups.push(OfferGroup {
                offer_type: offer.monetization_type.clone(),
                offers: vec![offer],
            }),
        }
    }
    groups
}
