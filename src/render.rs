//! # Render Module
//!
//! Turns screens into transport-neutral views: an HTML text, an optional
//! image and a grid of buttons. Rendering is deterministic and never fails;
//! missing optional data only removes the matching element.

use reqwest::Url;
use teloxide::utils::html::escape;
use tracing::warn;

use crate::config::{RenderSettings, IMDB_DETAILS_URL, PROVIDER_SEARCH_URL};
use crate::localization::{t_args_lang, t_lang};
use crate::media::{MediaEntry, Offer};
use crate::navigation::{Payload, Step};
use crate::screens::{DetailsState, OffersState, Screen, SearchResult};

/// Telegram rejects photo captions longer than this
pub const MAX_CAPTION_CHARS: usize = 1024;
/// Longest part of the query echoed back, before HTML escaping
const MAX_DISPLAYED_QUERY_CHARS: usize = 128;

/// What pressing a button does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonAction {
    /// Send the payload back to the state machine
    Callback(Payload),
    /// Open an external link
    Url(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub action: ButtonAction,
}

impl Button {
    pub fn callback(label: impl Into<String>, payload: Payload) -> Self {
        Self {
            label: label.into(),
            action: ButtonAction::Callback(payload),
        }
    }

    /// Link button, or `None` when `url` is not a valid absolute URL
    pub fn link(label: impl Into<String>, url: &str) -> Option<Self> {
        let url = Url::parse(url).ok()?;
        Some(Self {
            label: label.into(),
            action: ButtonAction::Url(url.to_string()),
        })
    }
}

/// A rendered screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    /// Telegram HTML text
    pub text: String,
    pub image: Option<String>,
    /// Rows of buttons, top to bottom
    pub keyboard: Vec<Vec<Button>>,
}

impl View {
    fn text_only(text: String) -> Self {
        Self {
            text,
            image: None,
            keyboard: Vec::new(),
        }
    }

    /// All buttons in display order
    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.keyboard.iter().flatten()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.buttons().map(|button| button.label.as_str()).collect()
    }
}

/// Render the outcome of a navigation step
pub fn render_step(step: &Step, settings: &RenderSettings, language_code: Option<&str>) -> View {
    match step {
        Step::Show(screen) => render_screen(screen, settings, language_code),
        Step::Rejected => View::text_only(t_lang("search-usage", language_code)),
        Step::Failed { query } => View::text_only(t_args_lang(
            "search-failed",
            &[("query", display_query(query).as_str())],
            language_code,
        )),
        Step::Expired => View::text_only(t_lang("payload-expired", language_code)),
    }
}

pub fn render_screen(screen: &Screen, settings: &RenderSettings, language_code: Option<&str>) -> View {
    match screen {
        Screen::SearchResults(results) => render_search_results(results, settings, language_code),
        Screen::Details(details) => render_details(details, settings, language_code),
        Screen::Offers(offers) => render_offers(offers, language_code),
    }
}

pub fn render_search_results(
    results: &SearchResult,
    settings: &RenderSettings,
    language_code: Option<&str>,
) -> View {
    let query = display_query(&results.query);
    let text = if results.entries.is_empty() {
        t_args_lang("search-no-results", &[("query", query.as_str())], language_code)
    } else {
        t_args_lang("search-results", &[("query", query.as_str())], language_code)
    };

    let mut keyboard: Vec<Vec<Button>> = results
        .entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            vec![Button::callback(
                entry_label(entry),
                Payload::SelectEntry {
                    results: results.clone(),
                    index,
                },
            )]
        })
        .collect();

    if let Some(button) = provider_website_button(&results.query, settings, language_code) {
        keyboard.push(vec![button]);
    }

    View {
        text,
        image: settings.logo_url.clone(),
        keyboard,
    }
}

pub fn render_details(
    details: &DetailsState,
    settings: &RenderSettings,
    language_code: Option<&str>,
) -> View {
    let entry = &details.entry;

    let mut keyboard: Vec<Vec<Button>> = entry
        .ordered_groups(&settings.offer_type_order)
        .into_iter()
        .map(|group| {
            vec![Button::callback(
                offer_type_label(&group.offer_type),
                Payload::SelectOfferType {
                    details: details.clone(),
                    offer_type: group.offer_type.clone(),
                },
            )]
        })
        .collect();

    if let Some(imdb_id) = &entry.imdb_id {
        let url = IMDB_DETAILS_URL.replace("{imdb_id}", imdb_id);
        if let Some(button) = Button::link(t_lang("imdb", language_code), &url) {
            keyboard.push(vec![button]);
        }
    }

    keyboard.push(vec![Button::callback(
        t_lang("back", language_code),
        Payload::BackToSearch(Screen::Details(details.clone())),
    )]);

    View {
        text: header(entry),
        image: entry.poster.clone(),
        keyboard,
    }
}

pub fn render_offers(offers: &OffersState, language_code: Option<&str>) -> View {
    let entry = &offers.parent.entry;

    let mut keyboard: Vec<Vec<Button>> = offers
        .offers
        .iter()
        .filter_map(|offer| {
            let button = Button::link(offer_label(offer), &offer.url);
            if button.is_none() {
                warn!(provider = %offer.provider_name, url = %offer.url, "Dropping offer with invalid URL");
            }
            button
        })
        .map(|button| vec![button])
        .collect();

    keyboard.push(vec![Button::callback(
        t_lang("back", language_code),
        Payload::BackToDetails(offers.clone()),
    )]);
    keyboard.push(vec![Button::callback(
        t_lang("back-to-search", language_code),
        Payload::BackToSearch(Screen::Offers(offers.clone())),
    )]);

    View {
        text: header(entry),
        image: entry.poster.clone(),
        keyboard,
    }
}

/// "Inception (2010)", or just the title when the year is unknown
pub fn entry_label(entry: &MediaEntry) -> String {
    match entry.release_year {
        Some(year) => format!("{} ({})", entry.title, year),
        None => entry.title.clone(),
    }
}

/// Display name of an offer type: "FLATRATE" -> "Stream", "BUY" -> "Buy"
pub fn offer_type_label(offer_type: &str) -> String {
    let name = match offer_type {
        "FLATRATE" => "Stream",
        other => other,
    };
    capitalize(name)
}

/// "Apple TV (HD, $3.99)", "Netflix (4K)", "Amazon ($2.99)" or "Pluto TV"
pub fn offer_label(offer: &Offer) -> String {
    let quality = offer
        .presentation_type
        .as_deref()
        .map(|quality| quality.replace('_', ""))
        .filter(|quality| !quality.is_empty());
    let price = offer
        .price_string
        .as_deref()
        .filter(|price| !price.is_empty())
        .map(str::to_string);

    let details: Vec<String> = quality.into_iter().chain(price).collect();
    if details.is_empty() {
        offer.provider_name.clone()
    } else {
        format!("{} ({})", offer.provider_name, details.join(", "))
    }
}

/// Escaped query, shortened so the search screen fits in a photo caption
fn display_query(query: &str) -> String {
    if query.chars().count() <= MAX_DISPLAYED_QUERY_CHARS {
        return escape(query);
    }
    let shortened: String = query.chars().take(MAX_DISPLAYED_QUERY_CHARS).collect();
    format!("{}…", escape(&shortened))
}

fn header(entry: &MediaEntry) -> String {
    let mut text = format!("<b>{}</b>", escape(&entry.title));
    if let Some(year) = entry.release_year {
        text.push_str(&format!(" ({year})"));
    }
    if let Some(runtime) = entry.runtime_label() {
        text.push_str(&format!(" ({runtime})"));
    }
    text
}

fn provider_website_button(
    query: &str,
    settings: &RenderSettings,
    language_code: Option<&str>,
) -> Option<Button> {
    let base = PROVIDER_SEARCH_URL.replace("{country}", &settings.country.to_lowercase());
    let mut url = Url::parse(&base).ok()?;
    url.query_pairs_mut().append_pair("q", query);
    Button::link(t_lang("provider-website", language_code), url.as_str())
}

fn capitalize(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
