//! # Configuration Module
//!
//! Settings for the search provider, the rendered screens and the bot
//! itself, read from environment variables (a `.env` file is loaded first
//! by `main`).

use anyhow::{bail, Context, Result};
use std::env;

// Constants for bot configuration
pub const DEFAULT_COUNTRY: &str = "US";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_RESULT_COUNT: usize = 4;
pub const DEFAULT_PAYLOAD_CACHE_SIZE: usize = 512;
pub const DEFAULT_SEARCH_API_URL: &str = "http://localhost:8080/search";
pub const PROVIDER_LOGO_URL: &str =
    "https://www.justwatch.com/appassets/img/JustWatch_logo_with_claim.png";
pub const PROVIDER_SEARCH_URL: &str = "https://www.justwatch.com/{country}/search";
pub const IMDB_DETAILS_URL: &str = "https://www.imdb.com/title/{imdb_id}/";

/// Parameters passed to the search provider with every query
#[derive(Debug, Clone)]
pub struct SearchSettings {
    /// Endpoint returning a JSON list of media entries
    pub api_url: String,
    /// Two-letter country code, e.g. "US"
    pub country: String,
    /// Language of titles returned by the provider
    pub language: String,
    /// Maximum number of entries per search
    pub count: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_SEARCH_API_URL.to_string(),
            country: DEFAULT_COUNTRY.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            count: DEFAULT_RESULT_COUNT,
        }
    }
}

/// Settings used when turning screens into views
#[derive(Debug, Clone)]
pub struct RenderSettings {
    /// Country used for the provider website link
    pub country: String,
    /// Image shown on the search results screen
    pub logo_url: Option<String>,
    /// Offer types shown first on the details screen, in this order
    pub offer_type_order: Vec<String>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            country: DEFAULT_COUNTRY.to_string(),
            logo_url: Some(PROVIDER_LOGO_URL.to_string()),
            offer_type_order: Vec::new(),
        }
    }
}

/// Top-level bot configuration
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub token: String,
    /// Telegram usernames allowed to use the bot; empty means everyone
    pub allowed_usernames: Vec<String>,
    /// Payloads kept per chat for buttons whose data exceeds the callback limit
    pub payload_cache_size: usize,
    pub search: SearchSettings,
    pub render: RenderSettings,
}

impl BotConfig {
    /// Read the configuration from the process environment
    pub fn from_env() -> Result<Self> {
        let token = env::var("TELOXIDE_TOKEN")
            .or_else(|_| env::var("TOKEN"))
            .context("TELOXIDE_TOKEN or TOKEN must be set")?;
        Self::from_lookup(token, |key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup
    pub fn from_lookup(token: String, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let country = lookup("COUNTRY").unwrap_or_else(|| DEFAULT_COUNTRY.to_string());

        let count = match lookup("COUNT") {
            Some(value) => value
                .trim()
                .parse()
                .with_context(|| format!("COUNT must be a number, got '{value}'"))?,
            None => DEFAULT_RESULT_COUNT,
        };
        if count < 1 {
            bail!("COUNT must be at least 1, got {count}");
        }

        let payload_cache_size = match lookup("PAYLOAD_CACHE_SIZE") {
            Some(value) => value
                .trim()
                .parse()
                .with_context(|| format!("PAYLOAD_CACHE_SIZE must be a number, got '{value}'"))?,
            None => DEFAULT_PAYLOAD_CACHE_SIZE,
        };

        Ok(Self {
            token,
            allowed_usernames: lookup("ALLOWED_USERNAMES")
                .map(|value| parse_usernames(&value))
                .unwrap_or_default(),
            payload_cache_size,
            search: SearchSettings {
                api_url: lookup("SEARCH_API_URL")
                    .unwrap_or_else(|| DEFAULT_SEARCH_API_URL.to_string()),
                country: country.clone(),
                language: lookup("LANGUAGE").unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
                count,
            },
            render: RenderSettings {
                country,
                offer_type_order: lookup("OFFER_TYPE_ORDER")
                    .map(|value| parse_offer_type_order(&value))
                    .unwrap_or_default(),
                ..RenderSettings::default()
            },
        })
    }

    /// Whether a user may talk to the bot
    pub fn is_allowed(&self, username: Option<&str>) -> bool {
        if self.allowed_usernames.is_empty() {
            return true;
        }
        match username {
            Some(name) => {
                let name = name.trim_start_matches('@');
                self.allowed_usernames
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(name))
            }
            None => false,
        }
    }
}

fn parse_usernames(value: &str) -> Vec<String> {
    value
        .split_whitespace()
        .map(|name| name.trim_start_matches('@').to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

fn parse_offer_type_order(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|kind| kind.trim().to_uppercase())
        .filter(|kind| !kind.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(vars: &[(&str, &str)]) -> Result<BotConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BotConfig::from_lookup("token".to_string(), |key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_with(&[]).unwrap();
        assert_eq!(config.search.country, "US");
        assert_eq!(config.search.language, "en");
        assert_eq!(config.search.count, 4);
        assert_eq!(config.payload_cache_size, DEFAULT_PAYLOAD_CACHE_SIZE);
        assert!(config.allowed_usernames.is_empty());
        assert!(config.render.offer_type_order.is_empty());
    }

    #[test]
    fn test_overrides() {
        let config = config_with(&[
            ("COUNTRY", "DE"),
            ("LANGUAGE", "de"),
            ("COUNT", " 8 "),
            ("OFFER_TYPE_ORDER", "flatrate, rent,,BUY"),
            ("ALLOWED_USERNAMES", "@alice  bob"),
        ])
        .unwrap();

        assert_eq!(config.search.country, "DE");
        assert_eq!(config.render.country, "DE");
        assert_eq!(config.search.count, 8);
        assert_eq!(config.render.offer_type_order, vec!["FLATRATE", "RENT", "BUY"]);
        assert_eq!(config.allowed_usernames, vec!["alice", "bob"]);
    }

    #[test]
    fn test_invalid_count_is_rejected() {
        assert!(config_with(&[("COUNT", "many")]).is_err());
    }

    #[test]
    fn test_zero_count_is_rejected() {
        let err = config_with(&[("COUNT", "0")]).unwrap_err();
        assert!(err.to_string().contains("at least 1"));
        assert_eq!(config_with(&[("COUNT", "1")]).unwrap().search.count, 1);
    }

    #[test]
    fn test_allowlist() {
        let open = config_with(&[]).unwrap();
        assert!(open.is_allowed(None));
        assert!(open.is_allowed(Some("anyone")));

        let restricted = config_with(&[("ALLOWED_USERNAMES", "alice")]).unwrap();
        assert!(restricted.is_allowed(Some("Alice")));
        assert!(restricted.is_allowed(Some("@alice")));
        assert!(!restricted.is_allowed(Some("mallory")));
        assert!(!restricted.is_allowed(None));
    }
}
