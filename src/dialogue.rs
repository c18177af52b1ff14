//! Browse session kept per chat in the dialogue storage.
//!
//! Telegram limits callback data to 64 bytes, which is far too small for a
//! payload carrying its whole parent chain. Payloads that fit are sent inline
//! as JSON; the others are kept in the chat's [`BrowseSession`] and the
//! button carries a random token instead.

use anyhow::Result;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};

use crate::config::DEFAULT_PAYLOAD_CACHE_SIZE;
use crate::errors::NavigationError;
use crate::navigation::Payload;

/// Telegram's callback data limit in bytes
pub const MAX_CALLBACK_DATA_LEN: usize = 64;
/// Length of the random token identifying a cached payload
pub const TOKEN_LEN: usize = 12;

const INLINE_PREFIX: &str = "i:";
const KEYED_PREFIX: &str = "k:";

/// Per-chat cache of button payloads, oldest evicted first
#[derive(Clone, Debug)]
pub struct BrowseSession {
    payloads: HashMap<String, Arc<Payload>>,
    order: VecDeque<String>,
    capacity: usize,
}

impl Default for BrowseSession {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_PAYLOAD_CACHE_SIZE)
    }
}

/// Type alias for the browse dialogue
pub type BrowseDialogue = Dialogue<BrowseSession, InMemStorage<BrowseSession>>;

impl BrowseSession {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            payloads: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }

    /// Store a payload and return the token that identifies it
    pub fn remember(&mut self, payload: Payload) -> String {
        let token = loop {
            let candidate = random_token();
            if !self.payloads.contains_key(&candidate) {
                break candidate;
            }
        };

        self.payloads.insert(token.clone(), Arc::new(payload));
        self.order.push_back(token.clone());

        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.payloads.remove(&oldest);
            }
        }

        token
    }

    pub fn recall(&self, token: &str) -> Option<Payload> {
        self.payloads.get(token).map(|payload| payload.as_ref().clone())
    }

    /// Turn a payload into callback data
    pub fn encode(&mut self, payload: Payload) -> String {
        if let Ok(json) = serde_json::to_string(&payload) {
            let data = format!("{INLINE_PREFIX}{json}");
            if data.len() <= MAX_CALLBACK_DATA_LEN {
                return data;
            }
        }
        format!("{KEYED_PREFIX}{}", self.remember(payload))
    }

    /// Resolve callback data produced by [`BrowseSession::encode`]
    pub fn decode(&self, data: &str) -> Result<Payload, NavigationError> {
        if let Some(json) = data.strip_prefix(INLINE_PREFIX) {
            serde_json::from_str(json).map_err(|e| {
                NavigationError::StalePayload(format!("malformed inline payload: {e}"))
            })
        } else if let Some(token) = data.strip_prefix(KEYED_PREFIX) {
            self.recall(token)
                .ok_or_else(|| NavigationError::StalePayload(format!("unknown token '{token}'")))
        } else {
            Err(NavigationError::StalePayload(format!(
                "unrecognised callback data '{data}'"
            )))
        }
    }
}

/// Session of the dialogue's chat, or an empty one for a new chat
pub async fn load_session(dialogue: &BrowseDialogue, capacity: usize) -> Result<BrowseSession> {
    Ok(dialogue
        .get()
        .await?
        .unwrap_or_else(|| BrowseSession::with_capacity(capacity)))
}

fn random_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}
