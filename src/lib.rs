//! # JustWatch Telegram Bot
//!
//! A Telegram bot that searches titles with a streaming-availability provider
//! and lets users browse search results, title details and offers with
//! inline buttons. Going back never repeats the search: every button carries
//! the full chain of screens it was rendered from.

pub mod bot;
pub mod config;
pub mod dialogue;
pub mod errors;
pub mod localization;
pub mod media;
pub mod navigation;
pub mod render;
pub mod screens;
pub mod search;
