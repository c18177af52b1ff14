use anyhow::Result;
use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};
use teloxide::types::{ChatId, InlineKeyboardButtonKind};

use justwatch_bot::bot::callback_handler::resolve_event;
use justwatch_bot::bot::ui_builder::build_keyboard;
use justwatch_bot::config::RenderSettings;
use justwatch_bot::dialogue::{load_session, BrowseDialogue, BrowseSession, MAX_CALLBACK_DATA_LEN};
use justwatch_bot::media::{MediaEntry, Offer};
use justwatch_bot::navigation::{press, Event, Payload};
use justwatch_bot::render::{render_screen, ButtonAction};
use justwatch_bot::screens::{Screen, SearchResult};

fn search_result() -> SearchResult {
    let offers = vec![
        Offer {
            provider_name: "Netflix".to_string(),
            monetization_type: "FLATRATE".to_string(),
            presentation_type: Some("_4K".to_string()),
            price_string: None,
            url: "https://www.netflix.com/title/70131314".to_string(),
        },
        Offer {
            provider_name: "Apple TV".to_string(),
            monetization_type: "RENT".to_string(),
            presentation_type: Some("HD".to_string()),
            price_string: Some("$3.99".to_string()),
            url: "https://tv.apple.com/movie/inception".to_string(),
        },
    ];
    SearchResult {
        query: "Inception".to_string(),
        entries: vec![
            MediaEntry::new("Inception")
                .with_release_year(2010)
                .with_imdb_id("tt1375666")
                .with_offers(offers),
            MediaEntry::new("Inception: The Cobol Job").with_release_year(2010),
        ],
    }
}

/// Every callback payload of a rendered screen survives the trip through
/// Telegram callback data.
#[test]
fn test_payloads_round_trip_through_callback_data() {
    let settings = RenderSettings::default();
    let results = search_result();
    let Screen::Details(details) = press(Payload::SelectEntry {
        results: results.clone(),
        index: 0,
    }) else {
        panic!("selecting an entry should show its details");
    };
    let offers = press(Payload::SelectOfferType {
        details: details.clone(),
        offer_type: "RENT".to_string(),
    });
    assert!(matches!(offers, Screen::Offers(_)));

    let screens = vec![
        Screen::SearchResults(results.clone()),
        Screen::Details(details),
        offers,
    ];

    let mut session = BrowseSession::default();
    for screen in screens {
        let view = render_screen(&screen, &settings, None);
        let markup = build_keyboard(&view, &mut session);

        let sent: Vec<&Payload> = view
            .buttons()
            .filter_map(|button| match &button.action {
                ButtonAction::Callback(payload) => Some(payload),
                ButtonAction::Url(_) => None,
            })
            .collect();
        let received: Vec<Payload> = markup
            .inline_keyboard
            .iter()
            .flatten()
            .filter_map(|button| match &button.kind {
                InlineKeyboardButtonKind::CallbackData(data) => {
                    assert!(data.len() <= MAX_CALLBACK_DATA_LEN);
                    Some(session.decode(data).expect("payload should decode"))
                }
                _ => None,
            })
            .collect();

        assert!(!sent.is_empty());
        assert_eq!(sent.len(), received.len());
        for (sent, received) in sent.into_iter().zip(received) {
            assert_eq!(sent, &received);
        }
    }
}

#[test]
fn test_evicted_payload_resolves_to_stale_event() {
    let mut session = BrowseSession::with_capacity(1);
    let results = search_result();

    let first = session.encode(Payload::SelectEntry {
        results: results.clone(),
        index: 0,
    });
    let second = session.encode(Payload::SelectEntry {
        results: results.clone(),
        index: 1,
    });

    assert_eq!(resolve_event(&session, Some(&first)), Event::Stale);
    assert_eq!(
        resolve_event(&session, Some(&second)),
        Event::Press(Payload::SelectEntry { results, index: 1 })
    );
}

#[tokio::test]
async fn test_sessions_are_isolated_per_chat() -> Result<()> {
    let storage = InMemStorage::<BrowseSession>::new();
    let alice: BrowseDialogue = Dialogue::new(storage.clone(), ChatId(1));
    let bob: BrowseDialogue = Dialogue::new(storage.clone(), ChatId(2));

    let mut session = load_session(&alice, 8).await?;
    assert!(session.is_empty());
    let data = session.encode(Payload::SelectEntry {
        results: search_result(),
        index: 0,
    });
    alice.update(session).await?;

    let alice_session = load_session(&alice, 8).await?;
    assert_eq!(alice_session.len(), 1);
    assert!(alice_session.decode(&data).is_ok());

    let bob_session = load_session(&bob, 8).await?;
    assert!(bob_session.is_empty());
    assert!(bob_session.decode(&data).is_err());

    Ok(())
}
