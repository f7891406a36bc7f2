//! services/site/src/web/ws_handler.rs
//!
//! This is the main entry point and control loop for a page session's WebSocket.
//! It owns the session state, starts the countdown and dispatches client messages.

use crate::web::{
    countdown_task::CountdownTicker,
    generation_task::generation_process,
    protocol::{ClientMessage, EntryView, ServerMessage},
    rsvp_task::rsvp_process,
    state::{AppState, Outbox, SessionState},
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use wedding_site_core::domain::{Section, Tone};

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>) {
    let (mut ws_sender, mut receiver) = socket.split();
    let (outbox, mut outbox_rx) = mpsc::unbounded_channel::<ServerMessage>();

    // --- 1. Writer: drains the session's outbox into the socket ---
    let writer = tokio::spawn(async move {
        while let Some(message) = outbox_rx.recv().await {
            let json = match serde_json::to_string(&message) {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to serialize server message: {}", e);
                    continue;
                }
            };
            if ws_sender.send(Message::Text(json.into())).await.is_err() {
                info!("Client went away, stopping writer.");
                break;
            }
        }
    });

    // --- 2. Session start: snapshot, then the countdown ---
    let session = SessionState::new(app_state.page_settings());
    let session_id = session.session_id;
    info!("Page session {} started.", session_id);
    send(&outbox, session.snapshot());
    let session_state_lock = Arc::new(Mutex::new(session));
    let ticker = CountdownTicker::start(session_state_lock.clone(), outbox.clone());

    // --- 3. Main loop ---
    while let Some(frame) = receiver.next().await {
        match frame {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(text.as_str()) {
                Ok(message) => {
                    handle_client_message(message, &app_state, &session_state_lock, &outbox).await;
                }
                Err(e) => {
                    warn!("Unparseable client message: {}", e);
                    send(
                        &outbox,
                        ServerMessage::Error {
                            message: "Unrecognized message.".to_string(),
                        },
                    );
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => debug!("Ignoring non-text frame."),
            Err(e) => {
                warn!("WebSocket error: {}", e);
                break;
            }
        }
    }

    // --- 4. Teardown: no recurring work survives the page ---
    ticker.stop().await;
    writer.abort();
    info!("Page session {} ended.", session_id);
}

/// Applies one client message to the session. Network-bound work is spawned so the
/// loop keeps serving scroll and input events while it runs.
pub async fn handle_client_message(
    message: ClientMessage,
    app_state: &Arc<AppState>,
    session_state_lock: &Arc<Mutex<SessionState>>,
    outbox: &Outbox,
) {
    let mut session = session_state_lock.lock().await;
    let page = &mut session.page;

    match message {
        ClientMessage::Layout { sections } => {
            let offsets = sections.into_iter().filter_map(|offset| {
                match offset.id.parse::<Section>() {
                    Ok(section) => Some((section, offset.offset_top)),
                    Err(e) => {
                        warn!("Skipping layout entry: {}", e);
                        None
                    }
                }
            });
            if let Some(section) = page.sections.set_layout(offsets) {
                send(outbox, ServerMessage::ActiveSection { section: section.into() });
            }
        }
        ClientMessage::Scroll { scroll_y } => {
            if let Some(section) = page.sections.on_scroll(scroll_y) {
                send(outbox, ServerMessage::ActiveSection { section: section.into() });
            }
        }
        ClientMessage::OpenRsvp => {
            page.rsvp.open_dialog();
            send(outbox, ServerMessage::RsvpStatus { status: page.rsvp.status().into() });
        }
        ClientMessage::CloseRsvp => {
            page.rsvp.close_dialog();
            send(outbox, ServerMessage::RsvpStatus { status: page.rsvp.status().into() });
        }
        ClientMessage::SubmitRsvp { form } => match page.rsvp.begin_submission(form.into()) {
            Some(attempt) => {
                send(outbox, ServerMessage::RsvpStatus { status: page.rsvp.status().into() });
                tokio::spawn(rsvp_process(
                    app_state.clone(),
                    session_state_lock.clone(),
                    outbox.clone(),
                    attempt,
                ));
            }
            None => warn!("RSVP already submitting, ignoring duplicate submission."),
        },
        ClientMessage::SetRelationship { relationship } => {
            page.guestbook.set_relationship(relationship);
        }
        ClientMessage::SetTone { tone } => match tone.parse::<Tone>() {
            Ok(tone) => page.guestbook.set_tone(tone),
            Err(e) => {
                warn!("Rejecting tone: {}", e);
                send(
                    outbox,
                    ServerMessage::Error {
                        message: format!("Unknown tone '{}'.", tone),
                    },
                );
            }
        },
        ClientMessage::GenerateMessage => match page.guestbook.begin_generation(&page.couple) {
            Some(prompt) => {
                send(outbox, ServerMessage::GenerationStarted);
                tokio::spawn(generation_process(
                    app_state.clone(),
                    session_state_lock.clone(),
                    outbox.clone(),
                    prompt,
                ));
            }
            None => debug!("Generation unavailable for the current draft."),
        },
        ClientMessage::EditMessage { text } => page.guestbook.edit_message(text),
        ClientMessage::SetAuthorName { name } => page.guestbook.set_author_name(name),
        ClientMessage::SignGuestbook => {
            if let Some(entry) = page.guestbook.sign(Uuid::new_v4().to_string()) {
                info!("Guestbook signed by {}.", entry.author_name());
                send(
                    outbox,
                    ServerMessage::GuestbookSigned {
                        entry: EntryView::from(&entry),
                    },
                );
                let entries = page
                    .guestbook
                    .ledger()
                    .entries()
                    .iter()
                    .map(EntryView::from)
                    .collect();
                send(outbox, ServerMessage::Ledger { entries });
            }
        }
    }
}

fn send(outbox: &Outbox, message: ServerMessage) {
    if outbox.send(message).is_err() {
        warn!("Dropping message for a closed page session.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        web::protocol::{RsvpFormInput, RsvpStatus, SectionId, SectionOffset},
    };
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::mpsc::UnboundedReceiver;
    use wedding_site_core::{
        domain::{RsvpPayload, SubmissionState},
        ports::{MessageGenerationService, PortError, PortResult, RsvpIntakeService},
    };

    /// Answers every submission with a fixed outcome after a short delay.
    struct DelayedIntake(PortResult<()>);

    #[async_trait]
    impl RsvpIntakeService for DelayedIntake {
        async fn submit(&self, _payload: &RsvpPayload) -> PortResult<()> {
            tokio::time::sleep(Duration::from_millis(50)).await;
            self.0.clone()
        }
    }

    struct EchoGenerator;

    #[async_trait]
    impl MessageGenerationService for EchoGenerator {
        async fn generate_message(&self, prompt: &str) -> PortResult<String> {
            Ok(format!("Suggested for: {}", prompt.lines().nth(1).unwrap_or_default()))
        }
    }

    fn app_state(
        intake: PortResult<()>,
        generator: Option<Arc<dyn MessageGenerationService>>,
    ) -> Arc<AppState> {
        let config = Config::from_lookup(|_| None).expect("default config");
        Arc::new(AppState {
            config: Arc::new(config),
            rsvp_intake: Arc::new(DelayedIntake(intake)),
            message_generator: generator,
        })
    }

    fn session(app_state: &AppState) -> Arc<Mutex<SessionState>> {
        Arc::new(Mutex::new(SessionState::new(app_state.page_settings())))
    }

    fn rsvp_form() -> RsvpFormInput {
        RsvpFormInput {
            name: "Alex".to_string(),
            email: "alex@example.com".to_string(),
            attending: "yes".to_string(),
            guests: "2".to_string(),
            plus_one_name: "Sam".to_string(),
            ..Default::default()
        }
    }

    async fn next(rx: &mut UnboundedReceiver<ServerMessage>) -> ServerMessage {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("message in time")
            .expect("outbox open")
    }

    #[tokio::test]
    async fn scroll_reports_section_changes_only() {
        let state = app_state(Ok(()), None);
        let session = session(&state);
        let (tx, mut rx) = mpsc::unbounded_channel();

        let layout = ClientMessage::Layout {
            sections: vec![
                SectionOffset { id: "home".into(), offset_top: 0.0 },
                SectionOffset { id: "gallery".into(), offset_top: 800.0 },
            ],
        };
        handle_client_message(layout, &state, &session, &tx).await;
        handle_client_message(ClientMessage::Scroll { scroll_y: 100.0 }, &state, &session, &tx).await;
        handle_client_message(ClientMessage::Scroll { scroll_y: 750.0 }, &state, &session, &tx).await;

        assert!(matches!(
            next(&mut rx).await,
            ServerMessage::ActiveSection { section: SectionId::Gallery }
        ));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn failed_rsvp_alerts_and_returns_to_idle_with_form_kept() {
        let state = app_state(Err(PortError::Transport("offline".into())), None);
        let session = session(&state);
        let (tx, mut rx) = mpsc::unbounded_channel();

        handle_client_message(ClientMessage::OpenRsvp, &state, &session, &tx).await;
        handle_client_message(ClientMessage::SubmitRsvp { form: rsvp_form() }, &state, &session, &tx).await;

        assert!(matches!(next(&mut rx).await, ServerMessage::RsvpStatus { status: RsvpStatus::Idle }));
        assert!(matches!(
            next(&mut rx).await,
            ServerMessage::RsvpStatus { status: RsvpStatus::Submitting }
        ));
        assert!(matches!(next(&mut rx).await, ServerMessage::Alert { .. }));
        assert!(matches!(next(&mut rx).await, ServerMessage::RsvpStatus { status: RsvpStatus::Idle }));

        let session = session.lock().await;
        assert_eq!(session.page.rsvp.status(), SubmissionState::Idle);
        assert_eq!(session.page.rsvp.form().plus_one_name, "Sam");
    }

    #[tokio::test]
    async fn closing_the_dialog_hides_a_late_success() {
        let state = app_state(Ok(()), None);
        let session = session(&state);
        let (tx, mut rx) = mpsc::unbounded_channel();

        handle_client_message(ClientMessage::OpenRsvp, &state, &session, &tx).await;
        handle_client_message(ClientMessage::SubmitRsvp { form: rsvp_form() }, &state, &session, &tx).await;
        handle_client_message(ClientMessage::CloseRsvp, &state, &session, &tx).await;

        tokio::time::sleep(Duration::from_millis(200)).await;
        let mut statuses = Vec::new();
        while let Ok(ServerMessage::RsvpStatus { status }) = rx.try_recv() {
            statuses.push(status);
        }
        assert_eq!(
            statuses,
            vec![RsvpStatus::Idle, RsvpStatus::Submitting, RsvpStatus::Idle]
        );
        assert_eq!(session.lock().await.page.rsvp.status(), SubmissionState::Idle);
    }

    #[tokio::test]
    async fn generate_then_sign_prepends_entry() {
        let generator: Arc<dyn MessageGenerationService> = Arc::new(EchoGenerator);
        let state = app_state(Ok(()), Some(generator));
        let session = session(&state);
        let (tx, mut rx) = mpsc::unbounded_channel();

        handle_client_message(
            ClientMessage::SetRelationship { relationship: "Cousin".into() },
            &state,
            &session,
            &tx,
        )
        .await;
        handle_client_message(ClientMessage::SetTone { tone: "Funny".into() }, &state, &session, &tx).await;
        handle_client_message(ClientMessage::GenerateMessage, &state, &session, &tx).await;
        // A second request while the first is pending is refused.
        handle_client_message(ClientMessage::GenerateMessage, &state, &session, &tx).await;

        assert!(matches!(next(&mut rx).await, ServerMessage::GenerationStarted));
        let ServerMessage::MessageGenerated { text, fallback } = next(&mut rx).await else {
            panic!("expected a generated message");
        };
        assert!(!fallback);
        assert!(text.contains("Cousin"));

        handle_client_message(ClientMessage::SetAuthorName { name: "Jo".into() }, &state, &session, &tx).await;
        handle_client_message(ClientMessage::SignGuestbook, &state, &session, &tx).await;

        let ServerMessage::GuestbookSigned { entry } = next(&mut rx).await else {
            panic!("expected a signed entry");
        };
        assert_eq!(entry.name, "Jo");
        let ServerMessage::Ledger { entries: pushed } = next(&mut rx).await else {
            panic!("expected the ledger after signing");
        };
        assert_eq!(pushed.len(), 2);
        assert_eq!(pushed[0], entry);
        assert_eq!(pushed[1].name, "Aunt Sarah");

        let session = session.lock().await;
        let entries = session.page.guestbook.ledger().entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id(), entry.id);
        assert_eq!(entries[1].author_name(), "Aunt Sarah");
        assert_eq!(session.page.guestbook.draft().tone, wedding_site_core::Tone::Funny);
    }

    #[tokio::test]
    async fn generation_without_credential_falls_back() {
        let state = app_state(Ok(()), None);
        let session = session(&state);
        let (tx, mut rx) = mpsc::unbounded_channel();

        handle_client_message(
            ClientMessage::SetRelationship { relationship: "Neighbour".into() },
            &state,
            &session,
            &tx,
        )
        .await;
        handle_client_message(ClientMessage::GenerateMessage, &state, &session, &tx).await;

        assert!(matches!(next(&mut rx).await, ServerMessage::GenerationStarted));
        let ServerMessage::MessageGenerated { text, fallback } = next(&mut rx).await else {
            panic!("expected a fallback message");
        };
        assert!(fallback);
        assert!(text.contains("Lourens and Ané"));
    }

    #[tokio::test]
    async fn signing_without_name_sends_nothing() {
        let state = app_state(Ok(()), None);
        let session = session(&state);
        let (tx, mut rx) = mpsc::unbounded_channel();

        handle_client_message(ClientMessage::EditMessage { text: "Congrats!".into() }, &state, &session, &tx).await;
        handle_client_message(ClientMessage::SignGuestbook, &state, &session, &tx).await;

        assert!(rx.try_recv().is_err());
        assert_eq!(session.lock().await.page.guestbook.ledger().len(), 1);
    }

    async fn sign_as(
        name: &str,
        message: &str,
        state: &Arc<AppState>,
        session: &Arc<Mutex<SessionState>>,
        tx: &Outbox,
    ) {
        handle_client_message(ClientMessage::SetAuthorName { name: name.into() }, state, session, tx).await;
        handle_client_message(ClientMessage::EditMessage { text: message.into() }, state, session, tx).await;
        handle_client_message(ClientMessage::SignGuestbook, state, session, tx).await;
    }

    #[tokio::test]
    async fn consecutive_signings_get_distinct_ids_newest_first() {
        let state = app_state(Ok(()), None);
        let session = session(&state);
        let (tx, mut rx) = mpsc::unbounded_channel();

        sign_as("Jo", "Congrats!", &state, &session, &tx).await;
        sign_as("Mo", "Cheers!", &state, &session, &tx).await;

        let ServerMessage::GuestbookSigned { entry: first } = next(&mut rx).await else {
            panic!("expected the first entry");
        };
        assert!(matches!(next(&mut rx).await, ServerMessage::Ledger { .. }));
        let ServerMessage::GuestbookSigned { entry: second } = next(&mut rx).await else {
            panic!("expected the second entry");
        };
        let ServerMessage::Ledger { entries } = next(&mut rx).await else {
            panic!("expected the ledger");
        };

        assert_ne!(first.id, second.id);
        assert_ne!(first.id, "1");
        assert_ne!(second.id, "1");
        let names: Vec<&str> = entries.iter().map(|entry| entry.name.as_str()).collect();
        assert_eq!(names, vec!["Mo", "Jo", "Aunt Sarah"]);
        assert_eq!(session.lock().await.page.guestbook.ledger().len(), 3);
    }

    #[tokio::test]
    async fn unknown_tone_is_rejected_and_draft_kept() {
        let state = app_state(Ok(()), None);
        let session = session(&state);
        let (tx, mut rx) = mpsc::unbounded_channel();

        handle_client_message(ClientMessage::SetTone { tone: "poetic".into() }, &state, &session, &tx).await;
        handle_client_message(ClientMessage::SetTone { tone: "Sarcastic".into() }, &state, &session, &tx).await;

        let ServerMessage::Error { message } = next(&mut rx).await else {
            panic!("expected an error for the unknown tone");
        };
        assert!(message.contains("Sarcastic"));
        assert_eq!(
            session.lock().await.page.guestbook.draft().tone,
            wedding_site_core::Tone::Poetic
        );
    }

    #[tokio::test]
    async fn unknown_layout_ids_are_skipped() {
        let state = app_state(Ok(()), None);
        let session = session(&state);
        let (tx, mut rx) = mpsc::unbounded_channel();

        let layout = ClientMessage::Layout {
            sections: vec![
                SectionOffset { id: "home".into(), offset_top: 0.0 },
                SectionOffset { id: "footer".into(), offset_top: 100.0 },
                SectionOffset { id: "registry".into(), offset_top: 1600.0 },
            ],
        };
        handle_client_message(layout, &state, &session, &tx).await;
        handle_client_message(ClientMessage::Scroll { scroll_y: 1550.0 }, &state, &session, &tx).await;

        assert!(matches!(
            next(&mut rx).await,
            ServerMessage::ActiveSection { section: SectionId::Registry }
        ));
        assert!(rx.try_recv().is_err());
    }
}
