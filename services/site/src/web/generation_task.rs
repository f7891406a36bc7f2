//! services/site/src/web/generation_task.rs
//!
//! The asynchronous worker that asks the provider for a guestbook suggestion.

use crate::web::{
    protocol::ServerMessage,
    state::{AppState, Outbox, SessionState},
};
use std::{sync::Arc, time::Instant};
use tokio::sync::Mutex;
use tracing::{info, warn};
use wedding_site_core::guestbook::{generate_message, GenerationOutcome};

/// Runs one generation request. Always ends with editable text in the draft.
pub async fn generation_process(
    app_state: Arc<AppState>,
    session_state_lock: Arc<Mutex<SessionState>>,
    outbox: Outbox,
    prompt: String,
) -> GenerationOutcome {
    let start_time = Instant::now();
    let outcome = generate_message(
        app_state.message_generator.as_deref(),
        &prompt,
        &app_state.config.couple_names,
    )
    .await;
    info!("Message generation took {:?}", start_time.elapsed());

    session_state_lock
        .lock()
        .await
        .page
        .guestbook
        .finish_generation(&outcome);

    let message = ServerMessage::MessageGenerated {
        text: outcome.text().to_string(),
        fallback: outcome.is_fallback(),
    };
    if outbox.send(message).is_err() {
        warn!("Page session closed before the generated message could be shown.");
    }
    outcome
}
