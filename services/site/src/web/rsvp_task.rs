//! services/site/src/web/rsvp_task.rs
//!
//! The asynchronous worker that delivers one RSVP attempt and feeds the
//! outcome back into the page session.

use crate::web::{
    protocol::ServerMessage,
    state::{AppState, Outbox, SessionState},
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};
use wedding_site_core::rsvp::{RsvpAttempt, RsvpTransition};

/// Sends the attempt's payload to the intake endpoint, then applies the result.
/// The session lock is not held while the request is in flight.
pub async fn rsvp_process(
    app_state: Arc<AppState>,
    session_state_lock: Arc<Mutex<SessionState>>,
    outbox: Outbox,
    attempt: RsvpAttempt,
) -> RsvpTransition {
    info!("Submitting RSVP attempt {}.", attempt.id);
    let outcome = app_state.rsvp_intake.submit(&attempt.payload).await;

    let (transition, status) = {
        let mut session = session_state_lock.lock().await;
        let transition = session.page.rsvp.complete(attempt.id, outcome);
        (transition, session.page.rsvp.status())
    };

    let messages = match &transition {
        RsvpTransition::Succeeded => vec![ServerMessage::RsvpStatus { status: status.into() }],
        RsvpTransition::Failed { notice } => vec![
            ServerMessage::Alert {
                message: notice.clone(),
            },
            ServerMessage::RsvpStatus { status: status.into() },
        ],
        RsvpTransition::Ignored => Vec::new(),
    };
    for message in messages {
        if outbox.send(message).is_err() {
            warn!("Page session closed before the RSVP outcome could be shown.");
            break;
        }
    }
    transition
}
