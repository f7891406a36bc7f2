//! services/site/src/web/state.rs
//!
//! Defines the application's shared state and the per-connection page session.

use crate::{
    config::Config,
    web::protocol::{EntryView, ServerMessage},
};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;
use wedding_site_core::{
    page::{PageSettings, PageState},
    ports::{MessageGenerationService, RsvpIntakeService},
};

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub rsvp_intake: Arc<dyn RsvpIntakeService>,
    /// `None` when no generation credential is configured.
    pub message_generator: Option<Arc<dyn MessageGenerationService>>,
}

impl AppState {
    pub fn page_settings(&self) -> PageSettings {
        PageSettings {
            couple: self.config.couple_names.clone(),
            event_date: self.config.event_date,
        }
    }
}

//=========================================================================================
// SessionState (Specific to One WebSocket Connection)
//=========================================================================================

/// Queue of messages for one connection. A writer task drains it into the socket.
pub type Outbox = mpsc::UnboundedSender<ServerMessage>;

/// The state for a single page session. Nothing in it outlives the connection.
pub struct SessionState {
    pub session_id: Uuid,
    pub page: PageState,
}

impl SessionState {
    pub fn new(settings: PageSettings) -> Self {
        let mut page = PageState::new(settings);
        page.countdown.tick(Utc::now());
        Self {
            session_id: Uuid::new_v4(),
            page,
        }
    }

    /// The full view state, for the first message of a session.
    pub fn snapshot(&self) -> ServerMessage {
        let page = &self.page;
        ServerMessage::Snapshot {
            couple: page.couple.clone(),
            countdown: page.countdown.remaining().into(),
            active_section: page.sections.active().into(),
            rsvp_status: page.rsvp.status().into(),
            tone: page.guestbook.draft().tone.into(),
            entries: page
                .guestbook
                .ledger()
                .entries()
                .iter()
                .map(EntryView::from)
                .collect(),
        }
    }
}
