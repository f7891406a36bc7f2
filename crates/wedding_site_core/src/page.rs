//! crates/wedding_site_core/src/page.rs
//!
//! The page-level controller: one owned container for every component's state
//! during a single page session.

use chrono::{DateTime, Utc};
use crate::{
    countdown::Countdown,
    domain::Ledger,
    guestbook::GuestbookComposer,
    rsvp::RsvpPipeline,
    sections::SectionTracker,
};

/// Event details a page session is created from.
#[derive(Debug, Clone)]
pub struct PageSettings {
    pub couple: String,
    pub event_date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct PageState {
    pub couple: String,
    pub countdown: Countdown,
    pub sections: SectionTracker,
    pub rsvp: RsvpPipeline,
    pub guestbook: GuestbookComposer,
}

impl PageState {
    pub fn new(settings: PageSettings) -> Self {
        Self {
            couple: settings.couple,
            countdown: Countdown::new(settings.event_date),
            sections: SectionTracker::new(),
            rsvp: RsvpPipeline::new(),
            guestbook: GuestbookComposer::new(Ledger::seeded()),
        }
    }
}
