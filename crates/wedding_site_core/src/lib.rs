pub mod countdown;
pub mod domain;
pub mod guestbook;
pub mod page;
pub mod ports;
pub mod rsvp;
pub mod sections;

pub use domain::{
    Attendance, GuestbookDraft, GuestbookEntry, Ledger, RsvpForm, RsvpPayload, Section,
    SubmissionState, TimeRemaining, Tone,
};
pub use page::{PageSettings, PageState};
pub use ports::{MessageGenerationService, PortError, PortResult, RsvpIntakeService};
