//! crates/wedding_site_core/src/domain.rs
//!
//! Defines the pure, core data structures for the page session.
//! These structs are independent of any transport or serialization format.

use std::fmt;
use std::str::FromStr;

//=========================================================================================
// Countdown
//=========================================================================================

/// A days/hours/minutes/seconds breakdown of the time left until the event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeRemaining {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl TimeRemaining {
    pub const ZERO: TimeRemaining = TimeRemaining {
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    /// Collapses the breakdown back into whole seconds.
    pub fn total_seconds(&self) -> u64 {
        self.days * 86_400 + self.hours * 3_600 + self.minutes * 60 + self.seconds
    }
}

//=========================================================================================
// Sections
//=========================================================================================

/// A named content region of the page, in document order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Section {
    #[default]
    Home,
    Gallery,
    Registry,
    Guestbook,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Home,
        Section::Gallery,
        Section::Registry,
        Section::Guestbook,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Section::Home => "home",
            Section::Gallery => "gallery",
            Section::Registry => "registry",
            Section::Guestbook => "guestbook",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Section {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Section::ALL
            .into_iter()
            .find(|section| section.id() == s)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

/// Returned when a section id or tone name does not match any known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown variant: {0}")]
pub struct UnknownVariant(pub String);

//=========================================================================================
// RSVP
//=========================================================================================

/// Whether the respondent is coming. The intake endpoint expects the label form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attendance {
    Accepts,
    Declines,
}

impl Attendance {
    pub fn from_attending(attending: bool) -> Self {
        if attending {
            Attendance::Accepts
        } else {
            Attendance::Declines
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Attendance::Accepts => "Joyfully Accepts",
            Attendance::Declines => "Regretfully Declines",
        }
    }
}

/// The raw values entered into the RSVP dialog.
///
/// `guests` is kept as the selected option text; it is only parsed when a payload
/// is built. Required fields are enforced by the form control, not here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RsvpForm {
    pub name: String,
    pub email: String,
    pub attending: bool,
    pub guests: String,
    pub plus_one_name: String,
    pub plus_one_dietary: String,
    pub song_request: String,
    pub dietary_restrictions: String,
}

/// The normalized submission sent to the intake endpoint. Lives for one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsvpPayload {
    pub full_name: String,
    pub email: String,
    pub status: Attendance,
    pub guests: u8,
    pub song_request: String,
    pub dietary_restrictions: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Success,
}

//=========================================================================================
// Guestbook
//=========================================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tone {
    #[default]
    Heartfelt,
    Funny,
    Poetic,
    Formal,
}

impl Tone {
    pub const ALL: [Tone; 4] = [Tone::Heartfelt, Tone::Funny, Tone::Poetic, Tone::Formal];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Heartfelt => "Heartfelt",
            Tone::Funny => "Funny",
            Tone::Poetic => "Poetic",
            Tone::Formal => "Formal",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tone {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tone::ALL
            .into_iter()
            .find(|tone| tone.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

/// The composer's uncommitted working state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuestbookDraft {
    pub relationship: String,
    pub tone: Tone,
    pub generated_text: String,
    pub author_name: String,
}

/// A signed guestbook message. Fields are read-only once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestbookEntry {
    id: String,
    author_name: String,
    message: String,
}

impl GuestbookEntry {
    pub fn new(id: impl Into<String>, author_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            author_name: author_name.into(),
            message: message.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn author_name(&self) -> &str {
        &self.author_name
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Committed guestbook entries, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    entries: Vec<GuestbookEntry>,
}

impl Ledger {
    /// A ledger holding the sample entry every page session starts with.
    pub fn seeded() -> Self {
        Self {
            entries: vec![GuestbookEntry::new(
                "1",
                "Aunt Sarah",
                "Wishing you both a lifetime of love and joy. So happy for you!",
            )],
        }
    }

    pub fn prepend(&mut self, entry: GuestbookEntry) {
        self.entries.insert(0, entry);
    }

    pub fn entries(&self) -> &[GuestbookEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_ids_round_trip_through_from_str() {
        for section in Section::ALL {
            assert_eq!(section.id().parse::<Section>(), Ok(section));
        }
        assert!("contact".parse::<Section>().is_err());
    }

    #[test]
    fn tone_parsing_ignores_case() {
        assert_eq!("poetic".parse::<Tone>(), Ok(Tone::Poetic));
        assert_eq!(Tone::default(), Tone::Heartfelt);
        assert!("sarcastic".parse::<Tone>().is_err());
    }

    #[test]
    fn attendance_labels_match_intake_expectations() {
        assert_eq!(Attendance::from_attending(true).label(), "Joyfully Accepts");
        assert_eq!(Attendance::from_attending(false).label(), "Regretfully Declines");
    }

    #[test]
    fn seeded_ledger_has_sample_entry() {
        let ledger = Ledger::seeded();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.entries()[0].author_name(), "Aunt Sarah");
    }
}
