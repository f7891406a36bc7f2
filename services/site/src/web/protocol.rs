//! services/site/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol between the browser page and its
//! page session on the server.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use wedding_site_core::domain::{
    GuestbookEntry, RsvpForm, Section, SubmissionState, TimeRemaining, Tone,
};

//=========================================================================================
// Shared Value Types
//=========================================================================================

/// Section ids as they appear in the page's anchors.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SectionId {
    Home,
    Gallery,
    Registry,
    Guestbook,
}

impl From<Section> for SectionId {
    fn from(section: Section) -> Self {
        match section {
            Section::Home => SectionId::Home,
            Section::Gallery => SectionId::Gallery,
            Section::Registry => SectionId::Registry,
            Section::Guestbook => SectionId::Guestbook,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneChoice {
    Heartfelt,
    Funny,
    Poetic,
    Formal,
}

impl From<Tone> for ToneChoice {
    fn from(tone: Tone) -> Self {
        match tone {
            Tone::Heartfelt => ToneChoice::Heartfelt,
            Tone::Funny => ToneChoice::Funny,
            Tone::Poetic => ToneChoice::Poetic,
            Tone::Formal => ToneChoice::Formal,
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RsvpStatus {
    Idle,
    Submitting,
    Success,
}

impl From<SubmissionState> for RsvpStatus {
    fn from(state: SubmissionState) -> Self {
        match state {
            SubmissionState::Idle => RsvpStatus::Idle,
            SubmissionState::Submitting => RsvpStatus::Submitting,
            SubmissionState::Success => RsvpStatus::Success,
        }
    }
}

/// One measured anchor. `id` is the raw anchor id; ids the page does not know are skipped.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct SectionOffset {
    pub id: String,
    pub offset_top: f64,
}

/// The RSVP dialog's fields, named after the form inputs.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct RsvpFormInput {
    pub name: String,
    pub email: String,
    /// "yes" or "no", as the radio buttons submit it.
    pub attending: String,
    pub guests: String,
    pub plus_one_name: String,
    pub plus_one_dietary: String,
    pub song_request: String,
    pub dietary_restrictions: String,
}

impl From<RsvpFormInput> for RsvpForm {
    fn from(input: RsvpFormInput) -> Self {
        RsvpForm {
            name: input.name,
            email: input.email,
            attending: input.attending == "yes",
            guests: input.guests,
            plus_one_name: input.plus_one_name,
            plus_one_dietary: input.plus_one_dietary,
            song_request: input.song_request,
            dietary_restrictions: input.dietary_restrictions,
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownView {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl From<TimeRemaining> for CountdownView {
    fn from(remaining: TimeRemaining) -> Self {
        Self {
            days: remaining.days,
            hours: remaining.hours,
            minutes: remaining.minutes,
            seconds: remaining.seconds,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct EntryView {
    pub id: String,
    pub name: String,
    pub message: String,
}

impl From<&GuestbookEntry> for EntryView {
    fn from(entry: &GuestbookEntry) -> Self {
        Self {
            id: entry.id().to_string(),
            name: entry.author_name().to_string(),
            message: entry.message().to_string(),
        }
    }
}

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================

#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// The measured top offsets of the page sections. Sent on load and resize.
    Layout { sections: Vec<SectionOffset> },

    Scroll { scroll_y: f64 },

    OpenRsvp,

    CloseRsvp,

    /// Submits the RSVP dialog. Required fields are enforced by the form itself.
    SubmitRsvp { form: RsvpFormInput },

    SetRelationship { relationship: String },

    /// The tone name as the selector shows it; matched case-insensitively.
    SetTone { tone: String },

    /// Requests a suggested guestbook message for the current relationship and tone.
    GenerateMessage,

    EditMessage { text: String },

    SetAuthorName { name: String },

    SignGuestbook,
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================

#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The full view state, sent once when the session starts.
    Snapshot {
        couple: String,
        countdown: CountdownView,
        active_section: SectionId,
        rsvp_status: RsvpStatus,
        tone: ToneChoice,
        entries: Vec<EntryView>,
    },

    Countdown(CountdownView),

    ActiveSection { section: SectionId },

    RsvpStatus { status: RsvpStatus },

    /// A blocking notice the page shows as an alert.
    Alert { message: String },

    GenerationStarted,

    /// The editable suggestion. `fallback` is true when the provider was not used.
    MessageGenerated { text: String, fallback: bool },

    GuestbookSigned { entry: EntryView },

    /// The whole ledger, newest first. Follows every successful signing.
    Ledger { entries: Vec<EntryView> },

    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_tagged_client_messages() {
        let msg: ClientMessage = serde_json::from_value(json!({
            "type": "layout",
            "sections": [{ "id": "home", "offset_top": 0.0 }, { "id": "guestbook", "offset_top": 2400.0 }]
        }))
        .unwrap();
        match msg {
            ClientMessage::Layout { sections } => {
                assert_eq!(sections.len(), 2);
                assert_eq!(sections[1].id.parse::<Section>(), Ok(Section::Guestbook));
            }
            other => panic!("unexpected message {other:?}"),
        }

        let msg: ClientMessage =
            serde_json::from_value(json!({ "type": "set_tone", "tone": "poetic" })).unwrap();
        let ClientMessage::SetTone { tone } = msg else {
            panic!("expected set_tone");
        };
        assert_eq!(tone.parse::<Tone>(), Ok(Tone::Poetic));
    }

    #[test]
    fn rsvp_form_input_tolerates_missing_optional_fields() {
        let msg: ClientMessage = serde_json::from_value(json!({
            "type": "submit_rsvp",
            "form": { "name": "Alex", "email": "alex@example.com", "attending": "yes", "guests": "1" }
        }))
        .unwrap();
        let ClientMessage::SubmitRsvp { form } = msg else {
            panic!("expected submit_rsvp");
        };
        let form = RsvpForm::from(form);
        assert!(form.attending);
        assert!(form.plus_one_name.is_empty());
    }

    #[test]
    fn serializes_server_messages_with_type_tag() {
        let value = serde_json::to_value(ServerMessage::RsvpStatus {
            status: RsvpStatus::Submitting,
        })
        .unwrap();
        assert_eq!(value, json!({ "type": "rsvp_status", "status": "submitting" }));

        let value = serde_json::to_value(ServerMessage::Countdown(CountdownView {
            days: 1,
            hours: 2,
            minutes: 3,
            seconds: 4,
        }))
        .unwrap();
        assert_eq!(
            value,
            json!({ "type": "countdown", "days": 1, "hours": 2, "minutes": 3, "seconds": 4 })
        );

        let value = serde_json::to_value(ServerMessage::Ledger {
            entries: vec![EntryView {
                id: "1".to_string(),
                name: "Aunt Sarah".to_string(),
                message: "Hi".to_string(),
            }],
        })
        .unwrap();
        assert_eq!(
            value,
            json!({ "type": "ledger", "entries": [{ "id": "1", "name": "Aunt Sarah", "message": "Hi" }] })
        );
    }
}
