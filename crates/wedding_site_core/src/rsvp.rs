//! crates/wedding_site_core/src/rsvp.rs
//!
//! The RSVP pipeline: payload derivation from the raw form and the
//! `Idle -> Submitting -> Success` state machine around the intake port.

use tracing::{error, info};
use crate::{
    domain::{Attendance, RsvpForm, RsvpPayload, SubmissionState},
    ports::{PortResult, RsvpIntakeService},
};

pub const MIN_GUESTS: u8 = 1;
pub const MAX_GUESTS: u8 = 5;

/// The notice shown to the guest when the request could not be sent.
pub const SUBMISSION_FAILED_NOTICE: &str = "There was an error sending your RSVP. Please try again.";

//=========================================================================================
// Payload Derivation
//=========================================================================================

/// Parses the selected guest-count option. Reads the leading digits, so "2 Guests"
/// is 2; text without leading digits falls back to one guest. The result is clamped
/// to the range the dialog offers, and a digit run too long for `u32` saturates high.
pub fn parse_guest_count(raw: &str) -> u8 {
    let digits: String = raw
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return MIN_GUESTS;
    }
    digits
        .parse::<u32>()
        .map(|n| n.clamp(MIN_GUESTS as u32, MAX_GUESTS as u32) as u8)
        .unwrap_or(MAX_GUESTS)
}

/// Builds the payload the intake endpoint receives.
///
/// Companion fields only count when more than one guest is selected. The name
/// falls back to the primary name; the dietary notes fall back to the primary
/// notes verbatim, without a "Plus One" label.
pub fn build_payload(form: &RsvpForm) -> RsvpPayload {
    let guests = parse_guest_count(&form.guests);
    let has_companion = guests > 1;

    let full_name = if has_companion && !form.plus_one_name.is_empty() {
        format!("{} & {}", form.name, form.plus_one_name)
    } else {
        form.name.clone()
    };

    let dietary_restrictions = if has_companion && !form.plus_one_dietary.is_empty() {
        let primary = if form.dietary_restrictions.is_empty() {
            String::new()
        } else {
            format!("{}. ", form.dietary_restrictions)
        };
        format!("{}Plus One: {}", primary, form.plus_one_dietary)
    } else {
        form.dietary_restrictions.clone()
    };

    RsvpPayload {
        full_name,
        email: form.email.clone(),
        status: Attendance::from_attending(form.attending),
        guests,
        song_request: form.song_request.clone(),
        dietary_restrictions,
    }
}

//=========================================================================================
// Submission State Machine
//=========================================================================================

/// One in-flight submission, handed out by `begin_submission`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsvpAttempt {
    pub id: u64,
    pub payload: RsvpPayload,
}

/// What `complete` did with a finished request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RsvpTransition {
    Succeeded,
    /// Back to `Idle`; the form is kept so the guest can retry.
    Failed { notice: String },
    /// The dialog was closed or reopened while the request was in flight.
    Ignored,
}

#[derive(Debug, Clone, Default)]
pub struct RsvpPipeline {
    status: SubmissionState,
    dialog_open: bool,
    form: RsvpForm,
    current_attempt: u64,
}

impl RsvpPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> SubmissionState {
        self.status
    }

    pub fn is_dialog_open(&self) -> bool {
        self.dialog_open
    }

    pub fn form(&self) -> &RsvpForm {
        &self.form
    }

    pub fn open_dialog(&mut self) {
        self.dialog_open = true;
        self.reset_status();
    }

    pub fn close_dialog(&mut self) {
        self.dialog_open = false;
        self.reset_status();
    }

    /// Leaves any in-flight attempt to finish unseen.
    fn reset_status(&mut self) {
        if self.status == SubmissionState::Submitting {
            self.current_attempt += 1;
        }
        self.status = SubmissionState::Idle;
    }

    /// Stores the form and moves to `Submitting`. Refused while a submission is pending.
    pub fn begin_submission(&mut self, form: RsvpForm) -> Option<RsvpAttempt> {
        if self.status == SubmissionState::Submitting {
            return None;
        }
        self.form = form;
        self.current_attempt += 1;
        self.status = SubmissionState::Submitting;
        Some(RsvpAttempt {
            id: self.current_attempt,
            payload: build_payload(&self.form),
        })
    }

    /// Applies the transport outcome of attempt `attempt_id`.
    pub fn complete(&mut self, attempt_id: u64, outcome: PortResult<()>) -> RsvpTransition {
        if attempt_id != self.current_attempt || self.status != SubmissionState::Submitting {
            info!("Discarding result of stale RSVP attempt {}", attempt_id);
            return RsvpTransition::Ignored;
        }
        match outcome {
            Ok(()) => {
                self.status = SubmissionState::Success;
                self.form = RsvpForm::default();
                RsvpTransition::Succeeded
            }
            Err(e) => {
                error!("Error submitting RSVP: {}", e);
                self.status = SubmissionState::Idle;
                RsvpTransition::Failed {
                    notice: SUBMISSION_FAILED_NOTICE.to_string(),
                }
            }
        }
    }

    /// Runs a whole begin -> deliver -> complete cycle against `intake`.
    pub async fn submit(
        &mut self,
        form: RsvpForm,
        intake: &dyn RsvpIntakeService,
    ) -> Option<RsvpTransition> {
        let attempt = self.begin_submission(form)?;
        let outcome = intake.submit(&attempt.payload).await;
        Some(self.complete(attempt.id, outcome))
    }
}
