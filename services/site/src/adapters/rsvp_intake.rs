//! services/site/src/adapters/rsvp_intake.rs
//!
//! This module contains the adapter for the remote RSVP intake endpoint.
//! It implements the `RsvpIntakeService` port from the `core` crate.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;
use wedding_site_core::{
    domain::RsvpPayload,
    ports::{PortError, PortResult, RsvpIntakeService},
};

/// The JSON object the intake endpoint receives.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct IntakeBody<'a> {
    pub full_name: &'a str,
    pub email: &'a str,
    pub status: &'static str,
    pub guests: u8,
    pub song_request: &'a str,
    pub dietary_restrictions: &'a str,
}

impl<'a> From<&'a RsvpPayload> for IntakeBody<'a> {
    fn from(payload: &'a RsvpPayload) -> Self {
        Self {
            full_name: &payload.full_name,
            email: &payload.email,
            status: payload.status.label(),
            guests: payload.guests,
            song_request: &payload.song_request,
            dietary_restrictions: &payload.dietary_restrictions,
        }
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// Posts RSVPs to the intake endpoint. The endpoint's reply is treated as opaque.
#[derive(Clone)]
pub struct HttpRsvpIntakeAdapter {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpRsvpIntakeAdapter {
    pub fn new(client: reqwest::Client, endpoint: String) -> Self {
        Self { client, endpoint }
    }
}

//=========================================================================================
// `RsvpIntakeService` Trait Implementation
//=========================================================================================

#[async_trait]
impl RsvpIntakeService for HttpRsvpIntakeAdapter {
    async fn submit(&self, payload: &RsvpPayload) -> PortResult<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&IntakeBody::from(payload))
            .send()
            .await
            .map_err(|e| PortError::Transport(e.to_string()))?;

        // Neither status nor body says whether the sheet accepted the row.
        debug!("RSVP intake answered with status {}", response.status());
        Ok(())
    }
}
