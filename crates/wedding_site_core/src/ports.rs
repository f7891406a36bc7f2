//! crates/wedding_site_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the page session's external collaborators.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the RSVP intake endpoint and the text-generation provider.

use async_trait::async_trait;
use crate::domain::RsvpPayload;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    /// The request never completed (DNS, connect, TLS, reset, timeout).
    #[error("Transport failure: {0}")]
    Transport(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait RsvpIntakeService: Send + Sync {
    /// Delivers one RSVP to the remote intake endpoint.
    ///
    /// The endpoint's response is opaque: `Ok(())` only means the request went out
    /// without a transport error. It says nothing about server-side acceptance.
    async fn submit(&self, payload: &RsvpPayload) -> PortResult<()>;
}

#[async_trait]
pub trait MessageGenerationService: Send + Sync {
    /// Generates a short guestbook message from a natural-language prompt.
    async fn generate_message(&self, prompt: &str) -> PortResult<String>;
}
