//! services/site/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::{
    protocol::{SectionId, ToneChoice},
    state::AppState,
};
use axum::{extract::State, response::Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};
use wedding_site_core::{
    domain::{Section, Tone},
    sections::SCROLL_LOOKAHEAD,
};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        event_details_handler,
    ),
    components(
        schemas(EventDetailsResponse, SectionId, ToneChoice)
    ),
    tags(
        (name = "Wedding Site API", description = "Event details for the single-page wedding site.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response Structs
//=========================================================================================

/// Static event details the page needs before it opens its session socket.
#[derive(Serialize, ToSchema, Debug)]
pub struct EventDetailsResponse {
    pub couple: String,
    /// The countdown target, RFC 3339.
    pub event_date: DateTime<Utc>,
    /// Section ids in document order.
    pub sections: Vec<SectionId>,
    pub scroll_lookahead: f64,
    pub tones: Vec<ToneChoice>,
    /// Whether guestbook suggestions come from the provider or from fallback text.
    pub generation_available: bool,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Get the event details.
#[utoipa::path(
    get,
    path = "/event",
    responses(
        (status = 200, description = "Event details", body = EventDetailsResponse)
    )
)]
pub async fn event_details_handler(
    State(app_state): State<Arc<AppState>>,
) -> Json<EventDetailsResponse> {
    Json(EventDetailsResponse {
        couple: app_state.config.couple_names.clone(),
        event_date: app_state.config.event_date,
        sections: Section::ALL.into_iter().map(SectionId::from).collect(),
        scroll_lookahead: SCROLL_LOOKAHEAD,
        tones: Tone::ALL.into_iter().map(ToneChoice::from).collect(),
        generation_available: app_state.message_generator.is_some(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use async_trait::async_trait;
    use wedding_site_core::{
        domain::RsvpPayload,
        ports::{PortResult, RsvpIntakeService},
    };

    struct NoopIntake;

    #[async_trait]
    impl RsvpIntakeService for NoopIntake {
        async fn submit(&self, _payload: &RsvpPayload) -> PortResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn event_details_list_sections_in_order() {
        let app_state = Arc::new(AppState {
            config: Arc::new(Config::from_lookup(|_| None).unwrap()),
            rsvp_intake: Arc::new(NoopIntake),
            message_generator: None,
        });

        let Json(details) = event_details_handler(State(app_state)).await;

        assert_eq!(details.couple, "Lourens and Ané");
        assert_eq!(
            details.sections,
            vec![SectionId::Home, SectionId::Gallery, SectionId::Registry, SectionId::Guestbook]
        );
        assert_eq!(details.tones.len(), 4);
        assert!(!details.generation_available);
    }

    #[test]
    fn openapi_document_lists_event_path() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/event"));
    }
}
