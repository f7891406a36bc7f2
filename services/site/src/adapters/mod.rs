pub mod message_llm;
pub mod rsvp_intake;

pub use message_llm::OpenAiMessageAdapter;
pub use rsvp_intake::HttpRsvpIntakeAdapter;
