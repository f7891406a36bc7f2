pub mod countdown_task;
pub mod generation_task;
pub mod protocol;
pub mod rest;
pub mod rsvp_task;
pub mod state;
pub mod ws_handler;

// Re-export the handlers the binary needs to build the router.
pub use rest::event_details_handler;
pub use ws_handler::ws_handler;
