//! Shared type definitions for the Roomcast relay.
//!
//! This crate is the single source of truth for the wire protocol and
//! identifier types used across the Roomcast workspace. Types defined here
//! flow downstream to `TypeScript` via `ts-rs` for the browser client.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrapper for connection identifiers
//! - [`events`] -- Tagged inbound/outbound event enums and the chat
//!   message struct

pub mod events;
pub mod ids;

// Re-export all public types at crate root for convenience.
pub use events::{AckStatus, ChatMessage, ClientEvent, ServerEvent};
pub use ids::ConnectionId;

#[cfg(test)]
mod tests {
    //! Integration test for `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // ts-rs generates TypeScript bindings when types with
        // #[ts(export)] are used. Importing them here triggers generation.
        // The actual files are written to the `bindings/` directory
        // relative to the crate root.
        use ts_rs::TS;

        let _ = crate::ids::ConnectionId::export_all();
        let _ = crate::events::AckStatus::export_all();
        let _ = crate::events::ChatMessage::export_all();
        let _ = crate::events::ClientEvent::export_all();
        let _ = crate::events::ServerEvent::export_all();
    }
}
