//! Inbound event dispatch: one parsed frame to one engine operation.
//!
//! This is the handler boundary the error design calls for: parse
//! failures and per-request rejections both turn into a single `error`
//! event back to the originating connection, and unexpected conditions
//! are logged rather than allowed to tear down the connection or the
//! process. Nothing here touches relay state directly.

use tracing::{debug, warn};

use roomcast_core::{EventSink, RelayEngine, RelayError};
use roomcast_types::{ClientEvent, ConnectionId, ServerEvent};

/// Parse one inbound text frame and run the corresponding engine
/// operation, reporting any rejection back to the sender only.
pub(crate) async fn handle_frame<S: EventSink>(
    engine: &RelayEngine<S>,
    connection: ConnectionId,
    frame: &str,
) {
    let event = match serde_json::from_str::<ClientEvent>(frame) {
        Ok(event) => event,
        Err(parse_error) => {
            warn!(%connection, %parse_error, "malformed client frame");
            report(engine, connection, &RelayError::InvalidFormat);
            return;
        }
    };

    let result = match event {
        ClientEvent::Join { room } => engine.join(connection, &room).await,
        ClientEvent::Leave { room } => engine.leave(connection, &room).await,
        ClientEvent::GetParticipants { room } => {
            engine.get_participants(connection, &room).await
        }
        ClientEvent::Message {
            room,
            message,
            username,
        } => engine.send_message(connection, &room, &message, username).await,
        ClientEvent::TestMessage { message } => {
            engine.test_message(connection, message).await;
            Ok(())
        }
    };

    if let Err(rejection) = result {
        debug!(%connection, %rejection, "client request rejected");
        report(engine, connection, &rejection);
    }
}

/// Emit the single-format `error` event carrying the rejection text.
fn report<S: EventSink>(engine: &RelayEngine<S>, connection: ConnectionId, error: &RelayError) {
    engine.sink().deliver(
        connection,
        &ServerEvent::Error {
            message: error.to_string(),
        },
    );
}
