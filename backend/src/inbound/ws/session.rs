//! Per-connection WebSocket loop.
//!
//! The channel carries no application messages yet. The server pings every
//! 5s and closes a connection after 10s without client traffic; tests
//! shorten both intervals.

use std::time::{Duration, Instant};

use actix_ws::{CloseCode, CloseReason, Closed, Message, MessageStream, ProtocolError, Session};
use tokio::time;
use tracing::{debug, info, warn};

/// Time between heartbeats to the client.
#[cfg(not(test))]
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
#[cfg(test)]
const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(50);

/// Max idle time before disconnecting the client.
#[cfg(not(test))]
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);
#[cfg(test)]
const CLIENT_TIMEOUT: Duration = Duration::from_millis(100);

pub(super) async fn handle_ws_session(session: Session, stream: MessageStream, peer: String) {
    let reason = run(session, stream).await;
    info!(peer = %peer, reason = reason.label(), "WebSocket client disconnected");
}

#[derive(Debug)]
enum SessionError {
    ClientClosed(Option<CloseReason>),
    StreamClosed,
    HeartbeatTimeout,
    Protocol(ProtocolError),
    Network(Closed),
}

impl SessionError {
    fn label(&self) -> &'static str {
        match self {
            Self::ClientClosed(_) => "client_closed",
            Self::StreamClosed => "stream_closed",
            Self::HeartbeatTimeout => "heartbeat_timeout",
            Self::Protocol(_) => "protocol_error",
            Self::Network(_) => "send_failed",
        }
    }

    fn close_reason(&self) -> Option<Option<CloseReason>> {
        match self {
            Self::HeartbeatTimeout => Some(Some(CloseReason {
                code: CloseCode::Normal,
                description: Some("heartbeat timeout".to_owned()),
            })),
            Self::Protocol(_) => Some(Some(CloseReason {
                code: CloseCode::Protocol,
                description: Some("protocol error".to_owned()),
            })),
            Self::ClientClosed(reason) => Some(reason.clone()),
            Self::StreamClosed | Self::Network(_) => None,
        }
    }
}

async fn run(mut session: Session, mut stream: MessageStream) -> SessionError {
    let mut last_heartbeat = Instant::now();
    let mut heartbeat = time::interval(HEARTBEAT_INTERVAL);

    let error = loop {
        let result = tokio::select! {
            _ = heartbeat.tick() => heartbeat_tick(&mut session, last_heartbeat).await,
            message = stream.recv() => {
                handle_stream_message(&mut session, &mut last_heartbeat, message).await
            }
        };
        if let Err(error) = result {
            break error;
        }
    };

    match &error {
        SessionError::HeartbeatTimeout => warn!("WebSocket heartbeat timeout; closing connection"),
        SessionError::Protocol(err) => warn!(error = %err, "WebSocket protocol error"),
        SessionError::Network(err) => warn!(error = %err, "WebSocket send failed"),
        SessionError::ClientClosed(_) | SessionError::StreamClosed => {}
    }
    if let Some(reason) = error.close_reason() {
        session
            .close(reason)
            .await
            .unwrap_or_else(|err| debug!(error = %err, "WebSocket session already closed"));
    }
    error
}

async fn heartbeat_tick(session: &mut Session, last_heartbeat: Instant) -> Result<(), SessionError> {
    if Instant::now().duration_since(last_heartbeat) > CLIENT_TIMEOUT {
        return Err(SessionError::HeartbeatTimeout);
    }
    session.ping(b"").await.map_err(SessionError::Network)
}

async fn handle_stream_message(
    session: &mut Session,
    last_heartbeat: &mut Instant,
    message: Option<Result<Message, ProtocolError>>,
) -> Result<(), SessionError> {
    let message = match message {
        Some(Ok(message)) => message,
        Some(Err(error)) => return Err(SessionError::Protocol(error)),
        None => return Err(SessionError::StreamClosed),
    };

    *last_heartbeat = Instant::now();
    match message {
        Message::Ping(payload) => session.pong(&payload).await.map_err(SessionError::Network),
        Message::Text(text) => {
            debug!(bytes = text.len(), "Ignoring WebSocket text frame");
            Ok(())
        }
        Message::Binary(_) | Message::Pong(_) | Message::Continuation(_) | Message::Nop => Ok(()),
        Message::Close(reason) => Err(SessionError::ClientClosed(reason)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(SessionError::HeartbeatTimeout, Some(CloseCode::Normal))]
    #[case(SessionError::StreamClosed, None)]
    #[case(SessionError::ClientClosed(Some(CloseCode::Away.into())), Some(CloseCode::Away))]
    fn close_frames_follow_the_shutdown_cause(
        #[case] error: SessionError,
        #[case] expected: Option<CloseCode>,
    ) {
        let code = error.close_reason().flatten().map(|reason| reason.code);
        assert_eq!(code, expected);
    }

    #[test]
    fn heartbeat_outlasts_one_missed_ping() {
        assert!(CLIENT_TIMEOUT > HEARTBEAT_INTERVAL);
    }
}
