//! Slack Socket Mode listener.
//!
//! Opens a WebSocket via `apps.connections.open`, acknowledges every envelope,
//! and forwards message events from the monitored channel to the event loop.
//! The connection is re-established with exponential back-off whenever Slack
//! asks for a reconnect or the socket drops.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::types::{is_report_candidate, Ack, EventCallback, SocketEnvelope};
use super::web::SlackClient;
use crate::error::{TransportError, TransportResult};
use crate::transport::MessageEvent;

const INITIAL_BACKOFF: Duration = Duration::from_secs(2);
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// A decoded Socket Mode frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketFrame {
    Hello,
    /// Slack is about to close this connection.
    Disconnect { reason: String },
    /// An envelope that must be acknowledged, with the message it carried if
    /// it is a candidate status report.
    Envelope {
        envelope_id: String,
        message: Option<MessageEvent>,
    },
    /// Anything else; logged and dropped.
    Other { kind: String },
}

/// Decode one text frame, keeping only message events for `channel_id`.
pub fn decode_frame(raw: &str, channel_id: &str) -> TransportResult<SocketFrame> {
    let envelope: SocketEnvelope =
        serde_json::from_str(raw).map_err(|e| TransportError::decode("socket envelope", e))?;

    let frame = match (envelope.kind.as_str(), envelope.envelope_id) {
        ("hello", _) => SocketFrame::Hello,
        ("disconnect", _) => SocketFrame::Disconnect {
            reason: envelope.reason.unwrap_or_default(),
        },
        ("events_api", Some(envelope_id)) => {
            let message = match envelope.payload {
                Some(payload) => message_from_payload(payload, channel_id),
                None => None,
            };
            SocketFrame::Envelope {
                envelope_id,
                message,
            }
        }
        // Slash commands, interactivity, etc. still need an ack.
        (_, Some(envelope_id)) => SocketFrame::Envelope {
            envelope_id,
            message: None,
        },
        (kind, None) => SocketFrame::Other {
            kind: kind.to_string(),
        },
    };
    Ok(frame)
}

fn message_from_payload(payload: serde_json::Value, channel_id: &str) -> Option<MessageEvent> {
    let callback: EventCallback = match serde_json::from_value(payload) {
        Ok(callback) => callback,
        Err(e) => {
            error!(error = %e, "Could not decode events API payload");
            return None;
        }
    };
    if callback.kind != "event_callback" {
        warn!(kind = %callback.kind, "Unsupported events API payload type");
        return None;
    }

    let event = callback.event;
    if event.kind != "message" || event.channel != channel_id {
        return None;
    }
    if !is_report_candidate(event.subtype.as_deref()) {
        return None;
    }
    Some(MessageEvent::new(event.user, event.text))
}

/// Wait before the next reconnect, given the wait before the last one.
/// A clean close starts over from the initial delay.
fn next_backoff(previous: Duration, clean_close: bool) -> Duration {
    if clean_close {
        INITIAL_BACKOFF
    } else {
        (previous * 2).min(MAX_BACKOFF)
    }
}

pub struct SocketModeListener {
    client: Arc<SlackClient>,
    debug: bool,
}

impl SocketModeListener {
    pub fn new(client: Arc<SlackClient>, debug: bool) -> Self {
        Self { client, debug }
    }

    /// Listen until `cancel` fires or the event receiver is dropped.
    pub async fn run(self, events: mpsc::Sender<MessageEvent>, cancel: CancellationToken) {
        let mut backoff = INITIAL_BACKOFF;

        loop {
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Shutting down socket mode listener");
                    return;
                }
                result = self.run_connection(&events) => result,
            };

            let clean_close = match result {
                Ok(()) => {
                    info!("Socket mode connection closed, reconnecting");
                    true
                }
                Err(TransportError::Closed) => {
                    info!("Event loop stopped, closing socket mode listener");
                    return;
                }
                Err(e) => {
                    error!(error = %e, retry_in = ?backoff, "Socket mode connection failed");
                    false
                }
            };
            let wait = if clean_close { INITIAL_BACKOFF } else { backoff };

            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Shutting down socket mode listener");
                    return;
                }
                _ = tokio::time::sleep(wait) => {}
            }
            backoff = next_backoff(wait, clean_close);
        }
    }

    /// One connection lifetime. Returns `Ok` when Slack closes the socket.
    async fn run_connection(&self, events: &mpsc::Sender<MessageEvent>) -> TransportResult<()> {
        let mut url = self.client.open_socket_url().await?;
        if self.debug {
            url.push_str("&debug_reconnects=true");
        }

        let (ws, _) = connect_async(url)
            .await
            .map_err(|e| TransportError::Socket(e.to_string()))?;
        info!("Connected to Slack socket mode");
        let (sink, stream) = ws.split();

        pump_frames(stream, sink, self.client.channel_id(), events).await
    }
}

/// Read frames until the connection ends, acking every envelope and
/// forwarding channel messages to `events`.
///
/// Messages wait in a local queue while `events` is full, so reading and
/// acking never stall behind a slow consumer. Whatever is still queued when
/// the connection ends is delivered before returning.
async fn pump_frames<St, Si, E>(
    mut stream: St,
    mut sink: Si,
    channel_id: &str,
    events: &mpsc::Sender<MessageEvent>,
) -> TransportResult<()>
where
    St: Stream<Item = Result<Message, E>> + Unpin,
    E: std::fmt::Display,
    Si: Sink<Message> + Unpin,
    Si::Error: std::fmt::Display,
{
    let mut queued: VecDeque<MessageEvent> = VecDeque::new();

    loop {
        tokio::select! {
            permit = events.reserve(), if !queued.is_empty() => {
                let permit = permit.map_err(|_| TransportError::Closed)?;
                if let Some(message) = queued.pop_front() {
                    permit.send(message);
                }
            }
            frame = stream.next() => {
                let Some(frame) = frame else { break };
                let frame = frame.map_err(|e| TransportError::Socket(e.to_string()))?;
                let text = match frame {
                    Message::Text(text) => text,
                    Message::Close(_) => break,
                    _ => continue,
                };

                match decode_frame(text.as_str(), channel_id) {
                    Ok(SocketFrame::Hello) => debug!("Socket mode handshake complete"),
                    Ok(SocketFrame::Disconnect { reason }) => {
                        info!(%reason, "Slack requested reconnect");
                        break;
                    }
                    Ok(SocketFrame::Envelope {
                        envelope_id,
                        message,
                    }) => {
                        let ack = serde_json::to_string(&Ack {
                            envelope_id: &envelope_id,
                        })
                        .map_err(|e| TransportError::decode("socket ack", e))?;
                        sink.send(Message::text(ack))
                            .await
                            .map_err(|e| TransportError::Socket(e.to_string()))?;

                        if let Some(message) = message {
                            queued.push_back(message);
                        }
                    }
                    Ok(SocketFrame::Other { kind }) => {
                        debug!(%kind, "Ignoring socket mode frame")
                    }
                    Err(e) => error!(error = %e, "Could not decode socket mode frame"),
                }
            }
        }
    }

    for message in queued {
        events
            .send(message)
            .await
            .map_err(|_| TransportError::Closed)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use serde_json::json;

    fn events_api(event: serde_json::Value) -> String {
        json!({
            "envelope_id": "env-1",
            "type": "events_api",
            "accepts_response_payload": false,
            "payload": { "type": "event_callback", "event": event }
        })
        .to_string()
    }

    #[test]
    fn hello_and_disconnect_frames() {
        assert_eq!(
            decode_frame(r#"{"type":"hello","num_connections":1}"#, "C1").unwrap(),
            SocketFrame::Hello
        );
        assert_eq!(
            decode_frame(r#"{"type":"disconnect","reason":"refresh_requested"}"#, "C1").unwrap(),
            SocketFrame::Disconnect {
                reason: "refresh_requested".into()
            }
        );
    }

    #[test]
    fn channel_message_is_forwarded() {
        let raw = events_api(json!({
            "type": "message", "user": "U1", "text": "done: tests", "channel": "C1"
        }));
        assert_eq!(
            decode_frame(&raw, "C1").unwrap(),
            SocketFrame::Envelope {
                envelope_id: "env-1".into(),
                message: Some(MessageEvent::new("U1", "done: tests")),
            }
        );
    }

    #[test]
    fn integration_post_keeps_empty_sender() {
        let raw = events_api(json!({
            "type": "message", "subtype": "bot_message",
            "text": "Submission from <@U01J9JZQZ8G>", "channel": "C1"
        }));
        let SocketFrame::Envelope { message, .. } = decode_frame(&raw, "C1").unwrap() else {
            panic!("expected envelope");
        };
        assert_eq!(message, Some(MessageEvent::new("", "Submission from <@U01J9JZQZ8G>")));
    }

    #[test]
    fn other_channels_and_joins_are_acked_but_dropped() {
        let other = events_api(json!({
            "type": "message", "user": "U1", "text": "hi", "channel": "C2"
        }));
        let join = events_api(json!({
            "type": "message", "subtype": "channel_join",
            "user": "U1", "text": "joined", "channel": "C1"
        }));
        for raw in [other, join] {
            assert_eq!(
                decode_frame(&raw, "C1").unwrap(),
                SocketFrame::Envelope {
                    envelope_id: "env-1".into(),
                    message: None,
                }
            );
        }
    }

    #[test]
    fn mistyped_payload_is_acked_without_message() {
        let raw = json!({
            "envelope_id": "env-9",
            "type": "events_api",
            "payload": { "unexpected": true }
        })
        .to_string();
        assert_eq!(
            decode_frame(&raw, "C1").unwrap(),
            SocketFrame::Envelope {
                envelope_id: "env-9".into(),
                message: None,
            }
        );
    }

    #[test]
    fn non_event_envelopes_still_need_ack() {
        let raw = r#"{"envelope_id":"env-2","type":"slash_commands","payload":{}}"#;
        assert_eq!(
            decode_frame(raw, "C1").unwrap(),
            SocketFrame::Envelope {
                envelope_id: "env-2".into(),
                message: None,
            }
        );
    }

    #[test]
    fn backoff_doubles_up_to_cap() {
        let mut delay = INITIAL_BACKOFF;
        let mut waits = vec![delay.as_secs()];
        for _ in 0..7 {
            delay = next_backoff(delay, false);
            waits.push(delay.as_secs());
        }
        assert_eq!(waits, vec![2, 4, 8, 16, 32, 60, 60, 60]);
    }

    #[test]
    fn clean_close_resets_backoff() {
        assert_eq!(next_backoff(MAX_BACKOFF, true), INITIAL_BACKOFF);
        assert_eq!(next_backoff(Duration::from_secs(8), true), INITIAL_BACKOFF);
    }

    fn channel_message(envelope_id: &str, user: &str) -> Result<Message, std::io::Error> {
        let raw = json!({
            "envelope_id": envelope_id,
            "type": "events_api",
            "payload": {
                "type": "event_callback",
                "event": { "type": "message", "user": user, "text": "done", "channel": "C1" }
            }
        })
        .to_string();
        Ok(Message::text(raw))
    }

    fn acked_id(ack: Message) -> String {
        let Message::Text(text) = ack else {
            panic!("ack must be a text frame");
        };
        let value: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
        value["envelope_id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn acks_keep_flowing_while_event_buffer_is_full() {
        let frames = vec![
            channel_message("env-0", "U0"),
            channel_message("env-1", "U1"),
            channel_message("env-2", "U2"),
        ];
        // The socket stays open after the three envelopes.
        let stream = futures::stream::iter(frames).chain(futures::stream::pending());
        let (ack_tx, mut ack_rx) = futures::channel::mpsc::unbounded::<Message>();
        let (events_tx, mut events_rx) = mpsc::channel(1);

        tokio::select! {
            result = pump_frames(stream, ack_tx, "C1", &events_tx) => {
                panic!("pump stopped while the socket was open: {result:?}");
            }
            _ = async {
                // All envelopes are acked before anyone drains the buffer.
                for expected in ["env-0", "env-1", "env-2"] {
                    assert_eq!(acked_id(ack_rx.next().await.unwrap()), expected);
                }
                let mut senders = Vec::new();
                for _ in 0..3 {
                    senders.push(events_rx.recv().await.unwrap().sender);
                }
                assert_eq!(senders, vec!["U0", "U1", "U2"]);
            } => {}
        }
    }

    #[tokio::test]
    async fn queued_messages_are_delivered_on_disconnect() {
        let frames = vec![
            channel_message("env-0", "U0"),
            channel_message("env-1", "U1"),
            Ok(Message::text(
                r#"{"type":"disconnect","reason":"refresh_requested"}"#.to_string(),
            )),
        ];
        let (ack_tx, _ack_rx) = futures::channel::mpsc::unbounded::<Message>();
        let (events_tx, mut events_rx) = mpsc::channel(4);

        pump_frames(futures::stream::iter(frames), ack_tx, "C1", &events_tx)
            .await
            .unwrap();

        assert_eq!(events_rx.recv().await.unwrap().sender, "U0");
        assert_eq!(events_rx.recv().await.unwrap().sender, "U1");
    }

    #[tokio::test]
    async fn dropped_consumer_stops_the_pump() {
        let frames = vec![channel_message("env-0", "U0")];
        let stream = futures::stream::iter(frames).chain(futures::stream::pending());
        let (ack_tx, _ack_rx) = futures::channel::mpsc::unbounded::<Message>();
        let (events_tx, events_rx) = mpsc::channel(1);
        drop(events_rx);

        let result = pump_frames(stream, ack_tx, "C1", &events_tx).await;

        assert!(matches!(result, Err(TransportError::Closed)));
    }

    #[test]
    fn garbage_frame_is_decode_error() {
        assert!(matches!(
            decode_frame("not json", "C1"),
            Err(TransportError::Decode { .. })
        ));
    }
}
