//! Live event loop: feeds inbound chat messages to the bot.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::bot::StatusBot;
use crate::transport::MessageEvent;

/// Capacity of the channel between the event transport and this loop.
///
/// The loop only starts consuming after backfill. Until then the socket
/// listener keeps acking envelopes and holds anything past this limit in its
/// own queue.
pub const EVENT_BUFFER: usize = 256;

/// Consume events until `cancel` fires or every sender is dropped.
///
/// Cancellation is only observed between events, so a message that is
/// already being handled finishes first.
pub async fn run_event_loop(
    bot: Arc<StatusBot>,
    mut events: mpsc::Receiver<MessageEvent>,
    cancel: CancellationToken,
) {
    info!("Started bot event loop");
    loop {
        let event = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("Shutting down event loop");
                break;
            }
            event = events.recv() => match event {
                Some(event) => event,
                None => {
                    info!("Event stream ended, stopping event loop");
                    break;
                }
            },
        };

        if let Err(e) = bot.handle_message(&event.sender, &event.text).await {
            error!(error = %e, "Error handling event message");
        }
    }
}
