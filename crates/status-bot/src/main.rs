use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use status_bot::backfill::backfill;
use status_bot::config::BotConfig;
use status_bot::event_loop::{run_event_loop, EVENT_BUFFER};
use status_bot::logging::init_tracing;
use status_bot::scheduler::DailyScheduler;
use status_bot::shutdown::{ShutdownCoordinator, DEFAULT_SHUTDOWN_TIMEOUT};
use status_bot::slack::{SlackClient, SocketModeListener};
use status_bot::StatusBot;
use tokio::sync::mpsc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = BotConfig::from_env().context("Failed to read configuration")?;
    init_tracing(config.debug);
    info!(
        channel = %config.channel_id,
        ignored = config.ignored.len(),
        summary_at = %config.summary_time,
        "Status bot starting"
    );

    let client = Arc::new(SlackClient::from_config(&config)?);
    let bot = Arc::new(StatusBot::new(client.clone(), config.ignored.clone()));
    let mut shutdown = ShutdownCoordinator::new();

    // Start buffering live events before backfill so nothing posted during
    // the history fetch is missed; duplicates are harmless.
    let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
    let listener = SocketModeListener::new(client, config.debug);
    let token = shutdown.token();
    shutdown.track("socket", tokio::spawn(listener.run(events_tx, token)));

    backfill(&bot, Utc::now(), config.backfill_limit).await;

    match DailyScheduler::register(bot.clone(), &config.summary_time) {
        Ok(scheduler) => {
            let token = shutdown.token();
            shutdown.track("scheduler", tokio::spawn(scheduler.run(token)));
        }
        Err(e) => error!(error = %e, "Error scheduling task, running without daily summary"),
    }

    let token = shutdown.token();
    shutdown.track(
        "events",
        tokio::spawn(run_event_loop(bot, events_rx, token)),
    );

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Shutdown signal received");
    shutdown.shutdown(DEFAULT_SHUTDOWN_TIMEOUT).await;
    Ok(())
}
