use std::time::Duration;

use reporting::IgnorePolicy;
use thiserror::Error;

/// Default cap on messages replayed from today's history at startup.
pub const DEFAULT_BACKFILL_LIMIT: usize = 1000;
/// Default Slack Web API base URL.
pub const DEFAULT_SLACK_API_URL: &str = "https://slack.com/api";
/// Default per-request timeout for Web API calls.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
/// Default trigger time for the daily summary (UTC).
pub const DEFAULT_SUMMARY_TIME: &str = "23:55";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {name}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Process configuration, read once at startup.
#[derive(Clone)]
pub struct BotConfig {
    /// Bot user OAuth token (`xoxb-…`) for Web API calls.
    pub bot_token: String,
    /// App-level token (`xapp-…`) for opening Socket Mode connections.
    pub app_token: String,
    /// The monitored channel.
    pub channel_id: String,
    /// Verbose logging; false when unset or unparsable.
    pub debug: bool,
    /// Members excluded from reporting.
    pub ignored: IgnorePolicy,
    /// Raw `HH:MM` trigger time. Parsed when the scheduler registers so a bad
    /// value disables only the summary, not the bot.
    pub summary_time: String,
    /// Upper bound on messages replayed during backfill.
    pub backfill_limit: usize,
    pub api_base_url: String,
    pub http_timeout: Duration,
}

impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("bot_token", &"<redacted>")
            .field("app_token", &"<redacted>")
            .field("channel_id", &self.channel_id)
            .field("debug", &self.debug)
            .field("ignored", &self.ignored.len())
            .field("summary_time", &self.summary_time)
            .field("backfill_limit", &self.backfill_limit)
            .field("api_base_url", &self.api_base_url)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

impl BotConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let bot_token = required("SLACK_BOT_TOKEN")?;
        let app_token = required("SLACK_APP_TOKEN")?;
        let channel_id = required("SLACK_CHANNEL_ID")?;

        let debug = lookup("DEBUG")
            .as_deref()
            .map(parse_bool)
            .unwrap_or(false);

        let ignored = IgnorePolicy::parse(&lookup("IGNORED_USERS").unwrap_or_default());

        let summary_time =
            lookup("STATUSBOT_SUMMARY_TIME").unwrap_or_else(|| DEFAULT_SUMMARY_TIME.into());

        let backfill_limit = match lookup("STATUSBOT_BACKFILL_LIMIT") {
            Some(raw) => parse_number("STATUSBOT_BACKFILL_LIMIT", &raw)?,
            None => DEFAULT_BACKFILL_LIMIT,
        };

        let api_base_url = lookup("STATUSBOT_SLACK_API_URL")
            .unwrap_or_else(|| DEFAULT_SLACK_API_URL.into())
            .trim_end_matches('/')
            .to_string();

        let http_timeout_secs = match lookup("STATUSBOT_HTTP_TIMEOUT_SECS") {
            Some(raw) => parse_number("STATUSBOT_HTTP_TIMEOUT_SECS", &raw)?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        Ok(Self {
            bot_token,
            app_token,
            channel_id,
            debug,
            ignored,
            summary_time,
            backfill_limit,
            api_base_url,
            http_timeout: Duration::from_secs(http_timeout_secs),
        })
    }
}

/// `1`, `t`, `true` (any of `T`, `TRUE`, `True`) are true; anything else,
/// including `yes` and `on`, is `false`.
fn parse_bool(raw: &str) -> bool {
    matches!(raw, "1" | "t" | "T" | "true" | "TRUE" | "True")
}

fn parse_number<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}
