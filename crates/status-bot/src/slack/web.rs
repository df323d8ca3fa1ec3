//! Slack Web API client.
//!
//! Every call authenticates with a bearer token and decodes the standard
//! `{ "ok": bool, "error": "…" }` envelope before reading the method-specific
//! body. Timeouts come from the shared `reqwest::Client`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reporting::Summary;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::types::{
    is_report_candidate, next_cursor, Attachment, AttachmentField, ConnectionsOpenResponse,
    HistoryResponse, MembersResponse, PostMessageRequest, SlackMessage, UserInfoResponse,
};
use crate::config::BotConfig;
use crate::error::{TransportError, TransportResult};
use crate::transport::{ChatTransport, HistoryMessage};

/// Page size for `conversations.members`.
const MEMBERS_PAGE_SIZE: usize = 200;
/// Largest page `conversations.history` accepts.
const HISTORY_PAGE_SIZE: usize = 200;

pub struct SlackClient {
    http: reqwest::Client,
    base_url: String,
    bot_token: String,
    app_token: String,
    channel_id: String,
}

impl SlackClient {
    pub fn from_config(config: &BotConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .context("Failed to build Slack HTTP client")?;

        Ok(Self {
            http,
            base_url: config.api_base_url.clone(),
            bot_token: config.bot_token.clone(),
            app_token: config.app_token.clone(),
            channel_id: config.channel_id.clone(),
        })
    }

    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    /// Open a Socket Mode session and return its WebSocket URL.
    ///
    /// Uses the app-level token; each URL is single-use.
    pub async fn open_socket_url(&self) -> TransportResult<String> {
        const METHOD: &str = "apps.connections.open";
        let request = self
            .http
            .post(self.method_url(METHOD))
            .bearer_auth(&self.app_token);
        let body: ConnectionsOpenResponse = call(METHOD, request).await?;
        Ok(body.url)
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    async fn history_page(
        &self,
        oldest: &str,
        limit: usize,
        cursor: Option<&str>,
    ) -> TransportResult<HistoryResponse> {
        const METHOD: &str = "conversations.history";
        let mut query = vec![
            ("channel", self.channel_id.clone()),
            ("oldest", oldest.to_string()),
            ("limit", limit.to_string()),
        ];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }
        let request = self
            .http
            .get(self.method_url(METHOD))
            .bearer_auth(&self.bot_token)
            .query(&query);
        call(METHOD, request).await
    }
}

#[async_trait]
impl ChatTransport for SlackClient {
    async fn fetch_channel_members(&self) -> TransportResult<Vec<String>> {
        const METHOD: &str = "conversations.members";
        let mut members = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut query = vec![
                ("channel", self.channel_id.clone()),
                ("limit", MEMBERS_PAGE_SIZE.to_string()),
            ];
            if let Some(ref c) = cursor {
                query.push(("cursor", c.clone()));
            }
            let request = self
                .http
                .get(self.method_url(METHOD))
                .bearer_auth(&self.bot_token)
                .query(&query);
            let page: MembersResponse = call(METHOD, request).await?;
            members.extend(page.members);

            cursor = next_cursor(&page.response_metadata);
            if cursor.is_none() {
                break;
            }
        }

        debug!(count = members.len(), "Fetched channel members");
        Ok(members)
    }

    async fn resolve_display_name(&self, user_id: &str) -> TransportResult<String> {
        const METHOD: &str = "users.info";
        let request = self
            .http
            .get(self.method_url(METHOD))
            .bearer_auth(&self.bot_token)
            .query(&[("user", user_id)]);
        let body: UserInfoResponse = call(METHOD, request).await?;
        Ok(body.user.best_name().to_string())
    }

    async fn post_summary(&self, summary: &Summary) -> TransportResult<()> {
        const METHOD: &str = "chat.postMessage";
        let request = self
            .http
            .post(self.method_url(METHOD))
            .bearer_auth(&self.bot_token)
            .json(&summary_message(&self.channel_id, summary));
        let _: Value = call(METHOD, request).await?;
        Ok(())
    }

    async fn fetch_recent_history(
        &self,
        since: DateTime<Utc>,
        limit: usize,
    ) -> TransportResult<Vec<HistoryMessage>> {
        let oldest = since.timestamp().to_string();
        let mut raw: Vec<SlackMessage> = Vec::new();
        let mut cursor: Option<String> = None;

        while raw.len() < limit {
            let page_size = (limit - raw.len()).min(HISTORY_PAGE_SIZE);
            let page = self
                .history_page(&oldest, page_size, cursor.as_deref())
                .await?;
            raw.extend(page.messages);

            cursor = next_cursor(&page.response_metadata);
            if !page.has_more || cursor.is_none() {
                break;
            }
        }
        raw.truncate(limit);

        let messages: Vec<HistoryMessage> = raw
            .into_iter()
            .filter(|m| is_report_candidate(m.subtype.as_deref()))
            .map(|m| HistoryMessage::new(m.user, m.text))
            .collect();
        debug!(count = messages.len(), %since, "Fetched channel history");
        Ok(messages)
    }
}

/// Build the `chat.postMessage` body for a summary: one attachment with the
/// summary's fields.
pub fn summary_message(channel_id: &str, summary: &Summary) -> PostMessageRequest {
    let fields = summary
        .fields()
        .into_iter()
        .map(|f| AttachmentField {
            title: f.title,
            value: f.value,
            short: false,
        })
        .collect();

    PostMessageRequest {
        channel: channel_id.to_string(),
        text: summary.title().to_string(),
        attachments: vec![Attachment {
            text: summary.title().to_string(),
            color: summary.color().to_string(),
            fields,
        }],
    }
}

/// Send `request` and decode the Web API envelope into `T`.
async fn call<T: DeserializeOwned>(
    method: &'static str,
    request: RequestBuilder,
) -> TransportResult<T> {
    let response = request
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| TransportError::http(method, e))?;

    let body: Value = response
        .json()
        .await
        .map_err(|e| TransportError::http(method, e))?;

    decode_envelope(method, body)
}

fn decode_envelope<T: DeserializeOwned>(method: &'static str, body: Value) -> TransportResult<T> {
    if !body.get("ok").and_then(Value::as_bool).unwrap_or(false) {
        let error = body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown_error");
        return Err(TransportError::api(method, error));
    }
    serde_json::from_value(body).map_err(|e| TransportError::decode(method, e))
}
