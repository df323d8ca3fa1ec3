//! Wire types for the parts of the Slack Web API and Socket Mode protocol the
//! bot uses. Fields the bot never reads are left out; `#[serde(default)]` keeps
//! decoding tolerant of optional fields Slack omits.

use serde::{Deserialize, Serialize};

/// Message subtypes that are membership or housekeeping noise, never a status
/// report.
const NON_REPORT_SUBTYPES: &[&str] = &["channel_join", "channel_leave", "message_deleted"];

/// Whether a message with this subtype can be a status report.
pub fn is_report_candidate(subtype: Option<&str>) -> bool {
    subtype.map_or(true, |s| !NON_REPORT_SUBTYPES.contains(&s))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseMetadata {
    #[serde(default)]
    pub next_cursor: String,
}

/// Returns the pagination cursor if another page exists.
pub fn next_cursor(meta: &Option<ResponseMetadata>) -> Option<String> {
    meta.as_ref()
        .map(|m| m.next_cursor.trim())
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}

/// `conversations.members`
#[derive(Debug, Clone, Deserialize)]
pub struct MembersResponse {
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub response_metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub real_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlackUser {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub real_name: String,
    #[serde(default)]
    pub profile: UserProfile,
}

impl SlackUser {
    /// Display name, falling back to the real name and then the handle.
    pub fn best_name(&self) -> &str {
        [
            self.profile.display_name.as_str(),
            self.profile.real_name.as_str(),
            self.real_name.as_str(),
            self.name.as_str(),
        ]
        .into_iter()
        .map(str::trim)
        .find(|n| !n.is_empty())
        .unwrap_or(self.id.as_str())
    }
}

/// `users.info`
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfoResponse {
    pub user: SlackUser,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SlackMessage {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub subtype: Option<String>,
}

/// `conversations.history`
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub messages: Vec<SlackMessage>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub response_metadata: Option<ResponseMetadata>,
}

/// `apps.connections.open`
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionsOpenResponse {
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttachmentField {
    pub title: String,
    pub value: String,
    pub short: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Attachment {
    pub text: String,
    pub color: String,
    pub fields: Vec<AttachmentField>,
}

/// `chat.postMessage` request body.
#[derive(Debug, Clone, Serialize)]
pub struct PostMessageRequest {
    pub channel: String,
    /// Notification fallback for clients that do not render attachments.
    pub text: String,
    pub attachments: Vec<Attachment>,
}

// ── Socket Mode ──────────────────────────────────────────────────────────────

/// Outer frame of every Socket Mode message.
#[derive(Debug, Clone, Deserialize)]
pub struct SocketEnvelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub envelope_id: Option<String>,
    #[serde(default)]
    pub payload: Option<serde_json::Value>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Payload of an `events_api` envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct EventCallback {
    #[serde(rename = "type")]
    pub kind: String,
    pub event: InnerEvent,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InnerEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub subtype: Option<String>,
}

/// Socket Mode acknowledgement.
#[derive(Debug, Clone, Serialize)]
pub struct Ack<'a> {
    pub envelope_id: &'a str,
}
