//! Outgoing message preparation
//!
//! Turns the composed text into the payload handed to the message sink:
//! trimmed content plus the resolved user, department and ticket ids.

use crate::directory::Directory;
use crate::error::{ComposeError, Result};
use crate::mentions::extract_references;
use serde::{Deserialize, Serialize};

/// Payload for the send-message call. Empty id lists are left off the wire.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingMessage {
    pub channel_id: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mentions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub department_mentions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ticket_references: Vec<String>,
}

/// Validate and resolve a message about to be sent.
pub fn prepare_message(channel_id: &str, content: &str, directory: &Directory) -> Result<OutgoingMessage> {
    let content = content.trim();
    if content.is_empty() {
        return Err(ComposeError::EmptyMessage);
    }

    let refs = extract_references(content, directory);
    tracing::debug!(
        channel_id,
        users = refs.user_ids.len(),
        departments = refs.department_ids.len(),
        tickets = refs.ticket_ids.len(),
        "message prepared"
    );

    Ok(OutgoingMessage {
        channel_id: channel_id.to_string(),
        content: content.to_string(),
        mentions: refs.user_ids,
        department_mentions: refs.department_ids,
        ticket_references: refs.ticket_ids,
    })
}
