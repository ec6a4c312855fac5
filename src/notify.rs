//! Mention notifications
//!
//! Fan-out for a sent message: every mentioned user, then every member of
//! every mentioned department. The sender never notifies themselves.

use crate::directory::Directory;
use crate::message::OutgoingMessage;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    ChatMention,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub channel_id: String,
    pub message_id: String,
    pub read: bool,
    /// Unix milliseconds
    pub created_at: i64,
}

/// Who sent the message
#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Sender {
    pub user_id: String,
    #[serde(default)]
    pub name: String,
}

impl Sender {
    /// Name shown in notification text; "Someone" when unknown.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            "Someone"
        } else {
            &self.name
        }
    }
}

/// Generate a random notification id.
pub fn generate_notification_id() -> String {
    let mut bytes = [0u8; 6];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("notif_{}", hex::encode(bytes))
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Content cut to `max_chars` chars, with `...` appended when cut.
pub fn preview(content: &str, max_chars: usize) -> String {
    if content.chars().count() > max_chars {
        let cut: String = content.chars().take(max_chars).collect();
        format!("{cut}...")
    } else {
        content.to_string()
    }
}

/// Build the notifications for `message`, already stored under `message_id`.
pub fn mention_notifications(
    message: &OutgoingMessage,
    message_id: &str,
    sender: &Sender,
    channel_name: Option<&str>,
    directory: &Directory,
    preview_chars: usize,
) -> Vec<Notification> {
    let channel = channel_name.unwrap_or("chat");
    let body = preview(&message.content, preview_chars);
    let created_at = now_millis();

    let make = |user_id: &str, title: &str, text: String| Notification {
        id: generate_notification_id(),
        user_id: user_id.to_string(),
        kind: NotificationType::ChatMention,
        title: title.to_string(),
        message: text,
        channel_id: message.channel_id.clone(),
        message_id: message_id.to_string(),
        read: false,
        created_at,
    };

    let sender_name = sender.display_name();
    let mut out = Vec::new();

    for user_id in message.mentions.iter().filter(|id| **id != sender.user_id) {
        out.push(make(
            user_id,
            "Mentioned in Chat",
            format!("{} mentioned you in #{}: {}", sender_name, channel, body),
        ));
    }

    for department_id in &message.department_mentions {
        let department_name = directory
            .department(department_id)
            .map(|d| d.name.as_str())
            .unwrap_or("your department");

        for member in directory.members_of(department_id) {
            if member.id == sender.user_id {
                continue;
            }
            out.push(make(
                &member.id,
                "Department Mentioned in Chat",
                format!(
                    "{} mentioned @{} in #{}: {}",
                    sender_name, department_name, channel, body
                ),
            ));
        }
    }

    tracing::debug!(
        message_id,
        count = out.len(),
        "mention notifications built"
    );
    out
}
