//! Extension traits for documents that hold Bot API objects.
//!
//! These add helpers (`.text()`, `.date()`, `.command()`, `.full_name()`,
//! ...) on top of the generic accessors. They are implemented for
//! [`Document`]; [`Object`](crate::types::Object) and
//! [`Update`](crate::update::Update) reach them through `Deref`.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::types::document::Document;

/// Content fields that decide a message's type, in priority order.
pub const MESSAGE_TYPES: &[&str] = &[
    "text",
    "audio",
    "animation",
    "document",
    "game",
    "photo",
    "sticker",
    "video",
    "voice",
    "video_note",
    "contact",
    "location",
    "venue",
    "poll",
    "dice",
    "new_chat_members",
    "left_chat_member",
    "new_chat_title",
    "new_chat_photo",
    "delete_chat_photo",
    "group_chat_created",
    "supergroup_chat_created",
    "channel_chat_created",
    "migrate_to_chat_id",
    "migrate_from_chat_id",
    "pinned_message",
    "invoice",
    "successful_payment",
    "connected_website",
    "passport_data",
    "web_app_data",
];

// ===========================================================================
// MessageExt
// ===========================================================================

/// A `/command@bot args` invocation found in a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Command name without the leading slash.
    pub name: String,
    /// Bot username the command was addressed to, if any.
    pub bot: Option<String>,
    /// Remaining text after the command, trimmed.
    pub args: String,
}

/// Convenience methods on message documents.
pub trait MessageExt {
    /// The message text, or the caption for media messages.
    fn text(&self) -> Option<&str>;

    /// When the message was sent.
    fn date(&self) -> Option<DateTime<Utc>>;

    /// When the message was last edited.
    fn edit_date(&self) -> Option<DateTime<Utc>>;

    /// The first content field present, from [`MESSAGE_TYPES`].
    fn message_type(&self) -> Option<&'static str>;

    fn is_type(&self, message_type: &str) -> bool;

    /// The first `bot_command` entity, decoded.
    fn command(&self) -> Option<Command>;

    /// `chat.id`.
    fn chat_id(&self) -> Option<i64>;
}

impl MessageExt for Document {
    fn text(&self) -> Option<&str> {
        self.str("text").or_else(|| self.str("caption"))
    }

    fn date(&self) -> Option<DateTime<Utc>> {
        self.i64("date").and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    fn edit_date(&self) -> Option<DateTime<Utc>> {
        self.i64("edit_date")
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    fn message_type(&self) -> Option<&'static str> {
        MESSAGE_TYPES
            .iter()
            .copied()
            .find(|field| self.raw().get(*field).is_some_and(|v| !v.is_null()))
    }

    fn is_type(&self, message_type: &str) -> bool {
        self.message_type() == Some(message_type)
    }

    fn command(&self) -> Option<Command> {
        let (text, entities) = match self.str("text") {
            Some(text) => (text, self.sequence("entities")),
            None => (self.str("caption")?, self.sequence("caption_entities")),
        };

        let entity = entities
            .iter()
            .find(|e| e.get("type").and_then(Value::as_str) == Some("bot_command"))?;
        let offset = usize::try_from(entity.get("offset")?.as_u64()?).ok()?;
        let length = usize::try_from(entity.get("length")?.as_u64()?).ok()?;

        // Entity offsets count UTF-16 code units.
        let units: Vec<u16> = text.encode_utf16().collect();
        let end = offset.checked_add(length)?;
        let raw = String::from_utf16_lossy(units.get(offset..end)?);
        let args = String::from_utf16_lossy(&units[end..]).trim().to_string();

        let raw = raw.strip_prefix('/').unwrap_or(&raw);
        let (name, bot) = match raw.split_once('@') {
            Some((name, bot)) => (name.to_string(), Some(bot.to_string())),
            None => (raw.to_string(), None),
        };

        Some(Command { name, bot, args })
    }

    fn chat_id(&self) -> Option<i64> {
        self.nested("chat").and_then(|chat| chat.i64("id"))
    }
}

// ===========================================================================
// UserExt
// ===========================================================================

/// Convenience methods on user (and private chat) documents.
pub trait UserExt {
    /// `first_name last_name`, or just the first name.
    fn full_name(&self) -> Option<String>;

    /// `@username`, if the user has one.
    fn handle(&self) -> Option<String>;
}

impl UserExt for Document {
    fn full_name(&self) -> Option<String> {
        let first = self.str("first_name")?;
        Some(match self.str("last_name") {
            Some(last) if !last.is_empty() => format!("{first} {last}"),
            _ => first.to_string(),
        })
    }

    fn handle(&self) -> Option<String> {
        self.str("username").map(|name| format!("@{name}"))
    }
}

// ===========================================================================
// Tests
// ===========================================================================
