//! Typed update events.
//!
//! Instead of comparing kind names throughout bot logic, an [`Update`] can
//! be turned into an [`UpdateEvent`] and pattern-matched. Each variant
//! carries the typed object for its field.

use tracing::warn;

use crate::types::*;
use crate::update::{Update, UpdateKind};

// ---------------------------------------------------------------------------
// The top-level event enum
// ---------------------------------------------------------------------------

/// A classified update with its typed payload.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateEvent {
    /// New incoming message of any kind.
    Message(Object),
    /// A known message was edited.
    EditedMessage(Object),
    /// New incoming channel post.
    ChannelPost(Object),
    /// A known channel post was edited.
    EditedChannelPost(Object),
    InlineQuery(Object),
    ChosenInlineResult(Object),
    CallbackQuery(Object),
    ShippingQuery(Object),
    PreCheckoutQuery(Object),
    Poll(Object),
    PollAnswer(Object),
    /// The bot's own chat member status changed.
    MyChatMember(Object),
    ChatMember(Object),
    ChatJoinRequest(Object),

    /// Data sent from a Web App, with the message that carried it.
    WebAppData { data: Object, message: Object },

    /// An update we don't have a typed variant for, or whose payload did
    /// not have the expected shape. Carries the kind (if any) and the raw
    /// document so callers can still inspect it.
    Unknown {
        kind: Option<UpdateKind>,
        document: Document,
    },
}

impl UpdateEvent {
    /// Convert an update into a typed event.
    ///
    /// This never fails: anything that cannot be typed becomes
    /// [`UpdateEvent::Unknown`].
    pub fn from_update(update: &Update) -> Self {
        let Some(kind) = update.classify().cloned() else {
            return Self::unknown(None, update);
        };

        if kind == UpdateKind::WebAppData {
            return Self::parse_web_app_data(update);
        }

        let object = match update.related_object() {
            Ok(Some(Resolved::Single(object))) => object,
            Ok(_) => return Self::unknown(Some(kind), update),
            Err(e) => {
                warn!(kind = %kind, error = %e, "failed to resolve update payload");
                return Self::unknown(Some(kind), update);
            }
        };

        match kind {
            UpdateKind::Message => UpdateEvent::Message(object),
            UpdateKind::EditedMessage => UpdateEvent::EditedMessage(object),
            UpdateKind::ChannelPost => UpdateEvent::ChannelPost(object),
            UpdateKind::EditedChannelPost => UpdateEvent::EditedChannelPost(object),
            UpdateKind::InlineQuery => UpdateEvent::InlineQuery(object),
            UpdateKind::ChosenInlineResult => UpdateEvent::ChosenInlineResult(object),
            UpdateKind::CallbackQuery => UpdateEvent::CallbackQuery(object),
            UpdateKind::ShippingQuery => UpdateEvent::ShippingQuery(object),
            UpdateKind::PreCheckoutQuery => UpdateEvent::PreCheckoutQuery(object),
            UpdateKind::Poll => UpdateEvent::Poll(object),
            UpdateKind::PollAnswer => UpdateEvent::PollAnswer(object),
            UpdateKind::MyChatMember => UpdateEvent::MyChatMember(object),
            UpdateKind::ChatMember => UpdateEvent::ChatMember(object),
            UpdateKind::ChatJoinRequest => UpdateEvent::ChatJoinRequest(object),
            UpdateKind::WebAppData | UpdateKind::Other(_) => Self::unknown(Some(kind), update),
        }
    }

    /// The web app data lives inside the message, not at the top level.
    fn parse_web_app_data(update: &Update) -> Self {
        let message = update.message();
        match message.field("web_app_data") {
            Ok(Some(Resolved::Single(data))) => UpdateEvent::WebAppData { data, message },
            Ok(_) => Self::unknown(Some(UpdateKind::WebAppData), update),
            Err(e) => {
                warn!(error = %e, "failed to resolve web_app_data payload");
                Self::unknown(Some(UpdateKind::WebAppData), update)
            }
        }
    }

    fn unknown(kind: Option<UpdateKind>, update: &Update) -> Self {
        UpdateEvent::Unknown {
            kind,
            document: update.document().clone(),
        }
    }

    /// The typed payload, for every variant but `Unknown`.
    pub fn object(&self) -> Option<&Object> {
        match self {
            UpdateEvent::Message(o)
            | UpdateEvent::EditedMessage(o)
            | UpdateEvent::ChannelPost(o)
            | UpdateEvent::EditedChannelPost(o)
            | UpdateEvent::InlineQuery(o)
            | UpdateEvent::ChosenInlineResult(o)
            | UpdateEvent::CallbackQuery(o)
            | UpdateEvent::ShippingQuery(o)
            | UpdateEvent::PreCheckoutQuery(o)
            | UpdateEvent::Poll(o)
            | UpdateEvent::PollAnswer(o)
            | UpdateEvent::MyChatMember(o)
            | UpdateEvent::ChatMember(o)
            | UpdateEvent::ChatJoinRequest(o) => Some(o),
            UpdateEvent::WebAppData { data, .. } => Some(data),
            UpdateEvent::Unknown { .. } => None,
        }
    }
}

impl From<&Update> for UpdateEvent {
    fn from(update: &Update) -> Self {
        Self::from_update(update)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
