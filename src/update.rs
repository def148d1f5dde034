//! The update dispatcher.
//!
//! An [`Update`] is the typed wrapper around one webhook payload. Besides
//! the usual field access it classifies the payload into an
//! [`UpdateKind`] and offers shortcuts to the objects bot logic needs most
//! often: the message, the chat, and whether a command was sent.
//!
//! Two classifiers exist side by side. [`Update::classify`] takes the
//! first field after `update_id` and recognises web app data inside the
//! message. [`Update::legacy_detect_kind`] takes the last known kind field
//! and ignores web app data. They agree on well-formed payloads holding a
//! single kind field; callers relying on either behaviour keep it.

use std::{
    cell::OnceCell,
    fmt::{Display, Formatter, Result as FmtResult},
    ops::Deref,
};

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use tracing::trace;

use crate::types::{Document, DocumentError, Object, ObjectKind, Relation, Resolved};

/// Name of the identifier field present on every update.
pub const UPDATE_ID: &str = "update_id";

// ---------------------------------------------------------------------------
// UpdateKind
// ---------------------------------------------------------------------------

/// Which kind of event an update carries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UpdateKind {
    Message,
    EditedMessage,
    ChannelPost,
    EditedChannelPost,
    InlineQuery,
    ChosenInlineResult,
    CallbackQuery,
    ShippingQuery,
    PreCheckoutQuery,
    Poll,
    PollAnswer,
    MyChatMember,
    ChatMember,
    ChatJoinRequest,
    /// Synthetic kind: a message carrying `web_app_data`.
    WebAppData,
    /// A first field that is none of the above.
    Other(String),
}

impl UpdateKind {
    /// The fourteen kinds that appear as top-level update fields.
    pub const KNOWN: [UpdateKind; 14] = [
        UpdateKind::Message,
        UpdateKind::EditedMessage,
        UpdateKind::ChannelPost,
        UpdateKind::EditedChannelPost,
        UpdateKind::InlineQuery,
        UpdateKind::ChosenInlineResult,
        UpdateKind::CallbackQuery,
        UpdateKind::ShippingQuery,
        UpdateKind::PreCheckoutQuery,
        UpdateKind::Poll,
        UpdateKind::PollAnswer,
        UpdateKind::MyChatMember,
        UpdateKind::ChatMember,
        UpdateKind::ChatJoinRequest,
    ];

    pub fn wire_name(&self) -> &str {
        match self {
            UpdateKind::Message => "message",
            UpdateKind::EditedMessage => "edited_message",
            UpdateKind::ChannelPost => "channel_post",
            UpdateKind::EditedChannelPost => "edited_channel_post",
            UpdateKind::InlineQuery => "inline_query",
            UpdateKind::ChosenInlineResult => "chosen_inline_result",
            UpdateKind::CallbackQuery => "callback_query",
            UpdateKind::ShippingQuery => "shipping_query",
            UpdateKind::PreCheckoutQuery => "pre_checkout_query",
            UpdateKind::Poll => "poll",
            UpdateKind::PollAnswer => "poll_answer",
            UpdateKind::MyChatMember => "my_chat_member",
            UpdateKind::ChatMember => "chat_member",
            UpdateKind::ChatJoinRequest => "chat_join_request",
            UpdateKind::WebAppData => "web_app_data",
            UpdateKind::Other(name) => name,
        }
    }

    /// One of the fourteen known kinds, by wire name.
    pub fn known(name: &str) -> Option<UpdateKind> {
        Self::KNOWN.into_iter().find(|kind| kind.wire_name() == name)
    }

    /// Any kind by wire name; unrecognised names become [`UpdateKind::Other`].
    pub fn from_wire_name(name: &str) -> UpdateKind {
        match name {
            "web_app_data" => UpdateKind::WebAppData,
            _ => Self::known(name).unwrap_or_else(|| UpdateKind::Other(name.to_string())),
        }
    }

    pub fn is_known(&self) -> bool {
        !self.flag().is_empty()
    }

    /// The flag for this kind; empty for the synthetic and other kinds.
    pub fn flag(&self) -> UpdateKinds {
        match self {
            UpdateKind::Message => UpdateKinds::MESSAGE,
            UpdateKind::EditedMessage => UpdateKinds::EDITED_MESSAGE,
            UpdateKind::ChannelPost => UpdateKinds::CHANNEL_POST,
            UpdateKind::EditedChannelPost => UpdateKinds::EDITED_CHANNEL_POST,
            UpdateKind::InlineQuery => UpdateKinds::INLINE_QUERY,
            UpdateKind::ChosenInlineResult => UpdateKinds::CHOSEN_INLINE_RESULT,
            UpdateKind::CallbackQuery => UpdateKinds::CALLBACK_QUERY,
            UpdateKind::ShippingQuery => UpdateKinds::SHIPPING_QUERY,
            UpdateKind::PreCheckoutQuery => UpdateKinds::PRE_CHECKOUT_QUERY,
            UpdateKind::Poll => UpdateKinds::POLL,
            UpdateKind::PollAnswer => UpdateKinds::POLL_ANSWER,
            UpdateKind::MyChatMember => UpdateKinds::MY_CHAT_MEMBER,
            UpdateKind::ChatMember => UpdateKinds::CHAT_MEMBER,
            UpdateKind::ChatJoinRequest => UpdateKinds::CHAT_JOIN_REQUEST,
            UpdateKind::WebAppData | UpdateKind::Other(_) => UpdateKinds::empty(),
        }
    }
}

impl Display for UpdateKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.wire_name())
    }
}

impl Serialize for UpdateKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.wire_name())
    }
}

impl<'de> Deserialize<'de> for UpdateKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(|name| UpdateKind::from_wire_name(&name))
    }
}

// ---------------------------------------------------------------------------
// UpdateKinds
// ---------------------------------------------------------------------------

bitflags! {
    /// A set of known update kinds, e.g. for `allowed_updates`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct UpdateKinds: u16 {
        const MESSAGE = 1 << 0;
        const EDITED_MESSAGE = 1 << 1;
        const CHANNEL_POST = 1 << 2;
        const EDITED_CHANNEL_POST = 1 << 3;
        const INLINE_QUERY = 1 << 4;
        const CHOSEN_INLINE_RESULT = 1 << 5;
        const CALLBACK_QUERY = 1 << 6;
        const SHIPPING_QUERY = 1 << 7;
        const PRE_CHECKOUT_QUERY = 1 << 8;
        const POLL = 1 << 9;
        const POLL_ANSWER = 1 << 10;
        const MY_CHAT_MEMBER = 1 << 11;
        const CHAT_MEMBER = 1 << 12;
        const CHAT_JOIN_REQUEST = 1 << 13;
    }
}

impl UpdateKinds {
    /// The kinds in this set, in their canonical order.
    pub fn kinds(self) -> impl Iterator<Item = UpdateKind> {
        UpdateKind::KNOWN
            .into_iter()
            .filter(move |kind| self.contains(kind.flag()))
    }

    /// Wire names of the kinds in this set, as `allowed_updates` expects.
    pub fn wire_names(self) -> Vec<String> {
        self.kinds().map(|kind| kind.wire_name().to_string()).collect()
    }
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

/// A webhook update.
///
/// The classification is computed on first use and cached; everything else
/// is resolved on each access. The cache is a [`OnceCell`], so an `Update`
/// may move between threads but cannot be shared by reference across them.
#[derive(Debug, Clone)]
pub struct Update {
    object: Object,
    kind: OnceCell<Option<UpdateKind>>,
}

impl Update {
    /// Wrap a parsed payload, unwrapping a `{ok, result}` envelope.
    pub fn new(value: Value) -> Result<Self, DocumentError> {
        Document::new(value).map(Self::from_document)
    }

    pub fn from_json(text: &str) -> Result<Self, DocumentError> {
        Self::new(serde_json::from_str(text)?)
    }

    pub fn from_document(document: Document) -> Self {
        Self {
            object: Object::new(ObjectKind::Update, document),
            kind: OnceCell::new(),
        }
    }

    pub fn object(&self) -> &Object {
        &self.object
    }

    pub fn into_object(self) -> Object {
        self.object
    }

    pub fn update_id(&self) -> Option<i64> {
        self.object.i64(UPDATE_ID)
    }

    /// The update's kind, computed once.
    ///
    /// A message carrying `web_app_data` makes the update
    /// [`UpdateKind::WebAppData`]. Otherwise the first field after
    /// `update_id`, in payload order, names the kind. `None` when the
    /// payload has no such field.
    pub fn classify(&self) -> Option<&UpdateKind> {
        self.kind
            .get_or_init(|| {
                let kind = self.compute_kind();
                trace!(update_id = ?self.update_id(), kind = ?kind, "classified update");
                kind
            })
            .as_ref()
    }

    fn compute_kind(&self) -> Option<UpdateKind> {
        if self.message().has("web_app_data") {
            return Some(UpdateKind::WebAppData);
        }
        self.object
            .keys()
            .find(|key| *key != UPDATE_ID)
            .map(UpdateKind::from_wire_name)
    }

    /// Whether `kind`'s field is present or the classification is `kind`.
    pub fn is_kind(&self, kind: &UpdateKind) -> bool {
        self.object.has(kind.wire_name()) || self.classify() == Some(kind)
    }

    /// The last field, in payload order, that is one of the fourteen known
    /// kinds.
    ///
    /// Unlike [`classify`](Self::classify) this never reports
    /// [`UpdateKind::WebAppData`], and with several kind fields present it
    /// picks the last one rather than the first.
    #[deprecated(note = "use `classify`, which follows field order and detects web app data")]
    pub fn legacy_detect_kind(&self) -> Option<UpdateKind> {
        self.object.keys().filter_map(UpdateKind::known).last()
    }

    /// The known kinds whose fields are present.
    pub fn present_kinds(&self) -> UpdateKinds {
        self.object
            .keys()
            .filter_map(UpdateKind::known)
            .fold(UpdateKinds::empty(), |set, kind| set | kind.flag())
    }

    /// The object most relevant to this update, by the legacy kind.
    ///
    /// Message-like kinds, queries and polls yield their own field, typed
    /// through the update's relation table. A callback query yields the
    /// message it is attached to. Anything else, including a callback query
    /// without a message, yields an empty message object.
    pub fn message(&self) -> Object {
        #[allow(deprecated)]
        let kind = self.legacy_detect_kind();

        let found = match kind {
            Some(UpdateKind::CallbackQuery) => self
                .object
                .nested(UpdateKind::CallbackQuery.wire_name())
                .and_then(|query| query.nested("message"))
                .map(|message| Object::new(ObjectKind::Message, message)),
            Some(
                kind @ (UpdateKind::Message
                | UpdateKind::EditedMessage
                | UpdateKind::ChannelPost
                | UpdateKind::EditedChannelPost
                | UpdateKind::InlineQuery
                | UpdateKind::ChosenInlineResult
                | UpdateKind::ShippingQuery
                | UpdateKind::PreCheckoutQuery
                | UpdateKind::Poll),
            ) => {
                let field = kind.wire_name();
                let typed = self
                    .object
                    .relation_for(field)
                    .map_or(ObjectKind::Message, Relation::kind);
                self.object
                    .nested(field)
                    .map(|document| Object::new(typed, document))
            }
            _ => None,
        };

        found.unwrap_or_else(|| Object::new(ObjectKind::Message, self.empty()))
    }

    /// The typed object named by [`classify`](Self::classify).
    ///
    /// The synthetic web app data kind has no top-level field and resolves
    /// to `None`.
    pub fn related_object(&self) -> Result<Option<Resolved>, DocumentError> {
        match self.classify() {
            Some(kind) => self.object.field(kind.wire_name()),
            None => Ok(None),
        }
    }

    /// The chat the update happened in, or an empty document.
    ///
    /// Chat member updates carry no message, so their `chat` is read
    /// directly.
    pub fn chat(&self) -> Document {
        if self.object.has(UpdateKind::MyChatMember.wire_name()) {
            return self
                .object
                .nested(UpdateKind::MyChatMember.wire_name())
                .and_then(|member| member.nested("chat"))
                .unwrap_or_else(|| self.empty());
        }

        self.message()
            .nested("chat")
            .unwrap_or_else(|| self.empty())
    }

    /// Whether the message carries a `bot_command` entity.
    pub fn has_command(&self) -> bool {
        let message = self.message();
        message
            .sequence("entities")
            .iter()
            .any(|entity| entity.get("type").and_then(Value::as_str) == Some("bot_command"))
    }

    fn empty(&self) -> Document {
        self.object.child(Default::default())
    }
}

impl Deref for Update {
    type Target = Object;

    fn deref(&self) -> &Object {
        &self.object
    }
}

impl PartialEq for Update {
    fn eq(&self, other: &Self) -> bool {
        self.object == other.object
    }
}

impl From<Document> for Update {
    fn from(document: Document) -> Self {
        Self::from_document(document)
    }
}

#[cfg(test)]
#[allow(deprecated)]
mod tests {
    use super::*;
    use serde_json::json;
    use serde_test::{assert_tokens, Token};

    fn update(value: Value) -> Update {
        Update::new(value).expect("object payload")
    }

    fn kind_payload(kind: &UpdateKind) -> Value {
        let mut map = serde_json::Map::new();
        map.insert(UPDATE_ID.to_string(), json!(100));
        map.insert(
            kind.wire_name().to_string(),
            json!({"id": "x", "chat": {"id": 9}}),
        );
        Value::Object(map)
    }

    #[test]
    fn classifiers_agree_on_single_kind_payloads() {
        for kind in UpdateKind::KNOWN {
            let u = update(kind_payload(&kind));
            assert_eq!(u.classify(), Some(&kind), "{kind}");
            assert_eq!(u.legacy_detect_kind(), Some(kind.clone()), "{kind}");
        }
    }

    #[test]
    fn message_update_resolves_typed_message() {
        let u = update(json!({
            "update_id": 1,
            "message": {"message_id": 5, "chat": {"id": 7, "type": "private"}, "text": "hi"}
        }));

        assert_eq!(u.classify(), Some(&UpdateKind::Message));
        assert_eq!(u.update_id(), Some(1));

        let related = u.related_object().unwrap().unwrap();
        let message = related.as_object().unwrap();
        assert_eq!(message.kind(), ObjectKind::Message);
        assert_eq!(message.i64("message_id"), Some(5));
    }

    #[test]
    fn edited_channel_post_is_typed_as_edited_message() {
        let u = update(json!({"update_id": 1, "edited_channel_post": {"message_id": 2}}));
        let related = u.related_object().unwrap().unwrap();
        assert_eq!(related.as_object().map(Object::kind), Some(ObjectKind::EditedMessage));
    }

    #[test]
    fn web_app_data_overrides_field_name() {
        for holder in ["message", "edited_message", "channel_post"] {
            let mut map = serde_json::Map::new();
            map.insert("update_id".to_string(), json!(3));
            map.insert(
                holder.to_string(),
                json!({"message_id": 1, "web_app_data": {"data": "{}", "button_text": "Go"}}),
            );
            let u = update(Value::Object(map));

            assert_eq!(u.classify(), Some(&UpdateKind::WebAppData), "{holder}");
            assert!(u.is_kind(&UpdateKind::WebAppData));
            // The legacy classifier never reports the synthetic kind.
            assert_ne!(u.legacy_detect_kind(), Some(UpdateKind::WebAppData));
            assert_eq!(u.related_object().unwrap(), None);
        }
    }

    #[test]
    fn classifiers_disagree_on_multiple_kind_fields() {
        let u = update(json!({
            "update_id": 1,
            "message": {"message_id": 1},
            "poll": {"id": "p"}
        }));
        assert_eq!(u.classify(), Some(&UpdateKind::Message));
        assert_eq!(u.legacy_detect_kind(), Some(UpdateKind::Poll));
        assert!(u.is_kind(&UpdateKind::Message));
        assert!(u.is_kind(&UpdateKind::Poll));
        assert!(!u.is_kind(&UpdateKind::CallbackQuery));
        assert_eq!(u.present_kinds(), UpdateKinds::MESSAGE | UpdateKinds::POLL);
    }

    #[test]
    fn unknown_first_field_is_other() {
        let u = update(json!({"update_id": 1, "message_reaction": {"chat": {"id": 1}}}));
        assert_eq!(
            u.classify(),
            Some(&UpdateKind::Other("message_reaction".to_string()))
        );
        assert_eq!(u.legacy_detect_kind(), None);
        assert!(u.message().is_empty());
    }

    #[test]
    fn only_update_id_has_no_kind() {
        let u = update(json!({"update_id": 1}));
        assert_eq!(u.classify(), None);
        assert_eq!(u.related_object().unwrap(), None);
    }

    #[test]
    fn classification_is_memoized() {
        let u = update(json!({"update_id": 1, "poll": {"id": "p"}}));
        let first = u.classify().unwrap() as *const UpdateKind;
        let second = u.classify().unwrap() as *const UpdateKind;
        assert_eq!(first, second);
    }

    #[test]
    fn my_chat_member_chat_is_read_directly() {
        let u = update(json!({
            "update_id": 1,
            "my_chat_member": {
                "chat": {"id": -42, "type": "group"},
                "from": {"id": 1},
                "date": 0,
                "old_chat_member": {"status": "left", "user": {"id": 2}},
                "new_chat_member": {"status": "member", "user": {"id": 2}}
            }
        }));
        assert!(u.message().is_empty());
        assert_eq!(u.chat().i64("id"), Some(-42));
    }

    #[test]
    fn chat_comes_from_message() {
        let u = update(json!({"update_id": 1, "message": {"chat": {"id": 7}}}));
        assert_eq!(u.chat().i64("id"), Some(7));

        let u = update(json!({"update_id": 1, "poll_answer": {"poll_id": "p"}}));
        assert!(u.chat().is_empty());
    }

    #[test]
    fn callback_query_message() {
        let u = update(json!({
            "update_id": 1,
            "callback_query": {
                "id": "q",
                "from": {"id": 1},
                "message": {"message_id": 4, "chat": {"id": 8}},
                "data": "yes"
            }
        }));
        assert_eq!(u.message().i64("message_id"), Some(4));
        assert_eq!(u.chat().i64("id"), Some(8));
    }

    #[test]
    fn callback_query_without_message() {
        let u = update(json!({
            "update_id": 1,
            "callback_query": {"id": "q", "from": {"id": 1}, "inline_message_id": "i"}
        }));
        assert!(u.message().is_empty());
        assert!(!u.has_command());
        assert!(u.chat().is_empty());
    }

    #[test]
    fn message_is_typed_through_update_relations() {
        let u = update(json!({
            "update_id": 1,
            "message": {"message_id": 5, "from": {"id": 1, "first_name": "Ann"}, "chat": {"id": 7}}
        }));
        let message = u.message();
        assert_eq!(message.kind(), ObjectKind::Message);

        let from = message.field("from").unwrap().unwrap();
        assert_eq!(from.as_object().map(Object::kind), Some(ObjectKind::User));

        let callback = update(json!({
            "update_id": 2,
            "callback_query": {"id": "q", "message": {"message_id": 4, "chat": {"id": 8}}}
        }));
        let chat = callback.message().field("chat").unwrap().unwrap();
        assert_eq!(chat.as_object().map(Object::kind), Some(ObjectKind::Chat));
        assert_eq!(callback.message().kind(), ObjectKind::Message);
    }

    #[test]
    fn message_follows_legacy_kind_not_classification() {
        let u = update(json!({
            "update_id": 1,
            "message": {"message_id": 1},
            "poll": {"id": "p"}
        }));
        assert_eq!(u.classify(), Some(&UpdateKind::Message));

        let message = u.message();
        assert_eq!(message.kind(), ObjectKind::Poll);
        assert_eq!(message.str("id"), Some("p"));
        assert!(!message.has("message_id"));
    }

    #[test]
    fn direct_kinds_yield_their_own_field() {
        let cases = [
            (UpdateKind::Message, ObjectKind::Message),
            (UpdateKind::EditedMessage, ObjectKind::EditedMessage),
            (UpdateKind::ChannelPost, ObjectKind::Message),
            (UpdateKind::EditedChannelPost, ObjectKind::EditedMessage),
            (UpdateKind::InlineQuery, ObjectKind::InlineQuery),
            (UpdateKind::ChosenInlineResult, ObjectKind::ChosenInlineResult),
            (UpdateKind::ShippingQuery, ObjectKind::ShippingQuery),
            (UpdateKind::PreCheckoutQuery, ObjectKind::PreCheckoutQuery),
            (UpdateKind::Poll, ObjectKind::Poll),
        ];
        for (kind, expected) in cases {
            let u = update(kind_payload(&kind));
            let message = u.message();
            assert_eq!(message.kind(), expected, "{kind}");
            assert_eq!(message.str("id"), Some("x"), "{kind}");
        }

        for kind in [
            UpdateKind::PollAnswer,
            UpdateKind::MyChatMember,
            UpdateKind::ChatMember,
            UpdateKind::ChatJoinRequest,
        ] {
            let message = update(kind_payload(&kind)).message();
            assert!(message.is_empty(), "{kind}");
            assert_eq!(message.kind(), ObjectKind::Message, "{kind}");
        }
    }

    #[test]
    fn detects_bot_commands() {
        let u = update(json!({
            "update_id": 1,
            "message": {
                "text": "/start",
                "entities": [{"type": "bot_command", "offset": 0, "length": 6}]
            }
        }));
        assert!(u.has_command());

        let u = update(json!({
            "update_id": 1,
            "message": {"text": "plain", "entities": [{"type": "bold", "offset": 0, "length": 5}]}
        }));
        assert!(!u.has_command());

        let u = update(json!({"update_id": 1, "message": {"text": "plain"}}));
        assert!(!u.has_command());
    }

    #[test]
    fn repeated_related_object_is_value_equal() {
        let u = update(json!({"update_id": 1, "callback_query": {"id": "q", "from": {"id": 1}}}));
        assert_eq!(u.related_object().unwrap(), u.related_object().unwrap());
    }

    #[test]
    fn update_relations_apply_to_field_access() {
        let u = update(json!({"update_id": 1, "chat_member": {"chat": {"id": 1}}}));
        let member = u.field("chatMember").unwrap().unwrap();
        assert_eq!(member.as_object().map(Object::kind), Some(ObjectKind::ChatMemberUpdated));
    }

    #[test]
    fn kind_names_round_trip() {
        for kind in UpdateKind::KNOWN {
            assert_eq!(UpdateKind::from_wire_name(kind.wire_name()), kind);
            assert!(kind.is_known());
        }
        assert_eq!(UpdateKind::from_wire_name("web_app_data"), UpdateKind::WebAppData);
        assert!(!UpdateKind::WebAppData.is_known());
    }

    #[test]
    fn update_kind_serde_tokens() {
        assert_tokens(&UpdateKind::CallbackQuery, &[Token::Str("callback_query")]);
        assert_tokens(&UpdateKind::WebAppData, &[Token::Str("web_app_data")]);
        assert_tokens(
            &UpdateKind::Other("business_message".to_string()),
            &[Token::Str("business_message")],
        );
    }

    #[test]
    fn update_kinds_wire_names() {
        let set = UpdateKinds::CALLBACK_QUERY | UpdateKinds::MESSAGE;
        assert_eq!(set.wire_names(), ["message", "callback_query"]);
        assert_eq!(UpdateKinds::all().kinds().count(), 14);
    }
}
