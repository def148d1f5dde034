//! Typed wrapper identities and their relation tables.
//!
//! Every Bot API object this crate knows about is one variant of
//! [`ObjectKind`]. A kind owns a static table declaring which of its
//! fields hold other typed objects (or lists of them). The table is a
//! compile-time constant; nothing is looked up by type name at runtime.

use std::ops::Deref;

use self::ObjectKind as K;
use crate::types::{
    document::Document,
    error::DocumentError,
    relation::{
        self, Relation,
        Relation::{Many, One},
        RelationTable, Resolved,
    },
};

// ---------------------------------------------------------------------------
// ObjectKind
// ---------------------------------------------------------------------------

/// The closed set of typed wrappers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Update,
    Message,
    EditedMessage,
    ReplyToMessage,
    User,
    Chat,
    MessageEntity,
    PhotoSize,
    CallbackQuery,
    InlineQuery,
    ChosenInlineResult,
    ShippingQuery,
    ShippingAddress,
    PreCheckoutQuery,
    OrderInfo,
    Poll,
    PollOption,
    PollAnswer,
    ChatMemberUpdated,
    ChatMember,
    ChatJoinRequest,
    ChatInviteLink,
    WebAppData,
    Location,
    Contact,
    Venue,
    Audio,
    Voice,
    Video,
    VideoNote,
    Animation,
    Sticker,
    Dice,
    /// A general file; its wire name is `document`.
    File,
    Invoice,
    SuccessfulPayment,
    Game,
}

impl ObjectKind {
    pub const ALL: [ObjectKind; 37] = [
        ObjectKind::Update,
        ObjectKind::Message,
        ObjectKind::EditedMessage,
        ObjectKind::ReplyToMessage,
        ObjectKind::User,
        ObjectKind::Chat,
        ObjectKind::MessageEntity,
        ObjectKind::PhotoSize,
        ObjectKind::CallbackQuery,
        ObjectKind::InlineQuery,
        ObjectKind::ChosenInlineResult,
        ObjectKind::ShippingQuery,
        ObjectKind::ShippingAddress,
        ObjectKind::PreCheckoutQuery,
        ObjectKind::OrderInfo,
        ObjectKind::Poll,
        ObjectKind::PollOption,
        ObjectKind::PollAnswer,
        ObjectKind::ChatMemberUpdated,
        ObjectKind::ChatMember,
        ObjectKind::ChatJoinRequest,
        ObjectKind::ChatInviteLink,
        ObjectKind::WebAppData,
        ObjectKind::Location,
        ObjectKind::Contact,
        ObjectKind::Venue,
        ObjectKind::Audio,
        ObjectKind::Voice,
        ObjectKind::Video,
        ObjectKind::VideoNote,
        ObjectKind::Animation,
        ObjectKind::Sticker,
        ObjectKind::Dice,
        ObjectKind::File,
        ObjectKind::Invoice,
        ObjectKind::SuccessfulPayment,
        ObjectKind::Game,
    ];

    /// The snake_case name a field must have to be typed as this kind when
    /// no relation declares it.
    pub const fn wire_name(self) -> &'static str {
        match self {
            ObjectKind::Update => "update",
            ObjectKind::Message => "message",
            ObjectKind::EditedMessage => "edited_message",
            ObjectKind::ReplyToMessage => "reply_to_message",
            ObjectKind::User => "user",
            ObjectKind::Chat => "chat",
            ObjectKind::MessageEntity => "message_entity",
            ObjectKind::PhotoSize => "photo_size",
            ObjectKind::CallbackQuery => "callback_query",
            ObjectKind::InlineQuery => "inline_query",
            ObjectKind::ChosenInlineResult => "chosen_inline_result",
            ObjectKind::ShippingQuery => "shipping_query",
            ObjectKind::ShippingAddress => "shipping_address",
            ObjectKind::PreCheckoutQuery => "pre_checkout_query",
            ObjectKind::OrderInfo => "order_info",
            ObjectKind::Poll => "poll",
            ObjectKind::PollOption => "poll_option",
            ObjectKind::PollAnswer => "poll_answer",
            ObjectKind::ChatMemberUpdated => "chat_member_updated",
            ObjectKind::ChatMember => "chat_member",
            ObjectKind::ChatJoinRequest => "chat_join_request",
            ObjectKind::ChatInviteLink => "chat_invite_link",
            ObjectKind::WebAppData => "web_app_data",
            ObjectKind::Location => "location",
            ObjectKind::Contact => "contact",
            ObjectKind::Venue => "venue",
            ObjectKind::Audio => "audio",
            ObjectKind::Voice => "voice",
            ObjectKind::Video => "video",
            ObjectKind::VideoNote => "video_note",
            ObjectKind::Animation => "animation",
            ObjectKind::Sticker => "sticker",
            ObjectKind::Dice => "dice",
            ObjectKind::File => "document",
            ObjectKind::Invoice => "invoice",
            ObjectKind::SuccessfulPayment => "successful_payment",
            ObjectKind::Game => "game",
        }
    }

    /// The kind whose wire name is exactly `field`.
    pub fn from_wire_name(field: &str) -> Option<ObjectKind> {
        Self::ALL.into_iter().find(|kind| kind.wire_name() == field)
    }

    /// Fields of this kind that hold typed objects.
    pub const fn relations(self) -> RelationTable {
        match self {
            ObjectKind::Update => UPDATE,
            ObjectKind::Message | ObjectKind::EditedMessage | ObjectKind::ReplyToMessage => {
                MESSAGE
            }
            ObjectKind::Chat => CHAT,
            ObjectKind::MessageEntity => MESSAGE_ENTITY,
            ObjectKind::CallbackQuery => CALLBACK_QUERY,
            ObjectKind::InlineQuery | ObjectKind::ChosenInlineResult => INLINE_QUERY,
            ObjectKind::ShippingQuery => SHIPPING_QUERY,
            ObjectKind::PreCheckoutQuery => PRE_CHECKOUT_QUERY,
            ObjectKind::OrderInfo => ORDER_INFO,
            ObjectKind::Poll => POLL,
            ObjectKind::PollAnswer => POLL_ANSWER,
            ObjectKind::ChatMemberUpdated => CHAT_MEMBER_UPDATED,
            ObjectKind::ChatMember => CHAT_MEMBER,
            ObjectKind::ChatJoinRequest => CHAT_JOIN_REQUEST,
            ObjectKind::ChatInviteLink => CHAT_INVITE_LINK,
            ObjectKind::Venue => VENUE,
            ObjectKind::Audio
            | ObjectKind::Video
            | ObjectKind::VideoNote
            | ObjectKind::Animation
            | ObjectKind::Sticker
            | ObjectKind::File => THUMBNAILED,
            ObjectKind::Game => GAME,
            ObjectKind::SuccessfulPayment => SUCCESSFUL_PAYMENT,
            ObjectKind::User
            | ObjectKind::PhotoSize
            | ObjectKind::ShippingAddress
            | ObjectKind::PollOption
            | ObjectKind::WebAppData
            | ObjectKind::Location
            | ObjectKind::Contact
            | ObjectKind::Voice
            | ObjectKind::Dice
            | ObjectKind::Invoice => &[],
        }
    }
}

// ---------------------------------------------------------------------------
// Relation tables
// ---------------------------------------------------------------------------

const UPDATE: RelationTable = &[
    ("message", One(K::Message)),
    ("edited_message", One(K::EditedMessage)),
    ("channel_post", One(K::Message)),
    ("edited_channel_post", One(K::EditedMessage)),
    ("inline_query", One(K::InlineQuery)),
    ("chosen_inline_result", One(K::ChosenInlineResult)),
    ("callback_query", One(K::CallbackQuery)),
    ("shipping_query", One(K::ShippingQuery)),
    ("pre_checkout_query", One(K::PreCheckoutQuery)),
    ("poll", One(K::Poll)),
    ("poll_answer", One(K::PollAnswer)),
    ("my_chat_member", One(K::ChatMemberUpdated)),
    ("chat_member", One(K::ChatMemberUpdated)),
    ("chat_join_request", One(K::ChatJoinRequest)),
];

const MESSAGE: RelationTable = &[
    ("from", One(K::User)),
    ("sender_chat", One(K::Chat)),
    ("chat", One(K::Chat)),
    ("forward_from", One(K::User)),
    ("forward_from_chat", One(K::Chat)),
    ("reply_to_message", One(K::ReplyToMessage)),
    ("via_bot", One(K::User)),
    ("entities", Many(K::MessageEntity)),
    ("caption_entities", Many(K::MessageEntity)),
    ("audio", One(K::Audio)),
    ("document", One(K::File)),
    ("animation", One(K::Animation)),
    ("game", One(K::Game)),
    ("photo", Many(K::PhotoSize)),
    ("sticker", One(K::Sticker)),
    ("video", One(K::Video)),
    ("voice", One(K::Voice)),
    ("video_note", One(K::VideoNote)),
    ("contact", One(K::Contact)),
    ("dice", One(K::Dice)),
    ("location", One(K::Location)),
    ("venue", One(K::Venue)),
    ("poll", One(K::Poll)),
    ("new_chat_members", Many(K::User)),
    ("left_chat_member", One(K::User)),
    ("new_chat_photo", Many(K::PhotoSize)),
    ("pinned_message", One(K::Message)),
    ("invoice", One(K::Invoice)),
    ("successful_payment", One(K::SuccessfulPayment)),
    ("web_app_data", One(K::WebAppData)),
];

const CHAT: RelationTable = &[("pinned_message", One(K::Message))];

const MESSAGE_ENTITY: RelationTable = &[("user", One(K::User))];

const CALLBACK_QUERY: RelationTable = &[("from", One(K::User)), ("message", One(K::Message))];

const INLINE_QUERY: RelationTable = &[("from", One(K::User)), ("location", One(K::Location))];

const SHIPPING_QUERY: RelationTable = &[
    ("from", One(K::User)),
    ("shipping_address", One(K::ShippingAddress)),
];

const PRE_CHECKOUT_QUERY: RelationTable =
    &[("from", One(K::User)), ("order_info", One(K::OrderInfo))];

const ORDER_INFO: RelationTable = &[("shipping_address", One(K::ShippingAddress))];

const POLL: RelationTable = &[
    ("options", Many(K::PollOption)),
    ("explanation_entities", Many(K::MessageEntity)),
];

const POLL_ANSWER: RelationTable = &[("user", One(K::User)), ("voter_chat", One(K::Chat))];

const CHAT_MEMBER_UPDATED: RelationTable = &[
    ("chat", One(K::Chat)),
    ("from", One(K::User)),
    ("old_chat_member", One(K::ChatMember)),
    ("new_chat_member", One(K::ChatMember)),
    ("invite_link", One(K::ChatInviteLink)),
];

const CHAT_MEMBER: RelationTable = &[("user", One(K::User))];

const CHAT_JOIN_REQUEST: RelationTable = &[
    ("chat", One(K::Chat)),
    ("from", One(K::User)),
    ("invite_link", One(K::ChatInviteLink)),
];

const CHAT_INVITE_LINK: RelationTable = &[("creator", One(K::User))];

const VENUE: RelationTable = &[("location", One(K::Location))];

// `thumb` is the pre-6.6 name of `thumbnail`; older payloads still carry it.
const THUMBNAILED: RelationTable = &[
    ("thumbnail", One(K::PhotoSize)),
    ("thumb", One(K::PhotoSize)),
];

const GAME: RelationTable = &[
    ("photo", Many(K::PhotoSize)),
    ("text_entities", Many(K::MessageEntity)),
    ("animation", One(K::Animation)),
];

const SUCCESSFUL_PAYMENT: RelationTable = &[("order_info", One(K::OrderInfo))];

// ---------------------------------------------------------------------------
// Object
// ---------------------------------------------------------------------------

/// A document tagged with the typed wrapper it represents.
///
/// Dereferences to the underlying [`Document`], so the generic accessors
/// (`get`, `has`, `keys`, ...) are available directly. [`field`] and
/// [`call`] additionally consult the kind's relation table.
///
/// [`field`]: Object::field
/// [`call`]: Object::call
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    kind: ObjectKind,
    document: Document,
}

impl Object {
    pub fn new(kind: ObjectKind, document: Document) -> Self {
        Self { kind, document }
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    pub fn is(&self, kind: ObjectKind) -> bool {
        self.kind == kind
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn relations(&self) -> RelationTable {
        self.kind.relations()
    }

    /// Field access by accessor name, resolving declared relations first.
    pub fn field(&self, accessor: &str) -> Result<Option<Resolved>, DocumentError> {
        relation::resolve_field(&self.document, self.relations(), accessor)
    }

    /// Dynamic accessor call: `getFrom` behaves as `field("from")`.
    pub fn call(&self, method: &str) -> Result<Option<Resolved>, DocumentError> {
        relation::call(&self.document, self.relations(), method)
    }

    /// Resolve `field` through this kind's relation table only.
    ///
    /// Asking for a field the kind does not declare is a configuration
    /// error, even when the field is present in the payload.
    pub fn relation(&self, field: &str) -> Result<Option<Resolved>, DocumentError> {
        relation::resolve_declared(&self.document, self.relations(), field)
    }

    /// The declared relation for `field`, if any.
    pub fn relation_for(&self, field: &str) -> Option<Relation> {
        relation::lookup(self.relations(), field)
    }
}

impl Deref for Object {
    type Target = Document;

    fn deref(&self) -> &Document {
        &self.document
    }
}
