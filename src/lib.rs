//! Typed, lazily-resolved access to Telegram Bot API webhook payloads.
//!
//! Transport, webhook registration and command routing live elsewhere;
//! this crate takes a parsed payload and maps its shape to typed objects.
//! See [`update::Update`] for the entry point and [`events::UpdateEvent`]
//! for pattern-matching on update kinds.

pub mod events;
pub mod types;
pub mod update;

pub use crate::events::UpdateEvent;
pub use crate::update::{Update, UpdateKind, UpdateKinds};
