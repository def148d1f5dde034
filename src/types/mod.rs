//! Bot API object model.
//!
//! Payloads stay in their JSON form. A [`Document`] wraps one JSON object
//! and offers generic access; an [`Object`] is a document tagged with the
//! [`ObjectKind`] it represents, whose static relation table decides which
//! nested fields become typed objects. Field access returns a [`Resolved`]
//! value that callers pattern-match on.
//!
//! ```ignore
//! let update = Update::new(payload)?;
//! if let Some(Resolved::Single(message)) = update.related_object()? {
//!     if let Some(Resolved::Single(from)) = message.field("from")? {
//!         println!("{:?}", from.full_name());
//!     }
//! }
//! ```

/// The generic document wrapper.
pub mod document;

/// The `{ok, result}` response envelope.
pub mod envelope;

/// Errors raised while wrapping or resolving.
pub mod error;

/// Helper traits for messages and users.
pub mod ext;

/// Typed wrapper kinds and their relation tables.
pub mod object;

/// Shape and call policies.
pub mod options;

/// Relation resolution and resolved values.
pub mod relation;

/// Name translation and small JSON helpers.
pub mod util;


// ===========================================================================
// Convenience re-exports
// ===========================================================================
// The rest of the codebase does `use crate::types::*`.

pub use self::document::Document;
pub use self::envelope::ApiResponse;
pub use self::error::{DocumentError, DocumentErrorType};
pub use self::ext::{Command, MessageExt, UserExt, MESSAGE_TYPES};
pub use self::object::{Object, ObjectKind};
pub use self::options::{CallPolicy, ResolveOptions, ShapePolicy};
pub use self::relation::{Collection, Relation, RelationTable, Resolved};
