//! Translation between accessor names (`replyToMessage`) and Bot API wire
//! names (`reply_to_message`).
//!
//! The mapping is deterministic in both directions. For every wire name
//! built from lowercase ASCII letters, digits and underscores,
//! `to_snake_case(&to_camel_case(name)) == name`: an underscore is only
//! folded into the next character when that character is a lowercase
//! letter, so names such as `photo_200` or `a__b` survive unchanged.

/// Convert a camelCase accessor into its snake_case wire name.
///
/// Names that are already snake_case pass through untouched.
pub fn to_snake_case(accessor: &str) -> String {
    let mut out = String::with_capacity(accessor.len() + 4);
    for (i, c) in accessor.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Convert a snake_case wire name into its camelCase accessor.
pub fn to_camel_case(wire: &str) -> String {
    let mut out = String::with_capacity(wire.len());
    let mut chars = wire.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('_', Some(next)) if next.is_ascii_lowercase() && !out.is_empty() => {
                let upper = next.to_ascii_uppercase();
                chars.next();
                out.push(upper);
            }
            _ => out.push(c),
        }
    }
    out
}

/// Strip a `get` prefix from a dynamic accessor method name.
///
/// `getReplyToMessage` becomes `Some("ReplyToMessage")`; anything that does
/// not start with `get` followed by an uppercase letter is `None`.
pub fn strip_getter(method: &str) -> Option<&str> {
    let rest = method.strip_prefix("get")?;
    rest.chars()
        .next()
        .filter(char::is_ascii_uppercase)
        .map(|_| rest)
}
