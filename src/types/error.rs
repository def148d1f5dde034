//! Error type shared by document access, relation resolution and envelope
//! parsing.
//!
//! Absent fields are never errors: they resolve to `None` or to the
//! caller's default. Errors are reserved for payloads whose shape
//! contradicts a declared relation, for accessor names that are not
//! `getX` style, and for API responses that report `ok: false`.

use std::{
    error::Error,
    fmt::{Display, Formatter, Result as FmtResult},
};

/// Failure while wrapping or resolving a document.
#[derive(Debug)]
pub struct DocumentError {
    /// Type of error that occurred.
    kind: DocumentErrorType,
    /// Source of the error, if there is any.
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl DocumentError {
    /// The stored payload is not a JSON object.
    pub(crate) const NOT_A_MAPPING: DocumentError = DocumentError {
        kind: DocumentErrorType::NotAMapping,
        source: None,
    };

    /// Immutable reference to the type of error that occurred.
    #[must_use = "retrieving the type has no effect if left unused"]
    pub const fn kind(&self) -> &DocumentErrorType {
        &self.kind
    }

    /// Consume the error, returning the source error if there is any.
    #[must_use = "consuming the error and retrieving the source has no effect if left unused"]
    pub fn into_source(self) -> Option<Box<dyn Error + Send + Sync>> {
        self.source
    }

    /// Consume the error, returning the owned error type and the source error.
    #[must_use = "consuming the error into its parts has no effect if left unused"]
    pub fn into_parts(self) -> (DocumentErrorType, Option<Box<dyn Error + Send + Sync>>) {
        (self.kind, self.source)
    }

    pub(crate) fn configuration(field: impl Into<String>) -> Self {
        Self {
            kind: DocumentErrorType::Configuration {
                field: field.into(),
            },
            source: None,
        }
    }

    pub(crate) fn malformed(field: impl Into<String>, expected: &'static str) -> Self {
        Self {
            kind: DocumentErrorType::MalformedRelation {
                field: field.into(),
                expected,
            },
            source: None,
        }
    }

    pub(crate) fn unsupported(method: impl Into<String>) -> Self {
        Self {
            kind: DocumentErrorType::UnsupportedOperation {
                method: method.into(),
            },
            source: None,
        }
    }

    pub(crate) fn api(description: Option<String>, error_code: Option<i64>) -> Self {
        Self {
            kind: DocumentErrorType::ApiError {
                description,
                error_code,
            },
            source: None,
        }
    }

    pub(crate) fn json(source: serde_json::Error) -> Self {
        Self {
            kind: DocumentErrorType::Json,
            source: Some(Box::new(source)),
        }
    }
}

impl Display for DocumentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match &self.kind {
            DocumentErrorType::NotAMapping => f.write_str("payload is not a json object"),
            DocumentErrorType::Configuration { field } => {
                write!(f, "no relation is declared for field `{field}`")
            }
            DocumentErrorType::MalformedRelation { field, expected } => {
                write!(f, "field `{field}` was expected to be {expected}")
            }
            DocumentErrorType::UnsupportedOperation { method } => {
                write!(f, "`{method}` is not a supported accessor")
            }
            DocumentErrorType::ApiError {
                description,
                error_code,
            } => {
                f.write_str("api responded with ok=false")?;
                if let Some(code) = error_code {
                    write!(f, " ({code})")?;
                }
                if let Some(description) = description {
                    write!(f, ": {description}")?;
                }
                Ok(())
            }
            DocumentErrorType::Json => f.write_str("payload could not be deserialized"),
        }
    }
}

impl Error for DocumentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_ref()
            .map(|source| &**source as &(dyn Error + 'static))
    }
}

impl From<serde_json::Error> for DocumentError {
    fn from(source: serde_json::Error) -> Self {
        Self::json(source)
    }
}

/// Type of [`DocumentError`] that occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DocumentErrorType {
    /// The payload (or the envelope's `result`) is not a JSON object.
    NotAMapping,
    /// A relation was requested for a field the wrapper does not declare.
    ///
    /// This is a programming error rather than a data error.
    Configuration { field: String },
    /// A declared relation met a value of the wrong shape.
    MalformedRelation {
        field: String,
        expected: &'static str,
    },
    /// A dynamic accessor that is not of the `getX` form.
    UnsupportedOperation { method: String },
    /// The API envelope carried `ok: false`.
    ApiError {
        description: Option<String>,
        error_code: Option<i64>,
    },
    /// The payload did not match a serde model.
    Json,
}

#[cfg(test)]
mod tests {
    use super::{DocumentError, DocumentErrorType};
    use std::error::Error;

    #[test]
    fn not_a_mapping_display() {
        let err = DocumentError::NOT_A_MAPPING;
        assert_eq!(err.to_string(), "payload is not a json object");
        assert!(err.source().is_none());
    }

    #[test]
    fn malformed_names_field_and_shape() {
        let err = DocumentError::malformed("entities", "a sequence of objects");
        assert_eq!(
            err.to_string(),
            "field `entities` was expected to be a sequence of objects"
        );
    }

    #[test]
    fn api_error_display_includes_code_and_description() {
        let err = DocumentError::api(Some("Unauthorized".to_string()), Some(401));
        assert_eq!(err.to_string(), "api responded with ok=false (401): Unauthorized");

        let bare = DocumentError::api(None, None);
        assert_eq!(bare.to_string(), "api responded with ok=false");
    }

    #[test]
    fn json_error_keeps_source() {
        let inner = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = DocumentError::from(inner);
        assert!(err.source().is_some());
        let (kind, source) = err.into_parts();
        assert_eq!(kind, DocumentErrorType::Json);
        assert!(source.is_some());
    }
}
