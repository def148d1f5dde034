//! The `{ok, result}` envelope around Bot API responses.
//!
//! Webhook payloads arrive bare, while responses to API calls such as
//! `getUpdates` arrive wrapped. [`Document::new`] unwraps and forgets the
//! envelope; [`ApiResponse`] keeps `ok` and the error details.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{document::Document, error::DocumentError, options::ResolveOptions};
use crate::update::Update;

/// Replace an enveloped payload by its `result`; leave bare payloads alone.
pub(crate) fn unwrap_result(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("result") => {
            map.remove("result").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// A Bot API response envelope.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ApiResponse {
    #[serde(default = "default_ok")]
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<i64>,
}

fn default_ok() -> bool {
    true
}

impl ApiResponse {
    /// Read an envelope, treating a payload without `ok` or `result` as a
    /// successful bare result.
    pub fn parse(value: Value) -> Result<Self, DocumentError> {
        let enveloped = value
            .as_object()
            .is_some_and(|map| map.contains_key("ok") || map.contains_key("result"));

        if enveloped {
            return Ok(serde_json::from_value(value)?);
        }

        Ok(Self {
            ok: true,
            result: Some(value),
            description: None,
            error_code: None,
        })
    }

    /// Parse an envelope from JSON text.
    pub fn from_json(text: &str) -> Result<Self, DocumentError> {
        Self::parse(serde_json::from_str(text)?)
    }

    /// The result, or an [`ApiError`] if `ok` is false.
    ///
    /// [`ApiError`]: crate::types::DocumentErrorType::ApiError
    pub fn into_result(self) -> Result<Value, DocumentError> {
        if !self.ok {
            return Err(DocumentError::api(self.description, self.error_code));
        }
        Ok(self.result.unwrap_or(Value::Null))
    }

    /// The result as a single document.
    pub fn document(self) -> Result<Document, DocumentError> {
        match self.into_result()? {
            Value::Object(map) => Ok(Document::from_map(map)),
            _ => Err(DocumentError::NOT_A_MAPPING),
        }
    }

    /// Every object in a sequence result, in order.
    ///
    /// A single object result yields one document.
    pub fn documents(self) -> Result<Vec<Document>, DocumentError> {
        match self.into_result()? {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(map) => Ok(Document::from_map(map)),
                    _ => Err(DocumentError::NOT_A_MAPPING),
                })
                .collect(),
            Value::Object(map) => Ok(vec![Document::from_map(map)]),
            _ => Err(DocumentError::NOT_A_MAPPING),
        }
    }

    /// The result of a `getUpdates` call.
    pub fn updates(self, options: ResolveOptions) -> Result<Vec<Update>, DocumentError> {
        Ok(self
            .documents()?
            .into_iter()
            .map(|document| Update::from_document(document.with_options(options)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DocumentErrorType;
    use crate::update::UpdateKind;
    use serde_json::json;

    #[test]
    fn unwrap_result_only_touches_envelopes() {
        assert_eq!(unwrap_result(json!({"ok": true, "result": 5})), json!(5));
        assert_eq!(unwrap_result(json!({"update_id": 1})), json!({"update_id": 1}));
        assert_eq!(unwrap_result(json!([1])), json!([1]));
    }

    #[test]
    fn bare_payload_counts_as_ok() {
        let response = ApiResponse::parse(json!({"update_id": 1, "poll": {}})).unwrap();
        assert!(response.ok);
        assert_eq!(response.document().unwrap().len(), 2);
    }

    #[test]
    fn failed_response_is_an_error() {
        let response = ApiResponse::from_json(
            r#"{"ok":false,"error_code":409,"description":"Conflict: terminated by other getUpdates request"}"#,
        )
        .unwrap();
        assert!(!response.ok);

        let err = response.into_result().unwrap_err();
        assert!(matches!(
            err.kind(),
            DocumentErrorType::ApiError {
                error_code: Some(409),
                ..
            }
        ));
    }

    #[test]
    fn get_updates_result() {
        let response = ApiResponse::parse(json!({
            "ok": true,
            "result": [
                {"update_id": 1, "message": {"message_id": 1, "chat": {"id": 1}}},
                {"update_id": 2, "poll": {"id": "p"}}
            ]
        }))
        .unwrap();

        let updates = response.updates(ResolveOptions::default()).unwrap();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].classify(), Some(&UpdateKind::Message));
        assert_eq!(updates[1].classify(), Some(&UpdateKind::Poll));
    }

    #[test]
    fn sequence_with_scalars_is_rejected() {
        let response = ApiResponse::parse(json!({"ok": true, "result": [1]})).unwrap();
        assert_eq!(
            response.documents().unwrap_err().kind(),
            &DocumentErrorType::NotAMapping
        );
    }

    #[test]
    fn malformed_envelope_reports_json_error() {
        let err = ApiResponse::parse(json!({"ok": "yes"})).unwrap_err();
        assert_eq!(err.kind(), &DocumentErrorType::Json);
    }

    #[test]
    fn serializes_without_empty_fields() {
        let response = ApiResponse::parse(json!({"ok": true, "result": true})).unwrap();
        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            r#"{"ok":true,"result":true}"#
        );
    }
}
