//! Write bodies for admin resources.
//!
//! Records with attachments arrive as `multipart/form-data` and are
//! forwarded to the backend as multipart; everything else is JSON. Either
//! way the handler can look at individual fields for validation before the
//! body is sent on unchanged.

use axum::{
    Json,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
};
use circuit_bazaar_gateway::{FormPart, MultipartForm, RequestBody};
use serde_json::Value;

use crate::error::AppError;

/// Body of a create or update request.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourcePayload {
    Json(Value),
    Multipart(MultipartForm),
}

impl ResourcePayload {
    /// Field as text: strings as-is, numbers and booleans formatted, nested
    /// JSON serialized. Missing or null fields are `None`.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<String> {
        match self {
            Self::Json(value) => match value.get(name)? {
                Value::Null => None,
                Value::String(text) => Some(text.clone()),
                other => Some(other.to_string()),
            },
            Self::Multipart(form) => form.text_value(name).map(str::to_string),
        }
    }

    /// Whether `name` carries a usable value: non-blank text, a non-empty
    /// array, any other JSON value, or an uploaded file.
    #[must_use]
    pub fn has_value(&self, name: &str) -> bool {
        match self {
            Self::Json(value) => match value.get(name) {
                None | Some(Value::Null) => false,
                Some(Value::String(text)) => !text.trim().is_empty(),
                Some(Value::Array(items)) => !items.is_empty(),
                Some(_) => true,
            },
            Self::Multipart(form) => {
                form.text_value(name).is_some_and(|text| !text.trim().is_empty())
                    || form
                        .fields()
                        .any(|(field, part)| field == name && matches!(part, FormPart::File { .. }))
            }
        }
    }

    /// Raw JSON value of `name`; multipart text is parsed as JSON.
    ///
    /// # Errors
    ///
    /// Returns the parse error when multipart text for `name` is not JSON.
    pub fn json_field(&self, name: &str) -> Result<Option<Value>, serde_json::Error> {
        match self {
            Self::Json(value) => Ok(value.get(name).cloned()),
            Self::Multipart(form) => form
                .text_value(name)
                .map(serde_json::from_str)
                .transpose(),
        }
    }

    #[must_use]
    pub fn into_body(self) -> RequestBody {
        match self {
            Self::Json(value) => RequestBody::Json(value),
            Self::Multipart(form) => RequestBody::Multipart(form),
        }
    }
}

impl<S> FromRequest<S> for ResourcePayload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("multipart/form-data"));

        if !is_multipart {
            let Json(value) = Json::<Value>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            if !value.is_object() {
                return Err(AppError::BadRequest("Expected a JSON object".to_string()));
            }
            return Ok(Self::Json(value));
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        let mut form = MultipartForm::new();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match field.file_name().map(str::to_string) {
                Some(filename) => {
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(e.body_text()))?;
                    if !bytes.is_empty() {
                        form.push_file(name, filename, content_type, bytes.to_vec());
                    }
                }
                None => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.body_text()))?;
                    form.push_text(name, text);
                }
            }
        }

        tracing::debug!(
            fields = form.len(),
            files = form.file_count(),
            "Parsed multipart payload"
        );
        Ok(Self::Multipart(form))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_json_fields() {
        let payload = ResourcePayload::Json(json!({
            "name": "Phones",
            "blank": "  ",
            "price": 12.5,
            "tags": [],
            "parent": null
        }));

        assert_eq!(payload.field("name").as_deref(), Some("Phones"));
        assert_eq!(payload.field("price").as_deref(), Some("12.5"));
        assert_eq!(payload.field("parent"), None);
        assert!(payload.has_value("name"));
        assert!(payload.has_value("price"));
        assert!(!payload.has_value("blank"));
        assert!(!payload.has_value("tags"));
        assert!(!payload.has_value("parent"));
        assert!(!payload.has_value("missing"));
    }

    #[test]
    fn test_multipart_fields() {
        let form = MultipartForm::new()
            .text("title", "Summer sale")
            .text("options", r#"[{"variation_id":"color","option_id":"red"}]"#)
            .file("image", "sale.png", Some("image/png".to_string()), vec![1, 2, 3]);
        let payload = ResourcePayload::Multipart(form);

        assert!(payload.has_value("title"));
        assert!(payload.has_value("image"));
        assert!(!payload.has_value("link"));
        assert!(
            payload
                .json_field("options")
                .is_ok_and(|v| v.is_some_and(|v| v.is_array()))
        );
        assert!(payload.into_body().is_multipart());
    }

    #[test]
    fn test_multipart_json_field_reports_bad_text() {
        let payload = ResourcePayload::Multipart(
            MultipartForm::new().text("options", "color=red,storage=64"),
        );
        assert!(payload.json_field("options").is_err());
        assert!(matches!(payload.json_field("missing"), Ok(None)));
    }
}
