//! Multipart request bodies.
//!
//! Admin writes for records with attachments are sent as `multipart/form-data`.
//! [`MultipartForm`] is an owned, cloneable description of such a body; it is
//! turned into a `reqwest` form only when the request is sent.

use reqwest::multipart::{Form, Part};

/// One field of a multipart body.
#[derive(Clone, PartialEq, Eq)]
pub enum FormPart {
    Text(String),
    File {
        filename: String,
        content_type: Option<String>,
        bytes: Vec<u8>,
    },
}

impl std::fmt::Debug for FormPart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(value) => f.debug_tuple("Text").field(value).finish(),
            Self::File {
                filename,
                content_type,
                bytes,
            } => f
                .debug_struct("File")
                .field("filename", filename)
                .field("content_type", content_type)
                .field("len", &bytes.len())
                .finish(),
        }
    }
}

/// Ordered list of named multipart fields. Repeated names are allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    parts: Vec<(String, FormPart)>,
}

impl MultipartForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push_text(name, value);
        self
    }

    #[must_use]
    pub fn file(
        mut self,
        name: impl Into<String>,
        filename: impl Into<String>,
        content_type: Option<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.push_file(name, filename, content_type, bytes);
        self
    }

    pub fn push_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.parts.push((name.into(), FormPart::Text(value.into())));
    }

    pub fn push_file(
        &mut self,
        name: impl Into<String>,
        filename: impl Into<String>,
        content_type: Option<String>,
        bytes: Vec<u8>,
    ) {
        self.parts.push((
            name.into(),
            FormPart::File {
                filename: filename.into(),
                content_type,
                bytes,
            },
        ));
    }

    /// First text value for `name`.
    #[must_use]
    pub fn text_value(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|(field, part)| match part {
            FormPart::Text(value) if field == name => Some(value.as_str()),
            _ => None,
        })
    }

    /// All text values for `name`, in order.
    pub fn text_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.parts.iter().filter_map(move |(field, part)| match part {
            FormPart::Text(value) if field == name => Some(value.as_str()),
            FormPart::Text(_) | FormPart::File { .. } => None,
        })
    }

    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.parts.iter().any(|(field, _)| field == name)
    }

    #[must_use]
    pub fn file_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|(_, part)| matches!(part, FormPart::File { .. }))
            .count()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FormPart)> {
        self.parts.iter().map(|(name, part)| (name.as_str(), part))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Build the `reqwest` form.
    ///
    /// # Errors
    ///
    /// Returns an error if a file part carries an unparseable content type.
    pub(crate) fn into_reqwest(self) -> Result<Form, reqwest::Error> {
        let mut form = Form::new();
        for (name, part) in self.parts {
            form = match part {
                FormPart::Text(value) => form.text(name, value),
                FormPart::File {
                    filename,
                    content_type,
                    bytes,
                } => {
                    let mut part = Part::bytes(bytes).file_name(filename);
                    if let Some(content_type) = content_type {
                        part = part.mime_str(&content_type)?;
                    }
                    form.part(name, part)
                }
            };
        }
        Ok(form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_lookup() {
        let form = MultipartForm::new()
            .text("name", "Cables")
            .text("tags", "usb")
            .text("tags", "hdmi");

        assert_eq!(form.text_value("name"), Some("Cables"));
        assert_eq!(form.text_values("tags").collect::<Vec<_>>(), vec!["usb", "hdmi"]);
        assert_eq!(form.text_value("missing"), None);
        assert_eq!(form.len(), 3);
    }

    #[test]
    fn test_file_parts_do_not_shadow_text() {
        let form = MultipartForm::new()
            .file("image", "a.png", Some("image/png".to_string()), vec![1, 2, 3])
            .text("name", "Router");

        assert_eq!(form.file_count(), 1);
        assert!(form.has_field("image"));
        assert_eq!(form.text_value("image"), None);
    }

    #[test]
    fn test_debug_hides_bytes() {
        let form = MultipartForm::new().file("image", "a.png", None, vec![0; 1024]);
        let debug = format!("{form:?}");
        assert!(debug.contains("len: 1024"));
    }

    #[test]
    fn test_invalid_mime_is_rejected() {
        let form = MultipartForm::new().file("image", "a.png", Some("not a mime".to_string()), vec![]);
        assert!(form.into_reqwest().is_err());
    }
}
