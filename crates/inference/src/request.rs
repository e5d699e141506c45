//! Typed requests and the raw payload they are normalized from.

use crate::error::{InferenceError, InferenceResult};
use bytes::Bytes;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Framework-neutral view of one request body.
///
/// The HTTP layer fills in whichever shapes the body carried. `json` is only
/// set when the body was declared as JSON and parsed; `raw` is empty for
/// form and multipart bodies.
#[derive(Debug, Clone, Default)]
pub struct RawPayload {
    /// Parsed JSON document.
    pub json: Option<Value>,
    /// Urlencoded fields, or non-file multipart fields.
    pub form: BTreeMap<String, String>,
    /// Multipart fields that carried a filename.
    pub files: BTreeMap<String, Bytes>,
    /// Unparsed body bytes.
    pub raw: Bytes,
}

impl RawPayload {
    /// A JSON body. `raw` holds the serialized document.
    pub fn json(value: Value) -> Self {
        Self {
            raw: Bytes::from(value.to_string()),
            json: Some(value),
            ..Self::default()
        }
    }

    /// An unstructured body.
    pub fn raw(bytes: impl Into<Bytes>) -> Self {
        Self {
            raw: bytes.into(),
            ..Self::default()
        }
    }

    /// Add a form field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.insert(name.into(), value.into());
        self
    }

    /// Add an uploaded file.
    pub fn with_file(mut self, name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        self.files.insert(name.into(), bytes.into());
        self
    }

    /// The JSON body, if it is an object.
    pub fn json_object(&self) -> Option<&Map<String, Value>> {
        self.json.as_ref()?.as_object()
    }
}

/// Text to summarize. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarizeRequest {
    text: String,
}

impl SummarizeRequest {
    pub fn new(text: impl Into<String>) -> InferenceResult<Self> {
        let text = text.into();
        if text.is_empty() {
            return Err(InferenceError::missing_text());
        }
        Ok(Self { text })
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Text to synthesize. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechRequest {
    text: String,
}

impl SpeechRequest {
    pub fn new(text: impl Into<String>) -> InferenceResult<Self> {
        let text = text.into();
        if text.is_empty() {
            return Err(InferenceError::missing_text());
        }
        Ok(Self { text })
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Where the image to caption comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Uploaded bytes, not yet sniffed.
    Bytes(Bytes),
    /// Remote image, fetched by the orchestrator.
    Url(String),
}

/// An image to caption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionRequest {
    pub source: ImageSource,
}
