//! Input normalization.
//!
//! Each request shape is read through an ordered list of extraction
//! strategies. A strategy either yields a value or defers to the next one;
//! when every strategy defers, normalization fails with `MissingInput`.

use crate::{
    error::{InferenceError, InferenceResult},
    request::{CaptionRequest, ImageSource, RawPayload, SpeechRequest, SummarizeRequest},
};

/// A named extraction step.
pub type Strategy<T> = (&'static str, fn(&RawPayload) -> Option<T>);

/// Text strategies, in priority order.
pub const TEXT_STRATEGIES: &[Strategy<String>] =
    &[("json", json_text), ("form", form_text), ("raw", raw_text)];

/// Image strategies, in priority order. An upload always beats a URL.
pub const IMAGE_STRATEGIES: &[Strategy<ImageSource>] = &[
    ("upload", uploaded_image),
    ("json", json_url),
    ("form", form_url),
];

/// Normalize a `/summarize` payload.
pub fn summarize_request(payload: &RawPayload) -> InferenceResult<SummarizeRequest> {
    let text = extract_text(payload).ok_or_else(InferenceError::missing_text)?;
    SummarizeRequest::new(text)
}

/// Normalize a `/tts` payload.
pub fn speech_request(payload: &RawPayload) -> InferenceResult<SpeechRequest> {
    let text = extract_text(payload).ok_or_else(InferenceError::missing_text)?;
    SpeechRequest::new(text)
}

/// Normalize a `/caption` payload.
pub fn caption_request(payload: &RawPayload) -> InferenceResult<CaptionRequest> {
    let source = first_match(IMAGE_STRATEGIES, payload).ok_or_else(InferenceError::missing_image)?;
    Ok(CaptionRequest { source })
}

/// Run the text strategies and return the first non-empty text.
pub fn extract_text(payload: &RawPayload) -> Option<String> {
    first_match(TEXT_STRATEGIES, payload)
}

/// Decode UTF-8, dropping invalid byte sequences instead of replacing them.
pub fn lossy_utf8(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}

fn first_match<T>(strategies: &[Strategy<T>], payload: &RawPayload) -> Option<T> {
    strategies.iter().find_map(|(name, strategy)| {
        let value = strategy(payload)?;
        tracing::debug!(strategy = name, "input extracted");
        Some(value)
    })
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_owned())
}

fn json_text(payload: &RawPayload) -> Option<String> {
    non_empty(payload.json_object()?.get("text")?.as_str()?)
}

fn form_text(payload: &RawPayload) -> Option<String> {
    non_empty(payload.form.get("text")?)
}

// A JSON object body is a structured document, never free text.
fn raw_text(payload: &RawPayload) -> Option<String> {
    if payload.json_object().is_some() {
        return None;
    }
    non_empty(&lossy_utf8(&payload.raw))
}

fn uploaded_image(payload: &RawPayload) -> Option<ImageSource> {
    payload.files.get("image").cloned().map(ImageSource::Bytes)
}

fn json_url(payload: &RawPayload) -> Option<ImageSource> {
    non_empty(payload.json_object()?.get("url")?.as_str()?).map(ImageSource::Url)
}

fn form_url(payload: &RawPayload) -> Option<ImageSource> {
    non_empty(payload.form.get("url")?).map(ImageSource::Url)
}
