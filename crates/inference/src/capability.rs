//! Capability provider contracts.
//!
//! One trait per role. A [`Backend`] is a type-level hook naming the
//! concrete provider for every role, so the registry and orchestrator are
//! monomorphized over it and tests can swap in doubles.

use crate::{image::Image, params::SummaryParams};
use anyhow::Result;
use bytes::Bytes;
use serde::Deserialize;
use std::time::Duration;

/// Type-level wiring of one provider implementation per role.
pub trait Backend: Send + Sync + 'static {
    type Summarizer: Summarize;
    type Captioner: Caption;
    type Synthesizer: Synthesize;
    type Fetcher: Fetch;
}

/// Text summarization.
pub trait Summarize: Send + Sync + 'static {
    /// Model identifier.
    fn model(&self) -> &str;

    /// Summarize `text` within the given bounds, without sampling.
    fn summarize(
        &self,
        text: &str,
        params: &SummaryParams,
    ) -> impl Future<Output = Result<Vec<Summary>>> + Send;
}

/// One summarization output item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Summary {
    #[serde(default)]
    pub summary_text: String,
}

/// Image captioning.
pub trait Caption: Send + Sync + 'static {
    /// Model identifier.
    fn model(&self) -> &str;

    /// Caption a decoded image.
    fn caption(&self, image: &Image) -> impl Future<Output = Result<Vec<CaptionOutput>>> + Send;
}

/// One captioning output item. Models disagree on the field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CaptionOutput {
    #[serde(default)]
    pub generated_text: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
}

impl CaptionOutput {
    /// `generated_text`, else `caption`. Empty strings count as absent.
    pub fn text(&self) -> Option<&str> {
        [&self.generated_text, &self.caption]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|text| !text.is_empty())
    }
}

/// Speech synthesis. Handles are cheap and built per call from `Config`.
pub trait Synthesize: Send + Sync + Sized {
    /// Everything needed to build a handle.
    type Config: Clone + Send + Sync + 'static;

    /// Build a handle.
    fn new(config: &Self::Config) -> Self;

    /// Voice or engine identifier, known without building a handle.
    fn model(config: &Self::Config) -> &str;

    /// Synthesize `text` to MP3 bytes.
    fn synthesize(&self, text: &str) -> impl Future<Output = Result<Bytes>> + Send;
}

/// Remote image retrieval.
pub trait Fetch: Send + Sync + 'static {
    /// Fetch `url` into memory. Implementations must bound the call with a
    /// timeout and the body with a size limit.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Bytes, FetchError>> + Send;
}

/// Why a fetch failed.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("fetching {url} timed out after {}s", .timeout.as_secs())]
    Timeout { url: String, timeout: Duration },
    #[error("fetching {url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("fetching {url} exceeds the {limit} byte limit")]
    TooLarge { url: String, limit: u64 },
    #[error("fetching {url} failed: {reason}")]
    Transport { url: String, reason: String },
}
