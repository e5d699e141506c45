//! Inference orchestration.
//!
//! The orchestrator is the only place provider failures are translated:
//! everything it returns is either a success payload or an
//! [`InferenceError`].

use crate::{
    capability::{Backend, Caption, CaptionOutput, Fetch, Summarize, Synthesize},
    error::{InferenceError, InferenceResult, Operation},
    image::Image,
    params::SummaryParams,
    registry::Registry,
    request::{CaptionRequest, ImageSource, SpeechRequest, SummarizeRequest},
};
use bytes::Bytes;
use serde::Serialize;
use std::{path::Path, sync::Arc};

/// Successful summarization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryOutcome {
    pub summary: String,
    pub meta: SummaryMeta,
}

/// The derived parameters a summary was produced with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SummaryMeta {
    pub input_words: usize,
    pub max_length: usize,
    pub min_length: usize,
}

impl From<SummaryParams> for SummaryMeta {
    fn from(params: SummaryParams) -> Self {
        Self {
            input_words: params.word_count,
            max_length: params.max_length,
            min_length: params.min_length,
        }
    }
}

/// Successful captioning. The caption may be empty when the provider
/// returned no recognizable field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaptionOutcome {
    pub caption: String,
}

/// Coordinates normalized requests with the resolved providers.
pub struct Orchestrator<B: Backend> {
    registry: Arc<Registry<B>>,
}

impl<B: Backend> Clone for Orchestrator<B> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<B: Backend> Orchestrator<B> {
    pub fn new(registry: Registry<B>) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn registry(&self) -> &Registry<B> {
        &self.registry
    }

    /// Summarize with length bounds derived from the input size.
    pub async fn summarize(&self, request: &SummarizeRequest) -> InferenceResult<SummaryOutcome> {
        let params = SummaryParams::for_text(request.text());
        let slot = self.registry.summarizer();
        tracing::debug!(
            model = slot.model(),
            words = params.word_count,
            max_length = params.max_length,
            min_length = params.min_length,
            "summarizing"
        );

        let _permit = slot.acquire().await;
        let summaries = slot
            .get()
            .summarize(request.text(), &params)
            .await
            .map_err(|e| InferenceError::failed(Operation::Summarization, e))?;
        let summary = summaries
            .into_iter()
            .next()
            .ok_or_else(|| {
                InferenceError::failed(Operation::Summarization, "summarizer returned no summaries")
            })?
            .summary_text;

        Ok(SummaryOutcome {
            summary,
            meta: params.into(),
        })
    }

    /// Caption an uploaded or remote image.
    pub async fn caption(&self, request: CaptionRequest) -> InferenceResult<CaptionOutcome> {
        let bytes = match request.source {
            ImageSource::Bytes(bytes) => bytes,
            ImageSource::Url(url) => {
                tracing::debug!(%url, "fetching image");
                self.registry
                    .fetcher()
                    .fetch(&url)
                    .await
                    .map_err(|e| InferenceError::failed(Operation::Captioning, e))?
            }
        };
        self.caption_bytes(bytes).await
    }

    /// Caption an image file on the local filesystem.
    pub async fn caption_path(&self, path: impl AsRef<Path>) -> InferenceResult<CaptionOutcome> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            InferenceError::failed(
                Operation::Captioning,
                format!("cannot read {}: {e}", path.display()),
            )
        })?;
        self.caption_bytes(Bytes::from(bytes)).await
    }

    async fn caption_bytes(&self, bytes: Bytes) -> InferenceResult<CaptionOutcome> {
        let image =
            Image::decode(bytes).map_err(|e| InferenceError::failed(Operation::Captioning, e))?;
        let slot = self.registry.captioner();
        tracing::debug!(model = slot.model(), mime = image.mime(), "captioning");

        let _permit = slot.acquire().await;
        let outputs = slot
            .get()
            .caption(&image)
            .await
            .map_err(|e| InferenceError::failed(Operation::Captioning, e))?;

        // Intentionally lenient: an unrecognized output shape is an empty caption.
        let caption = outputs
            .first()
            .and_then(CaptionOutput::text)
            .unwrap_or_default()
            .to_owned();
        if caption.is_empty() {
            tracing::warn!(model = slot.model(), "captioner returned no caption field");
        }
        Ok(CaptionOutcome { caption })
    }

    /// Synthesize MP3 audio.
    pub async fn speak(&self, request: &SpeechRequest) -> InferenceResult<Bytes> {
        let synthesizer = self.registry.synthesizer();
        tracing::debug!(
            model = self.registry.speech_model(),
            chars = request.text().chars().count(),
            "synthesizing"
        );
        let audio = synthesizer
            .synthesize(request.text())
            .await
            .map_err(|e| InferenceError::failed(Operation::Speech, e))?;
        if audio.is_empty() {
            return Err(InferenceError::failed(
                Operation::Speech,
                "synthesizer returned no audio",
            ));
        }
        Ok(audio)
    }
}
