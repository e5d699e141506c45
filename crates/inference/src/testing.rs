//! In-memory capability doubles for tests.
//!
//! Every double counts its calls so a test can assert whether a provider
//! was reached. None of them touch the network.

use crate::{
    capability::{Backend, Caption, CaptionOutput, Fetch, FetchError, Summarize, Summary, Synthesize},
    image::Image,
    params::SummaryParams,
};
use anyhow::{Result, bail};
use bytes::Bytes;
use std::{
    collections::BTreeMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

/// A 1x1 transparent PNG.
pub const PNG_1X1: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4,
    0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE,
    0x42, 0x60, 0x82,
];

/// MPEG-1 Layer III frame header (128 kbps, 44.1 kHz).
pub const MP3_FRAME_HEADER: [u8; 4] = [0xFF, 0xFB, 0x90, 0x64];

/// Model names starting with this prefix refuse to connect.
pub const UNAVAILABLE_PREFIX: &str = "unavailable/";

/// Backend wiring every role to its double.
pub struct Fakes;

impl Backend for Fakes {
    type Summarizer = FakeSummarizer;
    type Captioner = FakeCaptioner;
    type Synthesizer = FakeSynthesizer;
    type Fetcher = FakeFetcher;
}

/// Shared call counter.
#[derive(Debug, Clone, Default)]
pub struct Calls(Arc<AtomicUsize>);

impl Calls {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Tracks how many calls are in flight and the highest value seen.
#[derive(Debug, Clone, Default)]
pub struct Gauge {
    current: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl Gauge {
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }
}

fn connect(model: &str) -> Result<()> {
    if model.starts_with(UNAVAILABLE_PREFIX) {
        bail!("model {model} is not available");
    }
    Ok(())
}

/// Deterministic summarizer: echoes the leading words of its input.
#[derive(Debug, Clone)]
pub struct FakeSummarizer {
    model: String,
    calls: Calls,
    gauge: Gauge,
    delay: Option<Duration>,
    failure: Option<String>,
}

impl FakeSummarizer {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            calls: Calls::default(),
            gauge: Gauge::default(),
            delay: None,
            failure: None,
        }
    }

    /// Construct like a real provider would, failing for unavailable models.
    pub async fn connect(model: impl Into<String>) -> Result<Self> {
        let model = model.into();
        connect(&model)?;
        Ok(Self::new(model))
    }

    /// Fail every call with `message`.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Hold every call for `delay`.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Calls {
        self.calls.clone()
    }

    pub fn gauge(&self) -> Gauge {
        self.gauge.clone()
    }
}

impl Summarize for FakeSummarizer {
    fn model(&self) -> &str {
        &self.model
    }

    async fn summarize(&self, text: &str, params: &SummaryParams) -> Result<Vec<Summary>> {
        self.calls.hit();
        self.gauge.enter();
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.gauge.leave();

        if let Some(message) = &self.failure {
            bail!("{message}");
        }
        let head = text
            .split_whitespace()
            .take(params.min_length)
            .collect::<Vec<_>>()
            .join(" ");
        Ok(vec![Summary { summary_text: head }])
    }
}

/// Captioner returning canned outputs.
#[derive(Debug, Clone)]
pub struct FakeCaptioner {
    model: String,
    calls: Calls,
    outputs: Vec<CaptionOutput>,
    failure: Option<String>,
}

impl FakeCaptioner {
    /// Captions every image with `"a caption from {model}"`.
    pub fn new(model: impl Into<String>) -> Self {
        let model = model.into();
        let outputs = vec![CaptionOutput {
            generated_text: Some(format!("a caption from {model}")),
            caption: None,
        }];
        Self {
            model,
            calls: Calls::default(),
            outputs,
            failure: None,
        }
    }

    /// Construct like a real provider would, failing for unavailable models.
    pub async fn connect(model: impl Into<String>) -> Result<Self> {
        let model = model.into();
        connect(&model)?;
        Ok(Self::new(model))
    }

    /// Replace the canned outputs.
    pub fn with_outputs(mut self, outputs: Vec<CaptionOutput>) -> Self {
        self.outputs = outputs;
        self
    }

    /// Fail every call with `message`.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    pub fn calls(&self) -> Calls {
        self.calls.clone()
    }
}

impl Caption for FakeCaptioner {
    fn model(&self) -> &str {
        &self.model
    }

    async fn caption(&self, _image: &Image) -> Result<Vec<CaptionOutput>> {
        self.calls.hit();
        if let Some(message) = &self.failure {
            bail!("{message}");
        }
        Ok(self.outputs.clone())
    }
}

/// Configuration shared by every [`FakeSynthesizer`] handle.
#[derive(Debug, Clone, Default)]
pub struct FakeSpeech {
    pub calls: Calls,
    pub built: Calls,
    pub failure: Option<String>,
}

/// Synthesizer producing one silent MP3 frame per call.
#[derive(Debug, Clone)]
pub struct FakeSynthesizer {
    speech: FakeSpeech,
}

impl Synthesize for FakeSynthesizer {
    type Config = FakeSpeech;

    fn new(config: &FakeSpeech) -> Self {
        config.built.hit();
        Self {
            speech: config.clone(),
        }
    }

    fn model(_config: &FakeSpeech) -> &str {
        "fake-voice"
    }

    async fn synthesize(&self, _text: &str) -> Result<Bytes> {
        self.speech.calls.hit();
        if let Some(message) = &self.speech.failure {
            bail!("{message}");
        }
        let mut frame = vec![0u8; 417];
        frame[..4].copy_from_slice(&MP3_FRAME_HEADER);
        Ok(Bytes::from(frame))
    }
}

#[derive(Clone)]
enum Served {
    Body(Bytes),
    Timeout,
    TooLarge,
}

/// Fetcher serving registered URLs from memory. Unknown URLs are 404s.
#[derive(Clone, Default)]
pub struct FakeFetcher {
    routes: BTreeMap<String, Served>,
    calls: Calls,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `bytes` for `url`.
    pub fn serving(mut self, url: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        self.routes.insert(url.into(), Served::Body(bytes.into()));
        self
    }

    /// Time out for `url`.
    pub fn timing_out(mut self, url: impl Into<String>) -> Self {
        self.routes.insert(url.into(), Served::Timeout);
        self
    }

    /// Reject `url` as over the size limit.
    pub fn oversized(mut self, url: impl Into<String>) -> Self {
        self.routes.insert(url.into(), Served::TooLarge);
        self
    }

    pub fn calls(&self) -> Calls {
        self.calls.clone()
    }
}

impl Fetch for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        self.calls.hit();
        match self.routes.get(url) {
            Some(Served::Body(bytes)) => Ok(bytes.clone()),
            Some(Served::Timeout) => Err(FetchError::Timeout {
                url: url.to_owned(),
                timeout: Duration::from_secs(10),
            }),
            Some(Served::TooLarge) => Err(FetchError::TooLarge {
                url: url.to_owned(),
                limit: 16 * 1024 * 1024,
            }),
            None => Err(FetchError::Status {
                url: url.to_owned(),
                status: 404,
            }),
        }
    }
}
