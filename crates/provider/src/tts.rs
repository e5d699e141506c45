//! Text-to-speech through the Google Translate voice endpoint.
//!
//! The endpoint only accepts short inputs, so text is split into chunks of
//! at most [`CHUNK_CHARS`] characters and the returned MP3 segments are
//! concatenated. MP3 frames are self-delimiting, so the result plays as one
//! stream.

use crate::config::SpeechConfig;
use anyhow::{Context, Result, bail};
use bytes::{Bytes, BytesMut};
use compact_str::CompactString;
use inference::Synthesize;
use reqwest::Client;

/// Longest text sent in one request, in characters.
pub const CHUNK_CHARS: usize = 100;

/// Everything a [`TranslateTts`] handle is built from.
#[derive(Debug, Clone)]
pub struct TtsConfig {
    client: Client,
    endpoint: String,
    lang: CompactString,
}

impl TtsConfig {
    pub fn new(client: Client, config: &SpeechConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint.clone(),
            lang: config.lang.clone(),
        }
    }
}

/// One synthesis handle.
pub struct TranslateTts {
    config: TtsConfig,
}

impl TranslateTts {
    async fn segment(&self, chunk: &str, idx: usize, total: usize) -> Result<Bytes> {
        let idx = idx.to_string();
        let total = total.to_string();
        let textlen = chunk.chars().count().to_string();
        let response = self
            .config
            .client
            .get(&self.config.endpoint)
            .query(&[
                ("ie", "UTF-8"),
                ("q", chunk),
                ("tl", self.config.lang.as_str()),
                ("client", "tw-ob"),
                ("idx", idx.as_str()),
                ("total", total.as_str()),
                ("textlen", textlen.as_str()),
            ])
            .send()
            .await
            .context("calling speech endpoint")?;

        let status = response.status();
        if !status.is_success() {
            bail!("speech endpoint returned {status}");
        }
        response.bytes().await.context("reading speech audio")
    }
}

impl Synthesize for TranslateTts {
    type Config = TtsConfig;

    fn new(config: &TtsConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    fn model(_config: &TtsConfig) -> &str {
        "google-translate-tts"
    }

    async fn synthesize(&self, text: &str) -> Result<Bytes> {
        let chunks = chunk_text(text, CHUNK_CHARS);
        if chunks.is_empty() {
            bail!("no speakable text");
        }

        let mut audio = BytesMut::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            let segment = self
                .segment(chunk, idx, chunks.len())
                .await
                .with_context(|| format!("segment {} of {}", idx + 1, chunks.len()))?;
            audio.extend_from_slice(&segment);
        }
        Ok(audio.freeze())
    }
}

/// Split `text` into whitespace-joined chunks of at most `limit` characters.
///
/// Words longer than `limit` are split on character boundaries.
pub fn chunk_text(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0;

    for word in text.split_whitespace() {
        let mut word = word;
        while word.chars().count() > limit {
            if current_chars > 0 {
                chunks.push(std::mem::take(&mut current));
                current_chars = 0;
            }
            let split = word
                .char_indices()
                .nth(limit)
                .map_or(word.len(), |(index, _)| index);
            chunks.push(word[..split].to_owned());
            word = &word[split..];
        }
        if word.is_empty() {
            continue;
        }

        let chars = word.chars().count();
        if current_chars > 0 && current_chars + 1 + chars > limit {
            chunks.push(std::mem::take(&mut current));
            current_chars = 0;
        }
        if current_chars > 0 {
            current.push(' ');
            current_chars += 1;
        }
        current.push_str(word);
        current_chars += chars;
    }

    if current_chars > 0 {
        chunks.push(current);
    }
    chunks
}
