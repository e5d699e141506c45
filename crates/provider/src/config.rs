//! Provider configuration
//!
//! Every section has defaults matching the public Hugging Face endpoints, so
//! an empty config resolves the stock models.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default hosted inference endpoint.
pub const DEFAULT_INFERENCE_URL: &str = "https://api-inference.huggingface.co/models";
/// Default hub API root, used to probe model availability.
pub const DEFAULT_HUB_URL: &str = "https://huggingface.co";
/// Default cap on fetched image bodies, the same as the upload limit.
pub const DEFAULT_FETCH_MAX_BYTES: u64 = 16 * 1024 * 1024;
/// Default speech endpoint.
pub const DEFAULT_SPEECH_ENDPOINT: &str = "https://translate.google.com/translate_tts";

/// All provider settings, one section per role.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    pub hub: HubConfig,
    pub summarizer: SummarizerConfig,
    pub captioner: CaptionerConfig,
    pub speech: SpeechConfig,
    pub fetch: FetchConfig,
}

/// Hosted inference endpoint shared by the summarizer and captioner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Bearer token. Empty means anonymous.
    pub api_key: String,
    /// Models are served at `{inference_url}/{model}`.
    pub inference_url: String,
    /// Models are probed at `{hub_url}/api/models/{model}`.
    pub hub_url: String,
    /// Probe each candidate at startup. When off, every well-formed
    /// candidate counts as available.
    pub probe: bool,
    /// TCP connect timeout for every outbound call.
    pub connect_timeout_secs: u64,
    /// Whole-request timeout of one availability probe. A probe that runs
    /// out of time marks the candidate unavailable.
    pub probe_timeout_secs: u64,
}

impl HubConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            inference_url: DEFAULT_INFERENCE_URL.to_owned(),
            hub_url: DEFAULT_HUB_URL.to_owned(),
            probe: true,
            connect_timeout_secs: 10,
            probe_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    pub model: CompactString,
    /// Maximum concurrent calls. Unbounded when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            model: CompactString::const_new("facebook/bart-large-cnn"),
            concurrency: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionerConfig {
    /// Candidates in fallback order.
    pub models: Vec<CompactString>,
    /// Maximum concurrent calls. Unbounded when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,
}

impl Default for CaptionerConfig {
    fn default() -> Self {
        Self {
            models: vec![
                CompactString::const_new("nlpconnect/vit-gpt2-image-captioning"),
                CompactString::const_new("Salesforce/blip-image-captioning-base"),
            ],
            concurrency: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub endpoint: String,
    /// Voice language, e.g. `en`.
    pub lang: CompactString,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SPEECH_ENDPOINT.to_owned(),
            lang: CompactString::const_new("en"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Whole-request timeout for image URLs.
    pub timeout_secs: u64,
    /// Largest accepted image body, in bytes.
    pub max_bytes: u64,
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_bytes: DEFAULT_FETCH_MAX_BYTES,
        }
    }
}
