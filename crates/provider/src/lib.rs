//! Provider crate: hosted-inference implementations of the capability
//! traits, their configuration, and registry construction.
//!
//! `Hub` is the production backend. `build_registry` resolves every role
//! once at startup; the captioner walks its configured candidates until one
//! passes the availability probe.

pub mod config;
mod captioner;
mod fetch;
mod http;
mod summarizer;
pub mod tts;

pub use {
    captioner::HubCaptioner,
    config::ModelsConfig,
    fetch::HttpFetcher,
    http::HubClient,
    summarizer::HubSummarizer,
    tts::{TranslateTts, TtsConfig},
};

use anyhow::{Context, Result};
use inference::{Backend, Registry, Role, resolve_chain};
use reqwest::Client;

const USER_AGENT: &str = concat!("hfgate/", env!("CARGO_PKG_VERSION"));

/// Backend wiring every role to its hosted provider.
pub struct Hub;

impl Backend for Hub {
    type Summarizer = HubSummarizer;
    type Captioner = HubCaptioner;
    type Synthesizer = TranslateTts;
    type Fetcher = HttpFetcher;
}

/// Resolve every role and build the process-wide registry.
///
/// Fails with an [`inference::InferenceError::InitializationFatal`] when a
/// role has no available candidate.
pub async fn build_registry(config: &ModelsConfig) -> Result<Registry<Hub>> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(config.hub.connect_timeout())
        .build()
        .context("building http client")?;
    let hub = HubClient::new(client.clone(), &config.hub)?;

    let summarizer = resolve_chain(
        Role::Summarizer,
        std::slice::from_ref(&config.summarizer.model),
        |model| HubSummarizer::connect(hub.clone(), model),
    )
    .await?
    .with_concurrency(config.summarizer.concurrency);

    let captioner = resolve_chain(Role::Captioner, &config.captioner.models, |model| {
        HubCaptioner::connect(hub.clone(), model)
    })
    .await?
    .with_concurrency(config.captioner.concurrency);

    let speech = TtsConfig::new(client.clone(), &config.speech);
    let fetcher =
        HttpFetcher::new(client, config.fetch.timeout()).with_max_bytes(config.fetch.max_bytes);
    Ok(Registry::new(summarizer, captioner, speech, fetcher))
}
