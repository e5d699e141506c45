use crate::http::HubClient;
use anyhow::Result;
use compact_str::CompactString;
use inference::{Summarize, Summary, SummaryParams};
use serde::Serialize;

/// Hosted summarization model.
#[derive(Clone)]
pub struct HubSummarizer {
    hub: HubClient,
    model: CompactString,
}

impl HubSummarizer {
    /// Probe `model` and build the provider.
    pub async fn connect(hub: HubClient, model: CompactString) -> Result<Self> {
        hub.probe(&model).await?;
        Ok(Self { hub, model })
    }
}

#[derive(Serialize)]
struct Request<'a> {
    inputs: &'a str,
    parameters: Parameters,
}

#[derive(Serialize)]
struct Parameters {
    max_length: usize,
    min_length: usize,
    do_sample: bool,
}

impl Summarize for HubSummarizer {
    fn model(&self) -> &str {
        &self.model
    }

    async fn summarize(&self, text: &str, params: &SummaryParams) -> Result<Vec<Summary>> {
        let request = Request {
            inputs: text,
            parameters: Parameters {
                max_length: params.max_length,
                min_length: params.min_length,
                do_sample: false,
            },
        };
        self.hub.send_json(&self.model, &request).await
    }
}
