use crate::http::HubClient;
use anyhow::Result;
use compact_str::CompactString;
use inference::{Caption, CaptionOutput, Image};
use serde::Deserialize;

/// Hosted image-to-text model.
#[derive(Clone)]
pub struct HubCaptioner {
    hub: HubClient,
    model: CompactString,
}

impl HubCaptioner {
    /// Probe `model` and build the provider.
    pub async fn connect(hub: HubClient, model: CompactString) -> Result<Self> {
        hub.probe(&model).await?;
        Ok(Self { hub, model })
    }
}

// Some deployments answer with a bare object instead of a list.
#[derive(Deserialize)]
#[serde(untagged)]
enum Outputs {
    Many(Vec<CaptionOutput>),
    One(CaptionOutput),
}

impl Caption for HubCaptioner {
    fn model(&self) -> &str {
        &self.model
    }

    async fn caption(&self, image: &Image) -> Result<Vec<CaptionOutput>> {
        let outputs = self
            .hub
            .send_bytes(&self.model, image.bytes().clone(), image.mime())
            .await?;
        Ok(match outputs {
            Outputs::Many(outputs) => outputs,
            Outputs::One(output) => vec![output],
        })
    }
}
