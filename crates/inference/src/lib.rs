//! Inference core for the hfgate gateway.
//!
//! Heterogeneous request payloads are normalized into typed requests
//! (`normalize`), summary lengths are derived from the input size
//! (`SummaryParams`), capability providers are resolved once at startup
//! through a fallback chain (`Registry`), and every provider call goes
//! through the `Orchestrator`, which reports failures with the closed
//! `InferenceError` taxonomy.

pub use capability::{
    Backend, Caption, CaptionOutput, Fetch, FetchError, Summarize, Summary, Synthesize,
};
pub use error::{ErrorBody, ErrorKind, InferenceError, InferenceResult, Operation};
pub use image::Image;
pub use orchestrator::{CaptionOutcome, Orchestrator, SummaryMeta, SummaryOutcome};
pub use params::{SummaryParams, word_count};
pub use registry::{ProviderInfo, Registry, Role, Slot, resolve_chain};
pub use request::{CaptionRequest, ImageSource, RawPayload, SpeechRequest, SummarizeRequest};

mod capability;
mod error;
mod image;
pub mod normalize;
mod orchestrator;
mod params;
mod registry;
mod request;
pub mod testing;
