//! Capability registry and startup fallback resolution.
//!
//! Providers are resolved once, before the gateway serves anything, and
//! are then shared read-only by every request. A role with several
//! candidates walks them in order:
//!
//! ```text
//! Unresolved -> Trying(0) -> Trying(1) -> ... -> Fatal
//!                   \            \
//!                    `-> Resolved `-> Resolved
//! ```
//!
//! Whichever candidate resolves stays active for the process lifetime.

use crate::{
    capability::{Backend, Synthesize},
    error::{InferenceError, InferenceResult},
};
use compact_str::CompactString;
use serde::Serialize;
use std::fmt;
use tokio::sync::{Semaphore, SemaphorePermit};

/// Logical capability role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Summarizer,
    Captioner,
    SpeechSynthesizer,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Summarizer => "summarizer",
            Self::Captioner => "captioner",
            Self::SpeechSynthesizer => "speech-synthesizer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved provider together with the candidate that produced it.
///
/// The optional semaphore bounds concurrent calls into this role only;
/// other roles are never blocked by it.
pub struct Slot<T> {
    provider: T,
    model: CompactString,
    candidate: usize,
    permits: Option<Semaphore>,
}

impl<T> Slot<T> {
    /// Wrap a provider resolved from the first candidate.
    pub fn new(provider: T, model: impl Into<CompactString>) -> Self {
        Self {
            provider,
            model: model.into(),
            candidate: 0,
            permits: None,
        }
    }

    /// Bound concurrent calls. `None` or zero leaves the role unbounded.
    pub fn with_concurrency(mut self, limit: Option<usize>) -> Self {
        self.permits = limit.filter(|n| *n > 0).map(Semaphore::new);
        self
    }

    pub fn get(&self) -> &T {
        &self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Position of the resolved candidate in its chain.
    pub fn candidate(&self) -> usize {
        self.candidate
    }

    /// Wait for a call permit. Unbounded roles return `None` immediately.
    pub async fn acquire(&self) -> Option<SemaphorePermit<'_>> {
        self.permits.as_ref()?.acquire().await.ok()
    }
}

impl<T> fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot")
            .field("model", &self.model)
            .field("candidate", &self.candidate)
            .field("bounded", &self.permits.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChainState {
    Unresolved,
    Trying(usize),
    Fatal,
}

impl ChainState {
    fn advance(self, candidates: usize) -> Self {
        match self {
            Self::Unresolved if candidates > 0 => Self::Trying(0),
            Self::Trying(index) if index + 1 < candidates => Self::Trying(index + 1),
            _ => Self::Fatal,
        }
    }
}

/// Resolve a role by connecting to each candidate in order.
///
/// The first candidate that connects wins. Each failure is logged and the
/// next candidate is tried; once the list is exhausted the role is
/// `InitializationFatal`.
pub async fn resolve_chain<T, F, Fut>(
    role: Role,
    candidates: &[CompactString],
    mut connect: F,
) -> InferenceResult<Slot<T>>
where
    F: FnMut(CompactString) -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let mut failures = Vec::new();
    let mut state = ChainState::Unresolved.advance(candidates.len());
    while let ChainState::Trying(index) = state {
        let model = &candidates[index];
        match connect(model.clone()).await {
            Ok(provider) => {
                tracing::info!(%role, %model, candidate = index, "provider resolved");
                let mut slot = Slot::new(provider, model.clone());
                slot.candidate = index;
                return Ok(slot);
            }
            Err(e) => {
                tracing::warn!(%role, %model, "candidate failed to initialize: {e:#}");
                failures.push(format!("{model}: {e:#}"));
                state = state.advance(candidates.len());
            }
        }
    }

    let detail = if failures.is_empty() {
        "no candidates configured".to_owned()
    } else {
        failures.join("; ")
    };
    Err(InferenceError::InitializationFatal { role, detail })
}

/// Description of the provider serving a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderInfo {
    pub role: Role,
    pub model: CompactString,
    pub candidate: usize,
}

/// Process-wide, read-only set of resolved providers.
pub struct Registry<B: Backend> {
    summarizer: Slot<B::Summarizer>,
    captioner: Slot<B::Captioner>,
    speech: <B::Synthesizer as Synthesize>::Config,
    fetcher: B::Fetcher,
}

impl<B: Backend> Registry<B> {
    pub fn new(
        summarizer: Slot<B::Summarizer>,
        captioner: Slot<B::Captioner>,
        speech: <B::Synthesizer as Synthesize>::Config,
        fetcher: B::Fetcher,
    ) -> Self {
        Self {
            summarizer,
            captioner,
            speech,
            fetcher,
        }
    }

    pub fn summarizer(&self) -> &Slot<B::Summarizer> {
        &self.summarizer
    }

    pub fn captioner(&self) -> &Slot<B::Captioner> {
        &self.captioner
    }

    /// Build a synthesizer for one call.
    pub fn synthesizer(&self) -> B::Synthesizer {
        <B::Synthesizer as Synthesize>::new(&self.speech)
    }

    /// Model of the speech synthesizer, read from its config.
    pub fn speech_model(&self) -> &str {
        <B::Synthesizer as Synthesize>::model(&self.speech)
    }

    pub fn fetcher(&self) -> &B::Fetcher {
        &self.fetcher
    }

    /// Which provider serves `role`.
    pub fn info(&self, role: Role) -> ProviderInfo {
        let (model, candidate) = match role {
            Role::Summarizer => (self.summarizer.model.clone(), self.summarizer.candidate),
            Role::Captioner => (self.captioner.model.clone(), self.captioner.candidate),
            Role::SpeechSynthesizer => (CompactString::from(self.speech_model()), 0),
        };
        ProviderInfo {
            role,
            model,
            candidate,
        }
    }
}

impl<B: Backend> fmt::Debug for Registry<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("summarizer", &self.summarizer)
            .field("captioner", &self.captioner)
            .finish_non_exhaustive()
    }
}
