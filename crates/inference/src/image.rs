//! Image sniffing for caption inputs.

use anyhow::{Result, bail};
use bytes::Bytes;

/// Image bytes whose format was recognized from their magic number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    bytes: Bytes,
    mime: &'static str,
}

impl Image {
    /// Recognize `bytes` as an image. Anything else is an error.
    pub fn decode(bytes: Bytes) -> Result<Self> {
        if bytes.is_empty() {
            bail!("image payload is empty");
        }
        match infer::get(&bytes) {
            Some(kind) if kind.matcher_type() == infer::MatcherType::Image => Ok(Self {
                mime: kind.mime_type(),
                bytes,
            }),
            Some(kind) => bail!("expected an image, got {}", kind.mime_type()),
            None => bail!("cannot identify image format"),
        }
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// MIME type, e.g. `image/png`.
    pub fn mime(&self) -> &'static str {
        self.mime
    }
}
