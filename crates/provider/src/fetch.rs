use crate::config::DEFAULT_FETCH_MAX_BYTES;
use bytes::{Bytes, BytesMut};
use inference::{Fetch, FetchError};
use reqwest::Client;
use std::time::Duration;

/// Fetches remote images with a whole-request timeout and a body size cap.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
    max_bytes: u64,
}

impl HttpFetcher {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self {
            client,
            timeout,
            max_bytes: DEFAULT_FETCH_MAX_BYTES,
        }
    }

    /// Cap accepted bodies at `max_bytes`.
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    fn error(&self, url: &str, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            return FetchError::Timeout {
                url: url.to_owned(),
                timeout: self.timeout,
            };
        }
        FetchError::Transport {
            url: url.to_owned(),
            reason: format!("{:#}", anyhow::Error::from(error)),
        }
    }

    fn too_large(&self, url: &str) -> FetchError {
        FetchError::TooLarge {
            url: url.to_owned(),
            limit: self.max_bytes,
        }
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        let mut response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }
        if response
            .content_length()
            .is_some_and(|len| len > self.max_bytes)
        {
            return Err(self.too_large(url));
        }

        // Content-Length may be absent or wrong; count what actually arrives.
        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| self.error(url, e))? {
            if (body.len() + chunk.len()) as u64 > self.max_bytes {
                return Err(self.too_large(url));
            }
            body.extend_from_slice(&chunk);
        }
        tracing::debug!(%url, bytes = body.len(), "image fetched");
        Ok(body.freeze())
    }
}
