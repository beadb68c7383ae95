//! HTTP retrieval for release assets.
//!
//! GitHub serves release downloads through a redirect to its object store, so
//! redirects are followed here explicitly (the underlying client has automatic
//! redirects turned off). The chain is capped at [`MAX_REDIRECTS`] so a cyclic
//! or misconfigured redirect fails instead of looping.
//!
//! Nothing is retried: a failed request fails the run.

use std::path::Path;

use futures_util::StreamExt;
use reqwest::StatusCode;
use reqwest::header::LOCATION;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::errors::{InstallError, IoContext, Result};

/// Maximum number of redirects followed for a single request.
pub const MAX_REDIRECTS: usize = 5;

/// Connect timeout in seconds. The overall limit is the pipeline deadline.
const CONNECT_TIMEOUT_SECS: u64 = 30;

/// User-Agent header for HTTP requests.
const USER_AGENT: &str = concat!("patchline-install/", env!("CARGO_PKG_VERSION"));

/// HTTP client for release assets.
#[derive(Debug, Clone)]
pub struct RetrievalClient {
    client: reqwest::Client,
    max_redirects: usize,
}

impl RetrievalClient {
    /// Creates a client that follows at most [`MAX_REDIRECTS`] redirects.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(std::time::Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| InstallError::io("Failed to create HTTP client", std::io::Error::other(e)))?;

        Ok(Self {
            client,
            max_redirects: MAX_REDIRECTS,
        })
    }

    /// Overrides the redirect bound.
    #[must_use]
    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    /// Issues a GET for `url`, following redirects, and returns the 200 response.
    ///
    /// A 3xx response with a usable `Location` header is followed, resolving
    /// relative targets against the current URL. Any other terminal status,
    /// including a 3xx without `Location`, is a failure.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The request cannot be sent ([`InstallError::Http`])
    /// - The chain is longer than the redirect bound ([`InstallError::TooManyRedirects`])
    /// - The terminal status is not 200 ([`InstallError::DownloadFailed`])
    pub async fn request(&self, url: &str) -> Result<reqwest::Response> {
        let mut current = url.to_string();
        let mut redirects = 0;

        loop {
            let response = self
                .client
                .get(&current)
                .send()
                .await
                .map_err(|e| InstallError::http(&current, e))?;

            let status = response.status();

            if status.is_redirection()
                && let Some(next) = redirect_target(&response)
            {
                if redirects == self.max_redirects {
                    return Err(InstallError::TooManyRedirects {
                        url: url.to_string(),
                        limit: self.max_redirects,
                    });
                }
                redirects += 1;
                debug!(from = %current, to = %next, status = status.as_u16(), "following redirect");
                current = next;
                continue;
            }

            if status != StatusCode::OK {
                return Err(InstallError::download_failed(status, current));
            }

            return Ok(response);
        }
    }

    /// Streams the body of `url` into a new file at `dest`.
    ///
    /// The file is created (or truncated) before the body is read. If the
    /// stream fails midway the partial file is left for the caller to clean up.
    ///
    /// # Returns
    ///
    /// The number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the body stream breaks, or the
    /// file cannot be created or written.
    pub async fn download_file(&self, url: &str, dest: &Path) -> Result<u64> {
        let response = self.request(url).await?;

        let mut file = tokio::fs::File::create(dest)
            .await
            .io_context(|| format!("Failed to create file: {}", dest.display()))?;

        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| InstallError::http(url, e))?;
            file.write_all(&chunk)
                .await
                .io_context(|| format!("Failed to write to {}", dest.display()))?;
            downloaded += chunk.len() as u64;
        }

        file.flush()
            .await
            .io_context(|| format!("Failed to flush {}", dest.display()))?;

        debug!(url, bytes = downloaded, dest = %dest.display(), "download complete");
        Ok(downloaded)
    }

    /// Fetches `url` and returns its body as text.
    ///
    /// The whole body is buffered; use this only for small documents such as
    /// the checksum manifest. Invalid UTF-8 is replaced rather than rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body cannot be read.
    pub async fn download_text(&self, url: &str) -> Result<String> {
        let response = self.request(url).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| InstallError::http(url, e))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Resolves the `Location` header of a redirect response against its URL.
fn redirect_target(response: &reqwest::Response) -> Option<String> {
    let location = response.headers().get(LOCATION)?.to_str().ok()?;
    response.url().join(location).ok().map(String::from)
}
