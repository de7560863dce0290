//! HTTP client with tracing and a per-session cookie store.
//!
//! Each [`HttpClient`] owns its own cookie jar, so a logged-in client is the
//! session: cloning it shares the jar, building a new one starts logged out.

use reqwest::{header, Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::error::FetchError;

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User agent string for tele2usage.
const USER_AGENT: &str = concat!("tele2usage/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// HTTP Client
// ============================================================================

/// HTTP client wrapper bound to one API base URL.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    base: Url,
}

impl HttpClient {
    /// Creates a client with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying client cannot be built (broken
    /// TLS configuration).
    pub fn new(base: Url) -> Result<Self, FetchError> {
        Self::with_timeout(base, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a client with a custom timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying client cannot be built.
    pub fn with_timeout(base: Url, timeout: Duration) -> Result<Self, FetchError> {
        let inner = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .build()?;

        Ok(Self { inner, base })
    }

    /// Returns the API base URL.
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Builds a URL by appending path segments to the base.
    ///
    /// Segments are percent-encoded, so identifiers can be passed verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] if the base cannot carry a path.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| FetchError::InvalidUrl(format!("{} cannot be a base", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Performs a GET request and decodes the JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status, or a
    /// body that does not decode as `T`.
    #[instrument(skip(self), fields(base = %self.base))]
    pub async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, FetchError> {
        let url = self.endpoint(segments)?;
        debug!(url = %url, "GET request");

        let response = self
            .inner
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;
        let response = check_status(response)?;

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            warn!(error = %e, "Failed to parse response body");
            FetchError::Json(e)
        })
    }

    /// Performs a POST request with a JSON body, discarding the response body.
    ///
    /// Cookies set by the response are kept in the client's jar.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    #[instrument(skip(self, body), fields(base = %self.base))]
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<(), FetchError> {
        let url = self.endpoint(segments)?;
        debug!(url = %url, "POST request");

        let response = self.inner.post(url).json(body).send().await?;
        check_status(response)?;
        Ok(())
    }
}

/// Maps the response status to an error, passing successful responses through.
fn check_status(response: Response) -> Result<Response, FetchError> {
    let status = response.status();
    debug!(status = %status, "Response received");

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(FetchError::AuthenticationFailed(format!("HTTP {status}")));
    }
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }
    Ok(response)
}

// ============================================================================
// Tests
// ============================================================================
