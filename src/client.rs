//! Single-request fetcher.
//!
//! [`Client`] issues one GET per call and adapts the response into the
//! shape the caller asks for: raw bytes, text, a decoded JSON or XML value,
//! or a [`BodyReader`] over the still-open body.
//!
//! Every read operation except [`Client::get`] requires a `200 OK` status;
//! anything else fails with [`FetchError::Status`] and the response is
//! released before the error is returned.

use bytes::Bytes;
use futures_util::{Stream, TryStreamExt};
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::error::Category;
use tracing::{debug, instrument};
use url::Url;

use crate::error::FetchError;
use crate::user_agent;

/// HTTP client with convenience methods for GET requests.
///
/// Cloning is cheap and shares the underlying connection pool, so one
/// instance can be created at startup and handed to every caller. There is
/// no process-wide default instance.
///
/// # Example
///
/// ```no_run
/// use httpfetch::Client;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::new();
/// let page = client.string("https://www.example.com").await?;
/// println!("{page}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    client: reqwest::Client,
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl From<reqwest::Client> for Client {
    fn from(client: reqwest::Client) -> Self {
        Self::with_transport(client)
    }
}

impl Client {
    /// Creates a client with the crate's User-Agent and gzip decoding.
    ///
    /// No timeouts are configured; a hung server hangs the call.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .gzip(true)
            .user_agent(user_agent::default_user_agent())
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }

    /// Wraps an already-configured reqwest client.
    #[must_use]
    pub fn with_transport(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Returns a reference to the underlying reqwest client.
    #[must_use]
    pub fn inner(&self) -> &reqwest::Client {
        &self.client
    }

    /// Issues a GET to `url` and returns the raw response, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] if `url` does not parse, or
    /// [`FetchError::Transport`] if no response was received.
    #[instrument(level = "debug", skip(self))]
    pub async fn get(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        let parsed = Url::parse(url).map_err(|_| FetchError::invalid_url(url))?;
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| FetchError::transport(url, e))?;
        debug!(status = response.status().as_u16(), "response received");
        Ok(response)
    }

    /// Fetches `url` and returns the whole body.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Status`] for any status other than 200,
    /// [`FetchError::Body`] if reading the body fails, plus the errors of
    /// [`get`](Self::get).
    #[instrument(level = "debug", skip(self))]
    pub async fn bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.get_ok(url).await?;
        read_body(url, response).await
    }

    /// Fetches `url` and returns the body as UTF-8 text.
    ///
    /// Invalid UTF-8 sequences are replaced with U+FFFD.
    ///
    /// # Errors
    ///
    /// Same as [`bytes`](Self::bytes).
    #[instrument(level = "debug", skip(self))]
    pub async fn string(&self, url: &str) -> Result<String, FetchError> {
        let body = self.bytes(url).await?;
        Ok(String::from_utf8(body)
            .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned()))
    }

    /// Fetches `url` and returns a reader over the unread body.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Status`] for any status other than 200; the
    /// response is closed first. Otherwise the errors of [`get`](Self::get).
    #[instrument(level = "debug", skip(self))]
    pub async fn reader(&self, url: &str) -> Result<BodyReader, FetchError> {
        let response = self.get_ok(url).await?;
        Ok(BodyReader {
            url: url.to_string(),
            status: response.status().as_u16(),
            response,
        })
    }

    /// Fetches `url` and decodes the body as JSON.
    ///
    /// Only the first JSON value is decoded; anything after it is ignored.
    ///
    /// # Errors
    ///
    /// A body that is not well-formed JSON (including a truncated one)
    /// becomes a [`FetchError::Status`] reading `JSON syntax error at {url}`.
    /// Well-formed JSON that does not fit `T` is returned as
    /// [`FetchError::Json`]. Otherwise the errors of [`bytes`](Self::bytes).
    #[instrument(level = "debug", skip(self))]
    pub async fn json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let response = self.get_ok(url).await?;
        let status = response.status().as_u16();
        let body = read_body(url, response).await?;
        let mut deserializer = serde_json::Deserializer::from_slice(&body);
        T::deserialize(&mut deserializer).map_err(|e| classify_json_error(url, status, e))
    }

    /// Fetches `url` and decodes the body as XML.
    ///
    /// # Errors
    ///
    /// Decoder failures are returned unchanged as [`FetchError::Xml`].
    /// Otherwise the errors of [`bytes`](Self::bytes).
    #[instrument(level = "debug", skip(self))]
    pub async fn xml<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let body = self.bytes(url).await?;
        quick_xml::de::from_reader(body.as_slice()).map_err(FetchError::Xml)
    }

    /// GET that only yields responses with status 200.
    async fn get_ok(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        let response = self.get(url).await?;
        let status = response.status();
        if status != StatusCode::OK {
            drop(response);
            return Err(FetchError::status(url, status.as_u16()));
        }
        Ok(response)
    }
}

async fn read_body(url: &str, response: reqwest::Response) -> Result<Vec<u8>, FetchError> {
    let status = response.status().as_u16();
    let body = response
        .bytes()
        .await
        .map_err(|e| FetchError::body(url, status, e))?;
    debug!(bytes = body.len(), "body read");
    Ok(body.to_vec())
}

fn classify_json_error(url: &str, status: u16, error: serde_json::Error) -> FetchError {
    match error.classify() {
        Category::Syntax | Category::Eof => FetchError::json_syntax(url, status),
        Category::Data | Category::Io => FetchError::Json(error),
    }
}

/// Open response body returned by [`Client::reader`].
///
/// The status has already been checked. Dropping the reader closes the
/// body.
#[derive(Debug)]
pub struct BodyReader {
    url: String,
    status: u16,
    response: reqwest::Response,
}

impl BodyReader {
    /// The requested URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Response status (always 200).
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Body length announced by the server, if any.
    #[must_use]
    pub fn content_length(&self) -> Option<u64> {
        self.response.content_length()
    }

    /// Reads the next chunk of the body, or `None` at the end.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Body`] if the connection fails mid-body.
    pub async fn chunk(&mut self) -> Result<Option<Bytes>, FetchError> {
        self.response
            .chunk()
            .await
            .map_err(|e| FetchError::body(self.url.as_str(), self.status, e))
    }

    /// Reads the rest of the body into memory.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Body`] if the connection fails mid-body.
    pub async fn read_to_end(self) -> Result<Vec<u8>, FetchError> {
        read_body(&self.url, self.response).await
    }

    /// Converts the reader into a stream of body chunks.
    #[must_use]
    pub fn into_stream(self) -> impl Stream<Item = Result<Bytes, FetchError>> + Send + 'static {
        let Self {
            url,
            status,
            response,
        } = self;
        response
            .bytes_stream()
            .map_err(move |e| FetchError::body(url.as_str(), status, e))
    }
}
