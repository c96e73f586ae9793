//! Concurrent batch fetcher.
//!
//! [`Client::download_all`] fetches an ordered list of URLs in parallel and
//! returns one [`FileResult`] per input, in input order, or the first
//! failure it observes.
//!
//! # Concurrency Model
//!
//! - Each URL gets its own Tokio task; batch size bounds concurrency
//! - Tasks report `(index, outcome)` on a channel with capacity N, so a
//!   send never waits for the caller
//! - The caller drains signals and places each payload into the slot for
//!   its index, so completion order never affects output order
//! - The first failure drained ends the call. Other tasks are not
//!   cancelled: they run to completion and their results are discarded
//!
//! [`Client::download_all_limited`] keeps the same model but makes each task
//! wait for a semaphore permit before its request.

use std::num::NonZeroUsize;
use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, instrument};

use crate::client::Client;
use crate::error::FetchError;

/// One entry of a batch: a caller-chosen name and the URL to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRequest {
    /// Name copied to the matching [`FileResult`]. Never derived from the URL.
    pub name: String,
    /// URL to fetch.
    pub url: String,
}

impl FileRequest {
    /// Creates a named request.
    #[must_use]
    pub fn named(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

impl From<&str> for FileRequest {
    fn from(url: &str) -> Self {
        Self::named(String::new(), url)
    }
}

impl From<String> for FileRequest {
    fn from(url: String) -> Self {
        Self::named(String::new(), url)
    }
}

/// A downloaded file held in memory.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileResult {
    /// File name with no directory, as supplied in the [`FileRequest`].
    pub name: String,
    /// Contents of the file.
    pub data: Vec<u8>,
}

impl Client {
    /// Downloads every request concurrently, one task per URL.
    ///
    /// `result[i]` always corresponds to `requests[i]`. An empty input
    /// returns an empty output without spawning anything.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns the first [`FetchError`] drained from the tasks. When several
    /// tasks fail, which one is reported depends on completion order.
    #[instrument(level = "debug", skip(self, requests))]
    pub async fn download_all<I, R>(&self, requests: I) -> Result<Vec<FileResult>, FetchError>
    where
        I: IntoIterator<Item = R>,
        R: Into<FileRequest>,
    {
        fetch_all(self, collect_requests(requests), None).await
    }

    /// Same as [`download_all`](Self::download_all), but at most `limit`
    /// requests are in flight at once.
    ///
    /// # Errors
    ///
    /// Same as [`download_all`](Self::download_all).
    #[instrument(level = "debug", skip(self, requests))]
    pub async fn download_all_limited<I, R>(
        &self,
        requests: I,
        limit: NonZeroUsize,
    ) -> Result<Vec<FileResult>, FetchError>
    where
        I: IntoIterator<Item = R>,
        R: Into<FileRequest>,
    {
        let semaphore = Arc::new(Semaphore::new(limit.get()));
        fetch_all(self, collect_requests(requests), Some(semaphore)).await
    }

    /// Alias of [`download_all`](Self::download_all).
    ///
    /// # Errors
    ///
    /// Same as [`download_all`](Self::download_all).
    pub async fn files<I, R>(&self, requests: I) -> Result<Vec<FileResult>, FetchError>
    where
        I: IntoIterator<Item = R>,
        R: Into<FileRequest>,
    {
        self.download_all(requests).await
    }
}

fn collect_requests<I, R>(requests: I) -> Vec<FileRequest>
where
    I: IntoIterator<Item = R>,
    R: Into<FileRequest>,
{
    requests.into_iter().map(Into::into).collect()
}

type Outcome = (usize, Result<Vec<u8>, FetchError>);

async fn fetch_all(
    client: &Client,
    requests: Vec<FileRequest>,
    semaphore: Option<Arc<Semaphore>>,
) -> Result<Vec<FileResult>, FetchError> {
    let total = requests.len();
    if total == 0 {
        return Ok(Vec::new());
    }

    let mut names = Vec::with_capacity(total);
    let mut urls = Vec::with_capacity(total);
    let mut handles = Vec::with_capacity(total);
    let (tx, rx) = mpsc::channel::<Outcome>(total);

    for (index, request) in requests.into_iter().enumerate() {
        names.push(request.name);
        urls.push(request.url.clone());

        let client = client.clone();
        let tx = tx.clone();
        let semaphore = semaphore.clone();
        let url = request.url;
        handles.push(tokio::spawn(async move {
            // Held until the task ends; the semaphore is never closed.
            let _permit = match semaphore {
                Some(semaphore) => semaphore.acquire_owned().await.ok(),
                None => None,
            };
            let outcome = client.bytes(&url).await;
            debug!(index, url = %url, ok = outcome.is_ok(), "batch task finished");
            // The receiver is gone once the batch has already failed.
            let _ = tx.send((index, outcome)).await;
        }));
    }
    drop(tx);

    debug!(task_count = total, "waiting for batch tasks");

    let payloads = drain(rx, &urls, handles).await?;
    Ok(names
        .into_iter()
        .zip(payloads)
        .map(|(name, data)| FileResult { name, data })
        .collect())
}

/// Receives one outcome per URL and places each payload at its index.
///
/// Returns the first failure received. If the channel closes before every
/// URL has reported, a task panic is resumed, or else the first URL with no
/// outcome is reported as [`FetchError::Interrupted`].
async fn drain(
    mut rx: mpsc::Receiver<Outcome>,
    urls: &[String],
    handles: Vec<JoinHandle<()>>,
) -> Result<Vec<Vec<u8>>, FetchError> {
    let mut slots: Vec<Option<Vec<u8>>> = vec![None; urls.len()];

    for _ in 0..urls.len() {
        let Some((index, outcome)) = rx.recv().await else {
            resume_task_panic(handles).await;
            let missing = slots.iter().position(Option::is_none).unwrap_or(0);
            debug!(index = missing, "batch task ended without reporting");
            return Err(FetchError::interrupted(urls[missing].as_str()));
        };
        match outcome {
            Ok(data) => slots[index] = Some(data),
            Err(e) => {
                debug!(index, error = %e, "batch failed");
                return Err(e);
            }
        }
    }

    Ok(slots.into_iter().map(Option::unwrap_or_default).collect())
}

async fn resume_task_panic(handles: Vec<JoinHandle<()>>) {
    for handle in handles {
        if let Err(e) = handle.await
            && e.is_panic()
        {
            std::panic::resume_unwind(e.into_panic());
        }
    }
}
