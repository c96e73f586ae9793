//! Convenience helpers over HTTP GET.
//!
//! A [`Client`] fetches a URL and hands back the body as raw bytes, text,
//! a value decoded from JSON or XML, or a [`BodyReader`] over the open
//! body. [`Client::download_all`] fetches many URLs concurrently into
//! in-memory [`FileResult`]s that line up with the input order.
//!
//! # Architecture
//!
//! - [`client`] - single-request fetcher and the streaming body reader
//! - [`batch`] - concurrent batch fetcher
//! - [`error`] - the [`FetchError`] returned by every operation
//!
//! There is no retry, caching, timeout or request customization layer.
//! Create one [`Client`] at startup and share it; clones are cheap.
//!
//! # Example
//!
//! ```no_run
//! use httpfetch::{Client, FileRequest};
//!
//! # async fn example() -> Result<(), httpfetch::FetchError> {
//! let client = Client::new();
//! let files = client
//!     .download_all([
//!         FileRequest::named("golang.html", "https://go.dev"),
//!         FileRequest::named("rust.html", "https://www.rust-lang.org"),
//!     ])
//!     .await?;
//! for file in &files {
//!     println!("{}: {} bytes", file.name, file.data.len());
//! }
//! # Ok(())
//! # }
//! ```

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod batch;
pub mod client;
pub mod error;
mod user_agent;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use batch::{FileRequest, FileResult};
pub use client::{BodyReader, Client};
pub use error::FetchError;
