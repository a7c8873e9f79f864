pub mod client;
pub mod errors;
pub mod pipeline;
pub mod types;

#[cfg(test)]
pub use client::MockDocumentFetcher;
pub use client::{DocumentFetcher, HttpFetcher, fetch};
pub use errors::FetchError;
pub use types::{Charset, PageResponse};
