pub mod language;
pub mod model;
pub mod reader;

#[cfg(test)]
mod tests;

pub use language::detect_language;
pub use model::{ReadableArticle, normalize_whitespace};
pub use reader::ReadabilityExtractor;

use url::Url;

/// Pulls the readable part out of an HTML document.
///
/// Implementations must be deterministic: the same `html` and `base_url`
/// always give the same answer. `None` means nothing usable was found.
#[cfg_attr(test, mockall::automock)]
pub trait ContentExtractor: Send + Sync {
    fn extract(&self, html: &str, base_url: &Url) -> Option<ReadableArticle>;
}
