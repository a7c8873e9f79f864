pub mod errors;
pub mod model;
pub mod service;

pub use errors::ExtractionError;
pub use model::{ArticleResult, ExtractionRequest};
pub use service::{ExtractionService, ExtractionSettings, ServiceSetupError};
