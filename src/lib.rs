pub mod api;
pub mod app_state;
pub mod config;
pub mod extraction;
pub mod extractor;
pub mod fetcher;
pub mod health;
pub mod speech;
pub mod summarizer;
