pub mod apis;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod protocol;
pub mod sink;
pub mod transliterate;
pub mod types;

// Ports and their adapters
pub mod app;
pub mod infra;
