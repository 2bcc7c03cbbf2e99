use std::time::Duration;

use crate::error::Result;

/// Outbound HTTP seam used by the extractors.
///
/// Implementations perform exactly one GET bounded by `timeout` and report the
/// status as-is; deciding what counts as success is the caller's job.
pub trait HttpClientPort {
    fn get(&self, url: &str, timeout: Duration) -> Result<HttpGetResult>;
}

#[derive(Clone, Debug)]
pub struct HttpGetResult {
    pub status: u16,
    pub reason: String,
    pub body: String,
    pub content_type: String,
}

impl HttpGetResult {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
