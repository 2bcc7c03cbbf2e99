pub mod gamelog;
pub mod teams;

use std::time::Duration;
use tracing::warn;

use crate::app::ports::HttpClientPort;
use crate::error::{EtlError, Result};

/// Performs the single GET for an extraction and rejects non-success responses.
pub(crate) fn fetch_text<H>(http: &H, url: &str, timeout: Duration) -> Result<String>
where
    H: HttpClientPort + ?Sized,
{
    let resp = http.get(url, timeout)?;
    if !resp.is_success() {
        warn!(url, status = resp.status, "upstream returned non-success status");
        return Err(EtlError::Fetch {
            url: url.to_string(),
            status: Some(resp.status),
            reason: resp.reason,
        });
    }
    Ok(resp.body)
}
