use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use crate::app::ports::{HttpClientPort, HttpGetResult};
use crate::error::{EtlError, Result};

const USER_AGENT: &str = concat!("nhl_etl/", env!("CARGO_PKG_VERSION"));

/// Blocking reqwest adapter. A fresh client per call keeps the timeout per request.
pub struct ReqwestHttp;

impl HttpClientPort for ReqwestHttp {
    fn get(&self, url: &str, timeout: Duration) -> Result<HttpGetResult> {
        let fetch_error = |e: reqwest::Error| EtlError::Fetch {
            url: url.to_string(),
            status: e.status().map(|s| s.as_u16()),
            reason: e.to_string(),
        };

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(fetch_error)?;

        debug!(url, timeout_secs = timeout.as_secs(), "GET");
        let resp = client.get(url).send().map_err(fetch_error)?;
        let status = resp.status();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let body = resp.text().map_err(fetch_error)?;

        Ok(HttpGetResult {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
            body,
            content_type,
        })
    }
}
