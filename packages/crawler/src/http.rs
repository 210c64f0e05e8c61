//! HTTP client wrapper for the open-data portal.
//!
//! Every request uses a fixed timeout and is attempted once. Certificate
//! validation is disabled: the portal's chain is not trusted by the default
//! root store, and the published data is public.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::encoding::{decode_order_names, decode_text};
use crate::error::{CrawlerError, Result};

/// User agent string identifying this crawler.
const USER_AGENT: &str = concat!("taiwan-holiday-crawler/", env!("CARGO_PKG_VERSION"));

/// Create a configured HTTP client.
///
/// # Arguments
/// * `timeout_secs` - Per-request timeout in seconds
pub fn create_client(timeout_secs: u64) -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(USER_AGENT)
        .danger_accept_invalid_certs(true)
        .build()?;
    Ok(client)
}

/// Download the body of `url`.
///
/// Non-success statuses are errors. Bodies larger than `max_size` bytes are
/// rejected, both up front via `Content-Length` and after reading.
pub fn download_bytes(client: &Client, url: &str, max_size: u64) -> Result<Vec<u8>> {
    let download_error = |source| CrawlerError::Download {
        url: url.to_string(),
        source,
    };

    let response = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(download_error)?;

    if response.content_length().is_some_and(|len| len > max_size) {
        return Err(CrawlerError::ResponseTooLarge {
            url: url.to_string(),
            limit: max_size,
        });
    }

    let bytes = response.bytes().map_err(download_error)?;
    if bytes.len() as u64 > max_size {
        return Err(CrawlerError::ResponseTooLarge {
            url: url.to_string(),
            limit: max_size,
        });
    }

    tracing::debug!(url, bytes = bytes.len(), "Downloaded");
    Ok(bytes.to_vec())
}

/// Download `url` and decode it as text.
///
/// Fails with [`CrawlerError::Decode`] when no supported encoding accepts
/// the body.
pub fn download_text(client: &Client, url: &str, max_size: u64) -> Result<String> {
    let bytes = download_bytes(client, url, max_size)?;
    let (text, encoding) = decode_text(&bytes).ok_or_else(|| CrawlerError::Decode {
        url: url.to_string(),
        tried: decode_order_names(),
    })?;
    tracing::debug!(url, encoding = encoding.name(), "Decoded response");
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client() {
        let client = create_client(30);
        assert!(client.is_ok());
    }

    #[test]
    fn test_download_invalid_url() {
        let client = create_client(1).unwrap();
        let result = download_bytes(&client, "not a url", 1024);
        assert!(matches!(result, Err(CrawlerError::Download { .. })));
    }
}
