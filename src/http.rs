//! HTTP/HTTPS `GET` with a fixed-delay retry budget.

use std::time::Duration;

use reqwest::{Client, IntoUrl, StatusCode};

use crate::core::error::{Error, Result};

/// Pause before a failed request is retried.
pub const HTTP_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Fetches `url` and returns the body as text, using a fresh client.
///
/// See [`get_with`].
pub async fn get<U: IntoUrl + Clone>(url: U, retry: u32) -> Result<String> {
    get_with(&Client::new(), url, retry).await
}

/// Fetches `url` with `client` and returns the body as text.
///
/// The transport (plain or TLS) follows the URL scheme. Only `200 OK` counts
/// as success; any other status is [`Error::HttpStatus`] and the body is
/// dropped unread. A transport error or bad status is retried up to `retry`
/// times, waiting [`HTTP_RETRY_DELAY`] before each attempt. The error of the
/// final attempt is returned.
pub async fn get_with<U: IntoUrl + Clone>(client: &Client, url: U, retry: u32) -> Result<String> {
    let mut remaining = retry;
    loop {
        match fetch(client, url.clone()).await {
            Ok(body) => return Ok(body),
            Err(e) if remaining == 0 => return Err(e),
            Err(e) => {
                log::debug!("GET failed ({}), {} retries left", e, remaining);
                remaining -= 1;
                tokio::time::sleep(HTTP_RETRY_DELAY).await;
            }
        }
    }
}

async fn fetch(client: &Client, url: impl IntoUrl) -> Result<String> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if status != StatusCode::OK {
        return Err(Error::HttpStatus(status.as_u16()));
    }
    Ok(response.text().await?)
}
