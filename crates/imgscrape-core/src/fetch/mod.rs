//! HTTP GET for the page and for image resources.
//!
//! Uses the curl crate (libcurl). The blocking transfer runs on tokio's
//! blocking pool so many downloads can be in flight from the scheduler.

mod parse;

pub use parse::essence;

use std::str;
use std::time::Duration;

use thiserror::Error;

use crate::config::HttpConfig;

/// `Accept` value for the page request.
pub const ACCEPT_HTML: &str = "text/html";
/// `Accept` value for image requests.
pub const ACCEPT_ANY: &str = "*/*";

/// Headers of the final response that callers care about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHeaders {
    /// Raw `Content-Type` value, parameters included.
    pub content_type: Option<String>,
}

/// A completed 2xx response.
#[derive(Debug, Clone)]
pub struct Response {
    pub headers: ResponseHeaders,
    pub body: Vec<u8>,
}

impl Response {
    /// Media type of the body without parameters (empty when the server sent none).
    pub fn mime(&self) -> String {
        self.headers
            .content_type
            .as_deref()
            .map(essence)
            .unwrap_or_default()
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    /// libcurl failed (DNS, connect, timeout, TLS, ...).
    #[error("GET {url}")]
    Curl {
        url: String,
        #[source]
        source: curl::Error,
    },
    /// Server answered with a non-2xx status.
    #[error("GET {url} returned HTTP {status}")]
    Http { url: String, status: u32 },
    /// The blocking transfer task panicked or was cancelled.
    #[error("GET {url}: transfer task failed: {message}")]
    Join { url: String, message: String },
}

/// Performs a GET request, following redirects, and returns the full body.
///
/// Runs in the current thread; use [`get_async`] from async code.
pub fn get(url: &str, accept: &str, http: &HttpConfig) -> Result<Response, FetchError> {
    let curl_err = |source: curl::Error| FetchError::Curl {
        url: url.to_string(),
        source,
    };

    let mut header_lines: Vec<String> = Vec::new();
    let mut body: Vec<u8> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url).map_err(curl_err)?;
    easy.follow_location(true).map_err(curl_err)?;
    easy.max_redirections(http.max_redirections).map_err(curl_err)?;
    easy.useragent(&http.user_agent).map_err(curl_err)?;
    easy.connect_timeout(Duration::from_secs(http.connect_timeout_secs))
        .map_err(curl_err)?;
    easy.timeout(Duration::from_secs(http.timeout_secs))
        .map_err(curl_err)?;
    // Let libcurl negotiate and decode gzip/deflate/br.
    easy.accept_encoding("").map_err(curl_err)?;

    let mut list = curl::easy::List::new();
    list.append(&format!("Accept: {}", accept)).map_err(curl_err)?;
    easy.http_headers(list).map_err(curl_err)?;

    {
        let mut transfer = easy.transfer();
        transfer
            .header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    header_lines.push(s.trim_end().to_string());
                }
                true
            })
            .map_err(curl_err)?;
        transfer
            .write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })
            .map_err(curl_err)?;
        transfer.perform().map_err(curl_err)?;
    }

    let status = easy.response_code().map_err(curl_err)?;
    if !(200..300).contains(&status) {
        return Err(FetchError::Http {
            url: url.to_string(),
            status,
        });
    }

    let headers = parse::parse_headers(&header_lines);
    tracing::debug!(
        url,
        status,
        bytes = body.len(),
        content_type = headers.content_type.as_deref().unwrap_or(""),
        "GET complete"
    );
    Ok(Response {
        headers,
        body,
    })
}

/// [`get`] on tokio's blocking pool.
pub async fn get_async(
    url: &str,
    accept: &'static str,
    http: &HttpConfig,
) -> Result<Response, FetchError> {
    let owned_url = url.to_string();
    let http = http.clone();
    tokio::task::spawn_blocking(move || get(&owned_url, accept, &http))
        .await
        .map_err(|e| FetchError::Join {
            url: url.to_string(),
            message: e.to_string(),
        })?
}

/// Downloads the page markup as text.
pub async fn fetch_page(url: &str, http: &HttpConfig) -> Result<String, FetchError> {
    let response = get_async(url, ACCEPT_HTML, http).await?;
    Ok(response.text())
}
