use crate::model::SearchResponse;
use std::future::Future;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://api.unsplash.com/";

const SEARCH_PATH: &str = "search/photos";
const QUERY: &str = "dog";
const PAGE: u32 = 1;
const PER_PAGE: u32 = 20;

/// Errors raised inside the client boundary.
///
/// Only construction surfaces these to callers; `fetch_dogs` logs them and
/// reports `None`.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status}")]
    Status { status: u16 },

    #[error("Response decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Anything that can produce the first page of dog photos.
pub trait PhotoSource: Send + Sync + 'static {
    /// One round trip. Every failure collapses to `None`; an empty page is
    /// `Some` with no results.
    fn fetch_dogs(&self) -> impl Future<Output = Option<SearchResponse>> + Send;
}

/// Unsplash search API client.
#[derive(Debug, Clone)]
pub struct UnsplashClient {
    http: reqwest::Client,
    search_url: reqwest::Url,
    access_key: Option<String>,
}

impl UnsplashClient {
    /// Build a client against `base_url`.
    ///
    /// A missing `access_key` is not an error here: requests go out without
    /// `client_id` and the server rejects them.
    pub fn new(base_url: &str, access_key: Option<String>) -> Result<Self, FetchError> {
        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let search_url = reqwest::Url::parse(&base)
            .and_then(|u| u.join(SEARCH_PATH))
            .map_err(|e| FetchError::InvalidBaseUrl(format!("{base_url}: {e}")))?;

        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let access_key = access_key.filter(|k| !k.is_empty());
        if access_key.is_none() {
            tracing::warn!("no API key configured; search requests will be rejected");
        }

        Ok(Self {
            http,
            search_url,
            access_key,
        })
    }

    async fn try_fetch(&self) -> Result<SearchResponse, FetchError> {
        let mut query = vec![
            ("query", QUERY.to_string()),
            ("page", PAGE.to_string()),
            ("per_page", PER_PAGE.to_string()),
        ];
        if let Some(key) = &self.access_key {
            query.push(("client_id", key.clone()));
        }

        tracing::debug!(url = %self.search_url, "GET search/photos");
        let response = self
            .http
            .get(self.search_url.clone())
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!(status = status.as_u16(), "search response");
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

impl PhotoSource for UnsplashClient {
    async fn fetch_dogs(&self) -> Option<SearchResponse> {
        match self.try_fetch().await {
            Ok(resp) => Some(resp),
            Err(e) => {
                tracing::warn!(error = %e, "dog search failed");
                None
            }
        }
    }
}

/// Source that always answers with the same response.
#[cfg(test)]
pub(crate) struct StaticSource(pub Option<SearchResponse>);

#[cfg(test)]
impl PhotoSource for StaticSource {
    async fn fetch_dogs(&self) -> Option<SearchResponse> {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve one canned HTTP response on loopback and hand back the raw
    /// request head that was received.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = sock.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            let resp = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            sock.write_all(resp.as_bytes()).await.unwrap();
            sock.shutdown().await.ok();
            String::from_utf8_lossy(&head).into_owned()
        });
        (format!("http://{addr}"), handle)
    }

    #[tokio::test]
    async fn test_fetch_parses_single_result() {
        let body = r#"{"results":[{"id":"1","name":"Rex","urls":{"thumb":"http://t"},"likes":4}],"total_pages":1}"#;
        let (base, server) = serve_once("200 OK", body).await;
        let client = UnsplashClient::new(&base, Some("key123".to_string())).unwrap();

        let resp = client.fetch_dogs().await.expect("some response");
        assert_eq!(resp.total_pages, 1);
        assert_eq!(resp.results.len(), 1);
        let rex = &resp.results[0];
        assert_eq!(rex.name.as_deref(), Some("Rex"));
        assert_eq!(rex.likes, Some(4));
        assert_eq!(rex.thumb_url(), "http://t");

        let request = server.await.unwrap();
        let line = request.lines().next().unwrap();
        assert!(line.starts_with("GET /search/photos?"), "{line}");
        assert!(line.contains("query=dog"));
        assert!(line.contains("page=1"));
        assert!(line.contains("per_page=20"));
        assert!(line.contains("client_id=key123"));
    }

    #[tokio::test]
    async fn test_empty_results_is_some() {
        let (base, server) = serve_once("200 OK", r#"{"results":[],"total_pages":0}"#).await;
        let client = UnsplashClient::new(&base, Some("k".to_string())).unwrap();
        let resp = client.fetch_dogs().await;
        assert_eq!(resp.map(|r| r.results.len()), Some(0));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_non_success_status_is_none() {
        let (base, server) = serve_once("401 Unauthorized", r#"{"errors":["OAuth error"]}"#).await;
        let client = UnsplashClient::new(&base, None).unwrap();
        assert!(client.fetch_dogs().await.is_none());

        let request = server.await.unwrap();
        assert!(!request.contains("client_id"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_none() {
        let (base, server) = serve_once("200 OK", r#"{"results": [oops"#).await;
        let client = UnsplashClient::new(&base, Some("k".to_string())).unwrap();
        assert!(client.fetch_dogs().await.is_none());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_connection_refused_is_none() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = UnsplashClient::new(&format!("http://{addr}/"), Some("k".to_string())).unwrap();
        assert!(client.fetch_dogs().await.is_none());
    }

    #[test]
    fn test_base_url_without_trailing_slash() {
        let client = UnsplashClient::new("http://example.com/v1", None).unwrap();
        assert_eq!(client.search_url.as_str(), "http://example.com/v1/search/photos");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = UnsplashClient::new("not a url", None).unwrap_err();
        assert!(matches!(err, FetchError::InvalidBaseUrl(_)));
    }
}
