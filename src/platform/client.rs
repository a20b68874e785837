//! HTTP transport for upstream requests

use crate::error::ParserError;
use crate::utils::url::resolve_location;
use async_trait::async_trait;
use reqwest::header::{ACCEPT_LANGUAGE, LOCATION};
use reqwest::{redirect, Client, ClientBuilder, Method, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

/// Default browser user agent for upstream requests
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// A fully read upstream response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedBody {
    pub status: u16,
    /// Lowercased header names with their values
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl FetchedBody {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .push((name.to_ascii_lowercase(), value.to_string()));
        self
    }

    /// First value of header `name`
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Outbound HTTP primitives used by the resolvers and the server
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `url`, following redirects, failing on non-2xx statuses
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<FetchedBody, ParserError>;

    /// POST a JSON body and return the response text
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<String, ParserError>;

    async fn fetch_text(&self, url: &str, headers: &[(&str, &str)]) -> Result<String, ParserError> {
        Ok(self.get(url, headers).await?.text())
    }
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout per attempt
    pub timeout: Duration,
    /// Maximum redirects followed per request
    pub max_redirects: u32,
    /// User agent string
    pub user_agent: Option<String>,
    /// Accept-Language header value
    pub accept_language: Option<String>,
    /// Proxy URL
    pub proxy_url: Option<String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_redirects: 3,
            user_agent: None,
            accept_language: Some("en-US,en;q=0.9".to_string()),
            proxy_url: None,
        }
    }
}

/// reqwest-backed transport with manual redirect handling
pub struct HttpTransport {
    client: Client,
    config: HttpClientConfig,
}

impl HttpTransport {
    /// Create a new transport with default configuration
    pub fn new() -> Result<Self, ParserError> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new transport with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self, ParserError> {
        let mut builder = ClientBuilder::new()
            .timeout(config.timeout)
            .redirect(redirect::Policy::none())
            .gzip(true)
            .brotli(true)
            .user_agent(config.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT));

        if let Some(proxy_url) = &config.proxy_url {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }

        Ok(Self {
            client: builder.build()?,
            config,
        })
    }

    async fn execute(
        &self,
        mut method: Method,
        url: &str,
        headers: &[(&str, &str)],
        mut body: Option<&serde_json::Value>,
    ) -> Result<FetchedBody, ParserError> {
        let mut target = url.to_string();
        let mut redirects = 0;

        loop {
            debug!("{} {}", method, target);
            let mut request = self.client.request(method.clone(), &target);
            if let Some(lang) = &self.config.accept_language {
                request = request.header(ACCEPT_LANGUAGE, lang);
            }
            for (name, value) in headers {
                request = request.header(*name, *value);
            }
            if let Some(json) = body {
                request = request.json(json);
            }

            let response = request.send().await?;
            let status = response.status();

            if matches!(
                status,
                StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND | StatusCode::SEE_OTHER
            ) {
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                if let Some(location) = location {
                    if redirects >= self.config.max_redirects {
                        warn!("Redirect limit reached at {}", target);
                        return Err(ParserError::TooManyRedirects(url.to_string()));
                    }
                    redirects += 1;
                    target = resolve_location(&target, &location)?;
                    if status == StatusCode::SEE_OTHER {
                        method = Method::GET;
                        body = None;
                    }
                    continue;
                }
            }

            let ok = status.is_success()
                || (method == Method::POST && status == StatusCode::NOT_MODIFIED);
            if !ok {
                return Err(ParserError::Status {
                    url: target,
                    status: status.as_u16(),
                });
            }

            let headers = response
                .headers()
                .iter()
                .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
                .collect();
            let bytes = response.bytes().await?;
            return Ok(FetchedBody {
                status: status.as_u16(),
                headers,
                body: bytes.to_vec(),
            });
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<FetchedBody, ParserError> {
        self.execute(Method::GET, url, headers, None).await
    }

    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<String, ParserError> {
        let fetched = self.execute(Method::POST, url, &[], Some(body)).await?;
        Ok(fetched.text())
    }
}

#[cfg(test)]
pub(crate) use mock::MockTransport;
