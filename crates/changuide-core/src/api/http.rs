use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, Proxy, Response, StatusCode};
use url::Url;

use super::client::GuideApi;
use super::fragment::parse_page_fragment;
use super::models::{
    Channel, ChannelId, ChannelQuery, PageFragment, QueueStatus, StatusReply, SubscriptionStatus,
};
use crate::config::AppConfig;
use crate::{Error, Result};

const MAX_RESPONSE_BYTES: usize = 5 * 1024 * 1024;
const INITIAL_RETRY_DELAY_MS: u64 = 500;
const LOGIN_PAGE_MARKER: &str = r#"<div class="login-page">"#;

/// Channel guide client over HTTP
pub struct HttpGuideApi {
    client: Client,
    base_url: Url,
    max_retries: u32,
}

impl HttpGuideApi {
    /// Create a new client with configuration
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Self::build_client(config.api.request_timeout_secs, &config.api.proxy_url)?;
        let base_url = Url::parse(&config.api.base_url)?;

        Ok(Self {
            client,
            base_url,
            max_retries: config.api.max_retries.max(1),
        })
    }

    /// Build HTTP client with optional proxy
    fn build_client(timeout_secs: u64, proxy_url: &Option<String>) -> Result<Client> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(10))
            .default_headers(Self::default_headers());

        if let Some(ref proxy) = proxy_url {
            let proxy = Proxy::all(proxy)
                .map_err(|e| Error::Config(format!("Invalid proxy URL: {}", e)))?;
            builder = builder.proxy(proxy);
            tracing::info!("Using HTTP proxy for channel guide requests");
        }

        builder.build().map_err(Error::Http)
    }

    fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json,text/html;q=0.9,*/*;q=0.8"),
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("changuide/", env!("CARGO_PKG_VERSION"))),
        );
        headers
    }

    /// Resolve a possibly relative link against the configured base URL
    pub fn resolve_url(&self, url: &str) -> Result<Url> {
        match Url::parse(url) {
            Ok(absolute) => Ok(absolute),
            Err(url::ParseError::RelativeUrlWithoutBase) => Ok(self.base_url.join(url)?),
            Err(e) => Err(e.into()),
        }
    }

    fn api_url(&self, path: &str, params: &[(&str, String)]) -> Result<Url> {
        let mut url = self.base_url.join(path)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("datatype", "json");
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn map_send_error(e: reqwest::Error, url: &Url) -> Error {
        if e.is_timeout() {
            Error::Timeout(url.to_string())
        } else {
            Error::Http(e)
        }
    }

    /// GET with retry and exponential backoff
    ///
    /// Retries on transport failures and on 429 / 503. Any other status is
    /// returned to the caller as-is, together with the final URL after
    /// redirects.
    async fn get_with_retry(&self, url: &Url) -> Result<(StatusCode, Url, Bytes)> {
        let mut last_error = None;
        let mut delay_ms = INITIAL_RETRY_DELAY_MS;

        for attempt in 0..self.max_retries {
            tracing::debug!("Fetch attempt {} for {}", attempt + 1, url);

            match self.client.get(url.clone()).send().await {
                Ok(response) => {
                    let status = response.status();
                    let final_url = response.url().clone();

                    if status == StatusCode::TOO_MANY_REQUESTS
                        || status == StatusCode::SERVICE_UNAVAILABLE
                    {
                        tracing::warn!(
                            "Received {} for {}, retrying after {}ms...",
                            status,
                            url,
                            delay_ms
                        );
                        last_error = Some(Error::Status {
                            status: status.as_u16(),
                            url: url.to_string(),
                        });
                    } else {
                        match Self::read_body(response, url).await {
                            Ok(bytes) => return Ok((status, final_url, bytes)),
                            Err(e @ Error::Malformed(_)) => return Err(e),
                            Err(e) => {
                                tracing::warn!("Failed to read response body: {}", e);
                                last_error = Some(e);
                            }
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        "Request failed for {} (attempt {}): {}",
                        url,
                        attempt + 1,
                        e
                    );
                    last_error = Some(Self::map_send_error(e, url));
                }
            }

            if attempt + 1 < self.max_retries {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                delay_ms *= 2;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            Error::Other(format!(
                "Failed to fetch URL after {} retries: {}",
                self.max_retries, url
            ))
        }))
    }

    /// GET a resource and require a successful status
    async fn get_ok(&self, url: &Url) -> Result<(Url, Bytes)> {
        let (status, final_url, bytes) = self.get_with_retry(url).await?;
        Self::ensure_success(status, url)?;
        Ok((final_url, bytes))
    }

    /// Single-shot POST; the aether endpoints are not idempotent
    async fn post_ok(&self, url: &Url) -> Result<Bytes> {
        tracing::debug!("POST {}", url);
        let response = self
            .client
            .post(url.clone())
            .send()
            .await
            .map_err(|e| Self::map_send_error(e, url))?;
        Self::ensure_success(response.status(), url)?;
        Self::read_body(response, url).await
    }

    fn ensure_success(status: StatusCode, url: &Url) -> Result<()> {
        if status.is_success() {
            Ok(())
        } else {
            Err(Error::Status {
                status: status.as_u16(),
                url: url.to_string(),
            })
        }
    }

    /// Read a body chunk by chunk, giving up once it passes `MAX_RESPONSE_BYTES`
    async fn read_body(mut response: Response, url: &Url) -> Result<Bytes> {
        if let Some(length) = response.content_length() {
            Self::ensure_content_size(usize::try_from(length).unwrap_or(usize::MAX), url)?;
        }

        let mut body = BytesMut::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| Self::map_send_error(e, url))?
        {
            Self::append_chunk(&mut body, &chunk, url)?;
        }
        Ok(body.freeze())
    }

    fn append_chunk(body: &mut BytesMut, chunk: &[u8], url: &Url) -> Result<()> {
        Self::ensure_content_size(body.len().saturating_add(chunk.len()), url)?;
        body.extend_from_slice(chunk);
        Ok(())
    }

    fn ensure_content_size(size: usize, url: &Url) -> Result<()> {
        if size > MAX_RESPONSE_BYTES {
            return Err(Error::Malformed(format!(
                "Response too large ({} bytes) for URL: {}",
                size, url
            )));
        }
        Ok(())
    }
}

/// Decode a channel-detail reply, which is either a record or an error object
fn decode_channels(bytes: &[u8]) -> Result<Vec<Channel>> {
    let value: serde_json::Value = serde_json::from_slice(bytes)?;

    if let Some(error) = value.get("error") {
        let text = value
            .get("text")
            .and_then(|t| t.as_str())
            .unwrap_or_default();
        return Err(Error::Malformed(format!("API error {}: {}", error, text)));
    }

    match value {
        serde_json::Value::Array(_) => Ok(serde_json::from_value(value)?),
        other => Ok(vec![serde_json::from_value(other)?]),
    }
}

#[async_trait]
impl GuideApi for HttpGuideApi {
    async fn fetch_detail(&self, id: ChannelId) -> Result<Channel> {
        let url = self.api_url("/api/get_channel", &[("id", id.to_string())])?;
        let (_, bytes) = self.get_ok(&url).await?;

        decode_channels(&bytes)?
            .into_iter()
            .find(|c| c.id == id)
            .ok_or(Error::ChannelNotFound(id))
    }

    async fn fetch_details(&self, ids: &[ChannelId]) -> Result<Vec<Channel>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let params: Vec<(&str, String)> = ids.iter().map(|id| ("id", id.to_string())).collect();
        let url = self.api_url("/api/get_channel", &params)?;
        let (_, bytes) = self.get_ok(&url).await?;
        decode_channels(&bytes)
    }

    async fn fetch_page(&self, url: &str) -> Result<PageFragment> {
        let url = self.resolve_url(url)?;
        tracing::info!("Fetching listing page: {}", url);
        let (_, bytes) = self.get_ok(&url).await?;
        parse_page_fragment(&String::from_utf8_lossy(&bytes))
    }

    async fn fetch_subscribe_redirect(&self, notify_url: &str) -> Result<String> {
        let url = self.resolve_url(notify_url)?;
        let (final_url, _) = self.get_ok(&url).await?;
        Ok(final_url.to_string())
    }

    async fn fetch_channels(&self, query: &ChannelQuery) -> Result<Vec<Channel>> {
        let url = self.api_url(
            "/api/get_channels",
            &[
                ("sort", query.sort.as_param().to_string()),
                ("limit", query.limit.to_string()),
                ("filter", query.filter.clone()),
                ("filter_value", query.value.clone()),
            ],
        )?;
        let (_, bytes) = self.get_ok(&url).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn set_queued(&self, item_id: u64, queued: bool) -> Result<QueueStatus> {
        let path = if queued { "/aether/queue/" } else { "/aether/dequeue/" };
        let url = self.base_url.join(&format!("{}{}", path, item_id))?;
        let bytes = self.post_ok(&url).await?;
        let reply: StatusReply<QueueStatus> = serde_json::from_slice(&bytes)?;
        Ok(reply.status)
    }

    async fn set_subscribed(&self, channel_id: ChannelId, subscribed: bool) -> Result<SubscriptionStatus> {
        let path = if subscribed { "/aether/subscribe/" } else { "/aether/unsubscribe/" };
        let url = self.base_url.join(&format!("{}{}", path, channel_id))?;
        let bytes = self.post_ok(&url).await?;
        let reply: StatusReply<SubscriptionStatus> = serde_json::from_slice(&bytes)?;
        Ok(reply.status)
    }

    async fn rate(&self, channel_id: ChannelId, rating: u8) -> Result<()> {
        let mut url = self.base_url.join(&format!("/channels/{}/rate/", channel_id))?;
        url.query_pairs_mut()
            .append_pair("rating", &rating.min(5).to_string());
        let (_, bytes) = self.get_ok(&url).await?;

        if String::from_utf8_lossy(&bytes).contains(LOGIN_PAGE_MARKER) {
            return Err(Error::LoginRequired(url.to_string()));
        }
        Ok(())
    }
}
