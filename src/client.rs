use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Method, Response, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{Error, Result};
use crate::observability::{CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS};
use crate::types::{
    ChatRequest, ChatResponse, ConversationHistory, ConversationList, ErrorBody, HealthStatus,
    ToolListResponse,
};

/// Base URL of a locally running orchestrator.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for the orchestrator API.
///
/// Every operation is independent and stateless; none retries.  Failures
/// of any kind come back as [`Error`], with [`Error::message`] carrying the
/// server's `detail` when one was provided.
#[derive(Debug, Clone)]
pub struct Client {
    token: Option<String>,
    client: ReqwestClient,
    base_url: Url,
    timeout: Duration,
}

impl Client {
    /// Create a new client.
    ///
    /// `base_url` defaults to [`DEFAULT_BASE_URL`].  When `token` is `None`
    /// no `Authorization` header is sent.
    pub fn new(base_url: Option<String>, token: Option<String>) -> Result<Self> {
        Self::with_options(base_url, token, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(
        base_url: Option<String>,
        token: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let base_url = parse_base_url(base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))?;
        let token = token.filter(|t| !t.trim().is_empty());
        if let Some(token) = &token {
            HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                Error::configuration("API token contains characters not allowed in a header")
            })?;
        }

        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            token,
            client,
            base_url,
            timeout,
        })
    }

    /// The normalized base URL, always ending in `/`.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Returns true when requests carry a bearer token.
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// The per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send a chat message.  `POST /chat`
    pub async fn send_message(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let url = self.endpoint(&["chat"])?;
        let response = self.execute(Method::POST, url, Some(request)).await?;
        Self::parse_json(response).await
    }

    /// List the tool catalog, optionally restricted to one domain.  `GET /tools`
    pub async fn list_tools(&self, domain: Option<&str>) -> Result<ToolListResponse> {
        let mut url = self.endpoint(&["tools"])?;
        if let Some(domain) = domain {
            url.query_pairs_mut().append_pair("domain", domain);
        }
        let response = self.execute::<()>(Method::GET, url, None).await?;
        Self::parse_json(response).await
    }

    /// Fetch the server-side history of a conversation.  `GET /conversations/{id}`
    pub async fn get_conversation(&self, conversation_id: &str) -> Result<ConversationHistory> {
        let url = self.endpoint(&["conversations", conversation_id])?;
        let response = self.execute::<()>(Method::GET, url, None).await?;
        Self::parse_json(response).await
    }

    /// List the caller's conversations.  `GET /conversations`
    pub async fn list_conversations(&self) -> Result<ConversationList> {
        let url = self.endpoint(&["conversations"])?;
        let response = self.execute::<()>(Method::GET, url, None).await?;
        Self::parse_json(response).await
    }

    /// Delete a conversation.  `DELETE /conversations/{id}`
    pub async fn delete_conversation(&self, conversation_id: &str) -> Result<()> {
        let url = self.endpoint(&["conversations", conversation_id])?;
        self.execute::<()>(Method::DELETE, url, None).await?;
        Ok(())
    }

    /// Query orchestrator health.  `GET /health`
    pub async fn health_check(&self) -> Result<HealthStatus> {
        let url = self.endpoint(&["health"])?;
        let response = self.execute::<()>(Method::GET, url, None).await?;
        Self::parse_json(response).await
    }

    /// Create and return default headers for API requests.
    fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = &self.token {
            let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                Error::configuration("API token contains characters not allowed in a header")
            })?;
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Build the URL for an endpoint; each segment is percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::url("base URL cannot carry a path", None))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<Response> {
        CLIENT_REQUESTS.click();
        let start = Instant::now();
        tracing::debug!(method = %method, url = %url, "sending request");

        let mut builder = self
            .client
            .request(method.clone(), url.clone())
            .headers(self.default_headers()?);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let result = match builder.send().await {
            Ok(response) if response.status().is_success() => Ok(response),
            Ok(response) => Err(Self::process_error_response(response).await),
            Err(e) => Err(self.transport_error(e)),
        };
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());

        if let Err(err) = &result {
            CLIENT_REQUEST_ERRORS.click();
            tracing::warn!(method = %method, url = %url, error = %err, "request failed");
        }
        result
    }

    fn transport_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::timeout(
                format!("Request timed out: {}", e),
                Some(self.timeout.as_secs_f64()),
            )
        } else if e.is_connect() {
            Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
        } else {
            Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
        }
    }

    /// Convert a non-success response into an [`Error::Api`].
    ///
    /// The message is the body's `detail` string when present, otherwise the
    /// status reason phrase.
    async fn process_error_response(response: Response) -> Error {
        let status = response.status();
        let fallback = status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| status.as_u16().to_string());
        let message = match response.text().await {
            Ok(body) => ErrorBody::detail_from(&body).unwrap_or(fallback),
            Err(_) => fallback,
        };
        Error::api(status.as_u16(), message)
    }

    async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let body = response.bytes().await.map_err(|e| {
            Error::http_client(
                format!("Failed to read response: {}", e),
                Some(Box::new(e)),
            )
        })?;
        serde_json::from_slice(&body).map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)?;
    if url.cannot_be_a_base() {
        return Err(Error::url(format!("{raw} cannot be used as a base URL"), None));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
