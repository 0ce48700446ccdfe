//! Client layer: owns the HTTP transport and maps status codes to outcomes.

use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use crate::domain::{Message, ServerToken, ValidationError};
use crate::transport::SenderDefaults;

/// Default `POST /email` endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.postmarkapp.com/email";

/// Plain-HTTP endpoint used by early Postmark integrations.
///
/// Not used unless passed to [`ServerBuilder::endpoint`].
pub const LEGACY_PLAINTEXT_ENDPOINT: &str = "http://api.postmarkapp.com/email";

const APPLICATION_JSON: &str = "application/json";
const HEADER_ACCEPT: &str = "Accept";
const HEADER_CONTENT_TYPE: &str = "Content-Type";

const STATUS_SUCCESS: u16 = 200;
const STATUS_UNAUTHORIZED: u16 = 401;
const STATUS_UNPROCESSABLE: u16 = 422;
const STATUS_INTERNAL_ERROR: u16 = 500;

/// Boxed future returned by [`HttpTransport`].
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Clone, PartialEq, Eq)]
/// A fully prepared POST request.
///
/// `Debug` masks the server token header.
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: Vec<u8>,
}

impl std::fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let headers = self
            .headers
            .iter()
            .map(|(name, value)| {
                if name.eq_ignore_ascii_case(ServerToken::HEADER) {
                    (*name, "***")
                } else {
                    (*name, value.as_str())
                }
            })
            .collect::<Vec<_>>();
        f.debug_struct("HttpRequest")
            .field("url", &self.url)
            .field("headers", &headers)
            .field("body", &String::from_utf8_lossy(&self.body))
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// HTTP facility used by [`Server`].
///
/// The default implementation is backed by `reqwest`. Supply your own through
/// [`ServerBuilder::transport`] to route requests elsewhere (e.g. in tests).
pub trait HttpTransport: Send + Sync {
    fn post<'a>(
        &'a self,
        request: HttpRequest,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
}

impl HttpTransport for ReqwestTransport {
    fn post<'a>(
        &'a self,
        request: HttpRequest,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move {
            let mut builder = self.client.post(&request.url);
            for (name, value) in request.headers {
                builder = builder.header(name, value);
            }
            let response = builder.body(request.body).send().await?;
            let status = response.status().as_u16();
            // Only the status decides the outcome; the body is best-effort.
            let body = match response.text().await {
                Ok(body) => body,
                Err(err) => {
                    tracing::debug!(status, error = %err, "could not read response body");
                    String::new()
                }
            };
            Ok(HttpResponse { status, body })
        })
    }
}

/// Lazily-built transport shared by every [`Server`] without its own.
///
/// Concurrent first callers race on the cell; the factory runs exactly once
/// and all of them observe the same handle.
pub(crate) struct SharedTransport {
    cell: OnceLock<Arc<dyn HttpTransport>>,
    init: fn() -> Arc<dyn HttpTransport>,
}

impl SharedTransport {
    pub(crate) const fn new(init: fn() -> Arc<dyn HttpTransport>) -> Self {
        Self {
            cell: OnceLock::new(),
            init,
        }
    }

    pub(crate) fn get(&self) -> Arc<dyn HttpTransport> {
        Arc::clone(self.cell.get_or_init(self.init))
    }
}

fn reqwest_transport() -> Arc<dyn HttpTransport> {
    Arc::new(ReqwestTransport {
        client: reqwest::Client::new(),
    })
}

static SHARED_TRANSPORT: SharedTransport = SharedTransport::new(reqwest_transport);

#[derive(Clone)]
enum TransportHandle {
    Shared(&'static SharedTransport),
    Owned(Arc<dyn HttpTransport>),
}

impl TransportHandle {
    fn get(&self) -> Arc<dyn HttpTransport> {
        match self {
            Self::Shared(shared) => shared.get(),
            Self::Owned(transport) => Arc::clone(transport),
        }
    }
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`Server`].
///
/// Status-derived variants carry the response body (when non-blank) for
/// diagnostics; the client itself never interprets it.
pub enum PostmarkError {
    /// The HTTP exchange could not be completed, or the message could not be
    /// serialized.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    /// HTTP 401: the server API token is missing or incorrect.
    #[error("the server API token is missing or incorrect")]
    Unauthorized { body: Option<String> },

    /// HTTP 422: the message is invalid.
    #[error("the message is invalid; check that all required fields are filled correctly")]
    Unprocessable { body: Option<String> },

    /// HTTP 500: Postmark reported an internal error.
    #[error("the Postmark server reported an internal error")]
    InternalServerError { body: Option<String> },

    /// Any status code without a dedicated variant.
    #[error("unknown HTTP response status: {status}")]
    UnknownResponse { status: u16, body: Option<String> },

    /// A value was rejected before any request was made, e.g. a blank token
    /// passed to [`Server::try_new`].
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl PostmarkError {
    /// HTTP status behind a status-derived error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(STATUS_UNAUTHORIZED),
            Self::Unprocessable { .. } => Some(STATUS_UNPROCESSABLE),
            Self::InternalServerError { .. } => Some(STATUS_INTERNAL_ERROR),
            Self::UnknownResponse { status, .. } => Some(*status),
            Self::Transport(_) | Self::Validation(_) => None,
        }
    }

    /// Response body behind a status-derived error, if it was not blank.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { body }
            | Self::Unprocessable { body }
            | Self::InternalServerError { body }
            | Self::UnknownResponse { body, .. } => body.as_deref(),
            Self::Transport(_) | Self::Validation(_) => None,
        }
    }

    /// Whether the failure is likely transient. The client never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::InternalServerError { .. })
    }

    /// Whether the failure indicates a bad server token.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

#[derive(Debug, Clone)]
/// Builder for [`Server`].
///
/// Setting a timeout or user-agent gives the server a dedicated HTTP client;
/// otherwise it uses the process-wide shared one.
pub struct ServerBuilder {
    token: ServerToken,
    default_from: Option<String>,
    default_reply_to: Option<String>,
    endpoint: String,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    transport: Option<ArcTransport>,
}

#[derive(Clone)]
struct ArcTransport(Arc<dyn HttpTransport>);

impl std::fmt::Debug for ArcTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("HttpTransport")
    }
}

impl ServerBuilder {
    /// Create a builder with the default endpoint and the shared transport.
    pub fn new(token: impl Into<ServerToken>) -> Self {
        Self {
            token: token.into(),
            default_from: None,
            default_reply_to: None,
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            timeout: None,
            user_agent: None,
            transport: None,
        }
    }

    /// Sender used when a message leaves `from` empty.
    pub fn default_from(mut self, from: impl Into<String>) -> Self {
        self.default_from = Some(from.into());
        self
    }

    /// Reply-to used when a message leaves `reply_to` empty.
    pub fn default_reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.default_reply_to = Some(reply_to.into());
        self
    }

    /// Override the `POST /email` endpoint URL.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set an HTTP client timeout applied to the entire request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Use a caller-provided transport. Takes precedence over `timeout` and
    /// `user_agent`.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(ArcTransport(transport));
        self
    }

    /// Build a [`Server`].
    pub fn build(self) -> Result<Server, PostmarkError> {
        let http = match self.transport {
            Some(ArcTransport(transport)) => TransportHandle::Owned(transport),
            None if self.timeout.is_none() && self.user_agent.is_none() => {
                TransportHandle::Shared(&SHARED_TRANSPORT)
            }
            None => {
                let mut builder = reqwest::Client::builder();
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }
                if let Some(user_agent) = self.user_agent {
                    builder = builder.user_agent(user_agent);
                }
                let client = builder
                    .build()
                    .map_err(|err| PostmarkError::Transport(Box::new(err)))?;
                TransportHandle::Owned(Arc::new(ReqwestTransport { client }))
            }
        };

        Ok(Server {
            token: self.token,
            default_from: self.default_from,
            default_reply_to: self.default_reply_to,
            endpoint: self.endpoint,
            http,
        })
    }
}

#[derive(Clone)]
/// Handle bound to one Postmark server token.
///
/// Cheap to clone and safe to share between tasks. Each send performs exactly
/// one `POST` and maps the status code:
///
/// | Status | Outcome |
/// |---|---|
/// | 200 | `Ok(())` |
/// | 401 | [`PostmarkError::Unauthorized`] |
/// | 422 | [`PostmarkError::Unprocessable`] |
/// | 500 | [`PostmarkError::InternalServerError`] |
/// | other | [`PostmarkError::UnknownResponse`] |
pub struct Server {
    token: ServerToken,
    default_from: Option<String>,
    default_reply_to: Option<String>,
    endpoint: String,
    http: TransportHandle,
}

impl Server {
    /// Create a server handle using the default endpoint and the shared
    /// transport.
    pub fn new(token: impl Into<ServerToken>) -> Self {
        Self {
            token: token.into(),
            default_from: None,
            default_reply_to: None,
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            http: TransportHandle::Shared(&SHARED_TRANSPORT),
        }
    }

    /// Like [`Server::new`], but rejects a token that is blank after trimming.
    pub fn try_new(token: impl Into<String>) -> Result<Self, PostmarkError> {
        Ok(Self::new(ServerToken::parse(token)?))
    }

    /// Start building a server with custom settings.
    pub fn builder(token: impl Into<ServerToken>) -> ServerBuilder {
        ServerBuilder::new(token)
    }

    pub fn token(&self) -> &ServerToken {
        &self.token
    }

    pub fn default_from(&self) -> Option<&str> {
        self.default_from.as_deref()
    }

    pub fn default_reply_to(&self) -> Option<&str> {
        self.default_reply_to.as_deref()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send a message with both a `text/plain` and a `text/html` body.
    pub async fn send_simple(
        &self,
        from: &str,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), PostmarkError> {
        let message = Message::simple(from, to, subject, html_body, text_body);
        self.send(&message).await
    }

    /// Send a message with only a `text/html` body.
    pub async fn send_simple_html(
        &self,
        from: &str,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), PostmarkError> {
        self.send_simple(from, to, subject, "", body).await
    }

    /// Send a message with only a `text/plain` body.
    pub async fn send_simple_text(
        &self,
        from: &str,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), PostmarkError> {
        self.send_simple(from, to, subject, body, "").await
    }

    /// Send a message through Postmark.
    ///
    /// Empty `from`/`reply_to` fields are filled from the server defaults in
    /// the request payload; `message` itself is left untouched.
    ///
    /// Errors:
    /// - [`PostmarkError::Transport`] when serialization or the HTTP exchange fails,
    /// - a status-derived variant for any response other than 200.
    pub async fn send(&self, message: &Message) -> Result<(), PostmarkError> {
        let defaults = SenderDefaults {
            from: self.default_from.as_deref(),
            reply_to: self.default_reply_to.as_deref(),
        };
        let body = crate::transport::encode_email_json(message, defaults)
            .map_err(|err| PostmarkError::Transport(Box::new(err)))?;

        let request = HttpRequest {
            url: self.endpoint.clone(),
            headers: vec![
                (HEADER_ACCEPT, APPLICATION_JSON.to_owned()),
                (HEADER_CONTENT_TYPE, APPLICATION_JSON.to_owned()),
                (ServerToken::HEADER, self.token.as_str().to_owned()),
            ],
            body,
        };

        tracing::debug!(
            endpoint = %self.endpoint,
            recipients = message.recipient_count(),
            "sending email"
        );

        let http = self.http.get();
        let response = http.post(request).await.map_err(PostmarkError::Transport)?;

        tracing::debug!(status = response.status, "postmark responded");

        status_outcome(response)
    }
}

fn status_outcome(response: HttpResponse) -> Result<(), PostmarkError> {
    let body = if response.body.trim().is_empty() {
        None
    } else {
        Some(response.body)
    };

    match response.status {
        STATUS_SUCCESS => Ok(()),
        STATUS_UNAUTHORIZED => Err(PostmarkError::Unauthorized { body }),
        STATUS_UNPROCESSABLE => Err(PostmarkError::Unprocessable { body }),
        STATUS_INTERNAL_ERROR => Err(PostmarkError::InternalServerError { body }),
        status => Err(PostmarkError::UnknownResponse { status, body }),
    }
}
