use std::future::Future;
use std::io;
use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use futures_util::Stream;

use crate::error::TransferError;

/// A boxed stream type for HTTP bodies.
///
/// This type alias simplifies the stream types used throughout the crate.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// Raw body chunks as the transport yields or accepts them.
pub type ByteStream = BoxStream<'static, io::Result<Bytes>>;

/// Outgoing body chunks, already wrapped for progress and cancellation.
pub type BodyStream = BoxStream<'static, Result<Bytes, TransferError>>;

/// HTTP methods the transfer layer issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
    Delete,
}

/// One wire-level exchange, fully described.
pub struct WireRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// Outgoing entity and its declared length.
    pub body: Option<(BodyStream, u64)>,
    /// Transport deadline for this exchange, if configured.
    pub timeout: Option<Duration>,
}

/// The transport's answer, headers unparsed.
pub struct WireResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    /// Response entity; `None` when the server sent no body at all.
    pub body: Option<ByteStream>,
}

/// Asynchronous transport abstraction.
///
/// The engine describes an exchange; implementations own connection
/// pooling, TLS and redirect handling, and map their own failures to
/// [`HttpExchange::Error`].
///
/// # Implementations
///
/// - [`ReqwestExchange`]: production implementation using `reqwest`
/// - [`MemoryExchange`](crate::MemoryExchange): in-memory store for tests
pub trait HttpExchange: Send + Sync {
    /// Error type for transport-level failures.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Execute one request and return the raw response.
    ///
    /// A returned error means the exchange failed below the HTTP layer
    /// (DNS, connection, aborted body). HTTP-level outcomes come back as
    /// a [`WireResponse`] whatever the status code.
    fn execute(
        &self,
        request: WireRequest,
    ) -> impl Future<Output = Result<WireResponse, Self::Error>> + Send;
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use super::*;
    use futures_util::TryStreamExt;

    /// Production transport implementation using reqwest.
    pub struct ReqwestExchange {
        client: reqwest::Client,
    }

    impl ReqwestExchange {
        /// Create a new exchange with default client configuration.
        pub fn new() -> Result<Self, reqwest::Error> {
            Ok(Self {
                client: reqwest::Client::builder().build()?,
            })
        }

        /// Wrap an already-configured client (proxies, pools, TLS).
        pub fn with_client(client: reqwest::Client) -> Self {
            Self { client }
        }
    }

    impl HttpExchange for ReqwestExchange {
        type Error = reqwest::Error;

        async fn execute(&self, request: WireRequest) -> Result<WireResponse, Self::Error> {
            let method = match request.method {
                Method::Get => reqwest::Method::GET,
                Method::Put => reqwest::Method::PUT,
                Method::Delete => reqwest::Method::DELETE,
            };

            let mut builder = self.client.request(method, &request.url);
            for (key, value) in &request.headers {
                builder = builder.header(key, value);
            }
            if let Some(timeout) = request.timeout {
                builder = builder.timeout(timeout);
            }
            if let Some((body, length)) = request.body {
                builder = builder
                    .header(reqwest::header::CONTENT_LENGTH, length)
                    .body(reqwest::Body::wrap_stream(body));
            }

            let response = builder.send().await?;
            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(key, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|value| (key.as_str().to_string(), value.to_string()))
                })
                .collect();
            let body: ByteStream = Box::pin(response.bytes_stream().map_err(io::Error::other));

            Ok(WireResponse {
                status,
                headers,
                body: Some(body),
            })
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestExchange;
