//! The transfer engine: one streaming GET or PUT against the remote
//! store, with lifecycle notification, progress reporting and
//! conditional-write semantics.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::core::range::{ByteRange, range_header_value, ranges_valid};
use crate::core::status::{declared_length, header_value, process_status};
use crate::data::context::RequestContext;
use crate::data::progress::ProgressSink;
use crate::data::result::TransferResult;
use crate::effects::http::{ByteStream, HttpExchange, Method, WireRequest};
use crate::effects::listener::{ConnectionListener, RequestNotifier};
use crate::effects::stream::{ContentStream, ProgressStream};
use crate::error::TransferError;

/// Consumer of retrieved content.
///
/// Invoked while the underlying connection is still open: the receiver
/// must fully consume or drop the stream before returning.
#[async_trait]
pub trait ContentReceiver: Send {
    async fn receive(&mut self, content: ContentStream) -> Result<(), TransferError>;
}

/// Receiver that drains the content into any async writer.
pub struct WriterReceiver<W> {
    writer: W,
}

impl<W> WriterReceiver<W>
where
    W: AsyncWrite + Send + Unpin,
{
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W> ContentReceiver for WriterReceiver<W>
where
    W: AsyncWrite + Send + Unpin,
{
    async fn receive(&mut self, mut content: ContentStream) -> Result<(), TransferError> {
        let url = content.url().to_string();
        while let Some(chunk) = content.next().await {
            let chunk = chunk?;
            self.writer
                .write_all(&chunk)
                .await
                .map_err(|source| TransferError::transport(&url, source))?;
        }
        Ok(())
    }
}

/// Orchestrates streaming exchanges against a remote store.
///
/// Retrievals on one engine are mutually exclusive: the retrieval lock is
/// held for the whole call, receiver consumption included, so two
/// retrievals never interleave on the shared connection. Stores are not
/// serialized; racing writers are arbitrated by the server through the
/// entity-tag preconditions, not locally.
pub struct TransferEngine<C: HttpExchange> {
    client: Arc<C>,
    notifier: RequestNotifier,
    retrieve_lock: Mutex<()>,
    timeout: RwLock<Option<Duration>>,
}

impl<C: HttpExchange> TransferEngine<C> {
    pub fn new(client: Arc<C>, listeners: Vec<Arc<dyn ConnectionListener>>) -> Self {
        Self {
            client,
            notifier: RequestNotifier::new(listeners),
            retrieve_lock: Mutex::new(()),
            timeout: RwLock::new(None),
        }
    }

    /// Per-request transport deadline. Applies to operations started after
    /// the change, never retroactively.
    pub fn timeout(&self) -> Option<Duration> {
        *self.timeout.read().expect("timeout lock poisoned")
    }

    pub fn set_timeout(&self, timeout: Option<Duration>) {
        *self.timeout.write().expect("timeout lock poisoned") = timeout;
    }

    /// Retrieve the entity at `url` and hand it to `receiver` while the
    /// connection is open.
    ///
    /// With `ranges`, the request asks for exactly those byte ranges, in
    /// order. A response without an entity is a degenerate success: it is
    /// logged and the receiver is never invoked.
    pub async fn retrieve(
        &self,
        url: &str,
        ranges: Option<&[ByteRange]>,
        progress: Option<Arc<dyn ProgressSink>>,
        receiver: &mut dyn ContentReceiver,
        ctx: &RequestContext,
    ) -> Result<(), TransferError> {
        tracing::trace!(url, "retrieve");
        // Exclusive for the whole exchange, receiver consumption included.
        let _serial = self.retrieve_lock.lock().await;
        let _request = self.notifier.guard();

        let mut headers: Vec<(String, String)> = ctx.headers().to_vec();
        if let Some(ranges) = ranges {
            if !ranges_valid(ranges) {
                return Err(TransferError::InvalidRanges);
            }
            headers.push(("Range".to_string(), range_header_value(ranges)));
        }

        let response = self
            .client
            .execute(WireRequest {
                method: Method::Get,
                url: url.to_string(),
                headers,
                body: None,
                timeout: self.timeout(),
            })
            .await
            .map_err(|source| classify(url, source, progress.as_deref()))?;

        let Some(body) = response.body else {
            tracing::warn!(url, "no response entity for GET");
            return Ok(());
        };
        process_status(response.status, url)?;

        let total = declared_length(&response.headers);
        let content = ProgressStream::new(body, total, url, progress.clone());
        match receiver.receive(content).await {
            Ok(()) => Ok(()),
            // Dropping the stream aborted the exchange; keep cancellation
            // distinguishable from transport failure.
            Err(error) => {
                if matches!(error, TransferError::Cancelled)
                    || progress.as_deref().is_some_and(|sink| sink.cancelled())
                {
                    Err(TransferError::Cancelled)
                } else {
                    Err(error)
                }
            }
        }
    }

    /// Store `content` at `url`.
    ///
    /// With `etag` the write asserts `If-Match` (plus `Overwrite: T`) so it
    /// only replaces the version the caller last saw. Without it the write
    /// asserts `If-None-Match: *` and fails if anything already exists at
    /// the URL. `content_length` is mandatory; its absence is rejected
    /// before any network call.
    #[allow(clippy::too_many_arguments)]
    pub async fn store(
        &self,
        url: &str,
        content: ByteStream,
        content_length: Option<u64>,
        content_type: Option<&str>,
        etag: Option<&str>,
        progress: Option<Arc<dyn ProgressSink>>,
        ctx: &RequestContext,
    ) -> Result<TransferResult, TransferError> {
        tracing::trace!(url, "store");
        let _request = self.notifier.guard();

        let mut headers: Vec<(String, String)> = ctx.headers().to_vec();
        match etag {
            // Overwrite only while the server still holds this exact
            // version.
            Some(tag) => {
                headers.push(("If-Match".to_string(), tag.to_string()));
                headers.push(("Overwrite".to_string(), "T".to_string()));
            }
            // Create only if nothing exists at this URL yet.
            None => headers.push(("If-None-Match".to_string(), "*".to_string())),
        }
        if let Some(content_type) = content_type {
            headers.push(("Content-Type".to_string(), content_type.to_string()));
        }

        let Some(length) = content_length else {
            return Err(TransferError::Precondition(
                "content length is required for store",
            ));
        };

        let body = ProgressStream::new(content, Some(length), url, progress.clone());
        let response = self
            .client
            .execute(WireRequest {
                method: Method::Put,
                url: url.to_string(),
                headers,
                body: Some((Box::pin(body), length)),
                timeout: self.timeout(),
            })
            .await
            .map_err(|source| classify(url, source, progress.as_deref()))?;

        process_status(response.status, url)?;
        let etag = header_value(&response.headers, "etag").map(str::to_string);
        let body = drain(url, response.body).await?;
        Ok(TransferResult {
            status: response.status,
            etag,
            body,
        })
    }

    /// Delete the entity at `url`.
    pub async fn delete(&self, url: &str, ctx: &RequestContext) -> Result<(), TransferError> {
        tracing::trace!(url, "delete");
        let _request = self.notifier.guard();

        let response = self
            .client
            .execute(WireRequest {
                method: Method::Delete,
                url: url.to_string(),
                headers: ctx.headers().to_vec(),
                body: None,
                timeout: self.timeout(),
            })
            .await
            .map_err(|source| classify(url, source, None))?;

        process_status(response.status, url)
    }
}

/// A failed exchange is a cancellation if the consumer raised it, a
/// transport failure otherwise.
fn classify<E>(url: &str, source: E, progress: Option<&dyn ProgressSink>) -> TransferError
where
    E: std::error::Error + Send + Sync + 'static,
{
    if progress.is_some_and(|sink| sink.cancelled()) {
        TransferError::Cancelled
    } else {
        TransferError::transport(url, source)
    }
}

/// Collect a small response entity, if the transport produced one.
async fn drain(url: &str, body: Option<ByteStream>) -> Result<Option<Bytes>, TransferError> {
    let Some(mut body) = body else {
        return Ok(None);
    };
    let mut collected = Vec::new();
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|source| TransferError::transport(url, source))?;
        collected.extend_from_slice(&chunk);
    }
    Ok(if collected.is_empty() {
        None
    } else {
        Some(Bytes::from(collected))
    })
}
