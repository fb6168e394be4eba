//! Progress-reporting stream wrapper.
//!
//! Wraps a body stream so every chunk is counted and reported to a
//! [`ProgressSink`], and the consumer can abort the exchange between
//! chunks.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_util::Stream;

use crate::data::progress::{Progress, ProgressSink};
use crate::effects::http::ByteStream;
use crate::error::TransferError;

/// A stream that reports cumulative bytes to a [`ProgressSink`].
///
/// Cancellation raised by the sink terminates the stream with
/// [`TransferError::Cancelled`]; a transport error from the inner stream
/// surfaces as [`TransferError::Transport`]. After either, the stream is
/// fused and yields nothing further.
pub struct ProgressStream<S> {
    inner: S,
    url: String,
    total: Option<u64>,
    transferred: u64,
    sink: Option<Arc<dyn ProgressSink>>,
    done: bool,
}

impl<S> ProgressStream<S>
where
    S: Stream<Item = std::io::Result<Bytes>> + Unpin,
{
    pub fn new(
        inner: S,
        total: Option<u64>,
        url: impl Into<String>,
        sink: Option<Arc<dyn ProgressSink>>,
    ) -> Self {
        Self {
            inner,
            url: url.into(),
            total,
            transferred: 0,
            sink,
            done: false,
        }
    }

    /// URL of the exchange this stream belongs to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Total entity length declared by the peer, if any.
    pub fn total(&self) -> Option<u64> {
        self.total
    }

    /// Bytes forwarded so far.
    pub fn transferred(&self) -> u64 {
        self.transferred
    }
}

impl<S> Stream for ProgressStream<S>
where
    S: Stream<Item = std::io::Result<Bytes>> + Unpin,
{
    type Item = Result<Bytes, TransferError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if this.done {
            return Poll::Ready(None);
        }

        if let Some(sink) = &this.sink
            && sink.cancelled()
        {
            this.done = true;
            return Poll::Ready(Some(Err(TransferError::Cancelled)));
        }

        match Pin::new(&mut this.inner).poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                this.transferred += chunk.len() as u64;
                if let Some(sink) = &this.sink {
                    sink.on_progress(Progress {
                        bytes_transferred: this.transferred,
                        total_bytes: this.total,
                    });
                }
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(source))) => {
                this.done = true;
                Poll::Ready(Some(Err(TransferError::transport(&this.url, source))))
            }
            Poll::Ready(None) => {
                this.done = true;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// The content stream handed to a retrieval receiver.
pub type ContentStream = ProgressStream<ByteStream>;
