//! Remote file and folder handles.
//!
//! A handle identifies one remote entity by URL plus the metadata last
//! seen for it. Handles are owned by the caller; the engine never touches
//! their state, except that a successful write refreshes the cached
//! metadata from the server's answer.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use tokio::io::AsyncWrite;

use crate::data::context::RequestContext;
use crate::data::progress::ProgressSink;
use crate::data::result::TransferResult;
use crate::effects::engine::{TransferEngine, WriterReceiver};
use crate::effects::http::{ByteStream, HttpExchange};
use crate::error::TransferError;

/// Metadata last seen for a remote entity.
#[derive(Debug, Clone, Default)]
pub struct RemoteMetadata {
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    pub created: Option<DateTime<Utc>>,
    /// Entity tag of the version this handle last saw; drives the
    /// conditional mode of the next write.
    pub etag: Option<String>,
}

/// Handle to a single remote file.
pub struct RemoteFile<C: HttpExchange> {
    engine: Arc<TransferEngine<C>>,
    url: String,
    metadata: RwLock<RemoteMetadata>,
}

impl<C: HttpExchange> RemoteFile<C> {
    pub fn new(
        engine: Arc<TransferEngine<C>>,
        url: impl Into<String>,
        metadata: RemoteMetadata,
    ) -> Self {
        Self {
            engine,
            url: url.into(),
            metadata: RwLock::new(metadata),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn content_type(&self) -> Option<String> {
        self.read_metadata().content_type
    }

    pub fn content_length(&self) -> Option<u64> {
        self.read_metadata().content_length
    }

    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.read_metadata().created
    }

    pub fn etag(&self) -> Option<String> {
        self.read_metadata().etag
    }

    fn read_metadata(&self) -> RemoteMetadata {
        self.metadata.read().expect("metadata lock poisoned").clone()
    }

    /// Stream the file's content into `out`.
    pub async fn download(
        &self,
        out: &mut (dyn AsyncWrite + Send + Unpin),
        progress: Option<Arc<dyn ProgressSink>>,
    ) -> Result<(), TransferError> {
        let mut receiver = WriterReceiver::new(out);
        self.engine
            .retrieve(&self.url, None, progress, &mut receiver, &RequestContext::new())
            .await
    }

    /// Replace the file's content, asserting against the version this
    /// handle last saw.
    ///
    /// With a cached entity tag the write is a guarded overwrite; without
    /// one it is a guarded create. A successful write refreshes the cached
    /// entity tag and length.
    pub async fn set_content(
        &self,
        content: ByteStream,
        content_length: Option<u64>,
        progress: Option<Arc<dyn ProgressSink>>,
    ) -> Result<TransferResult, TransferError> {
        let RemoteMetadata {
            content_type, etag, ..
        } = self.read_metadata();
        let result = self
            .engine
            .store(
                &self.url,
                content,
                content_length,
                content_type.as_deref(),
                etag.as_deref(),
                progress,
                &RequestContext::new(),
            )
            .await?;

        let mut metadata = self.metadata.write().expect("metadata lock poisoned");
        if result.etag.is_some() {
            metadata.etag = result.etag.clone();
        }
        metadata.content_length = content_length;
        Ok(result)
    }

    /// Delete the remote entity this handle points at.
    pub async fn delete(&self) -> Result<(), TransferError> {
        self.engine.delete(&self.url, &RequestContext::new()).await
    }
}

/// Handle to a remote collection, used as a copy/move destination.
pub struct RemoteFolder<C: HttpExchange> {
    engine: Arc<TransferEngine<C>>,
    url: String,
}

impl<C: HttpExchange> RemoteFolder<C> {
    pub fn new(engine: Arc<TransferEngine<C>>, url: impl Into<String>) -> Self {
        let mut url = url.into();
        if !url.ends_with('/') {
            url.push('/');
        }
        Self { engine, url }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// URL a child entry named `name` has inside this collection.
    pub fn child_url(&self, name: &str) -> String {
        format!("{}{}", self.url, name)
    }

    /// Handle to a file inside this collection.
    pub fn file(&self, name: &str, metadata: RemoteMetadata) -> RemoteFile<C> {
        RemoteFile::new(Arc::clone(&self.engine), self.child_url(name), metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::memory::MemoryExchange;
    use bytes::Bytes;
    use futures_util::stream;

    fn engine(exchange: &Arc<MemoryExchange>) -> Arc<TransferEngine<MemoryExchange>> {
        Arc::new(TransferEngine::new(Arc::clone(exchange), Vec::new()))
    }

    fn content(bytes: &'static [u8]) -> ByteStream {
        Box::pin(stream::iter(vec![Ok(Bytes::from_static(bytes))]))
    }

    #[tokio::test]
    async fn download_streams_into_the_writer() {
        let exchange = Arc::new(MemoryExchange::new());
        exchange.insert("mem:///docs/a.txt", "file body", None);
        let file = RemoteFile::new(
            engine(&exchange),
            "mem:///docs/a.txt",
            RemoteMetadata::default(),
        );

        let mut out = Vec::new();
        file.download(&mut out, None).await.unwrap();
        assert_eq!(out, b"file body");
    }

    #[tokio::test]
    async fn fresh_handle_creates_and_learns_its_tag() {
        let exchange = Arc::new(MemoryExchange::new());
        let file = RemoteFile::new(
            engine(&exchange),
            "mem:///docs/new.txt",
            RemoteMetadata::default(),
        );
        assert_eq!(file.etag(), None);

        file.set_content(content(b"v1"), Some(2), None).await.unwrap();

        // Create used the if-none-match guard and the handle now carries
        // the issued tag and length.
        let request = &exchange.requests()[0];
        assert!(
            request
                .headers
                .contains(&("If-None-Match".to_string(), "*".to_string()))
        );
        assert_eq!(file.etag(), exchange.etag_of("mem:///docs/new.txt"));
        assert_eq!(file.content_length(), Some(2));
    }

    #[tokio::test]
    async fn known_handle_overwrites_against_its_tag() {
        let exchange = Arc::new(MemoryExchange::new());
        let etag = exchange.insert("mem:///docs/a.txt", "v1", None);
        let file = RemoteFile::new(
            engine(&exchange),
            "mem:///docs/a.txt",
            RemoteMetadata {
                etag: Some(etag.clone()),
                ..RemoteMetadata::default()
            },
        );

        file.set_content(content(b"v2"), Some(2), None).await.unwrap();

        let request = &exchange.requests()[0];
        assert!(request.headers.contains(&("If-Match".to_string(), etag)));
        assert_eq!(exchange.body_of("mem:///docs/a.txt").unwrap(), "v2");
        // Tag refreshed to the new version.
        assert_eq!(file.etag(), exchange.etag_of("mem:///docs/a.txt"));
    }

    #[tokio::test]
    async fn stale_handle_surfaces_the_conflict() {
        let exchange = Arc::new(MemoryExchange::new());
        exchange.insert("mem:///docs/a.txt", "v1", None);
        let file = RemoteFile::new(
            engine(&exchange),
            "mem:///docs/a.txt",
            RemoteMetadata {
                etag: Some("\"stale\"".to_string()),
                ..RemoteMetadata::default()
            },
        );

        let result = file.set_content(content(b"v2"), Some(2), None).await;
        assert!(matches!(
            result,
            Err(TransferError::Status { code: 412, .. })
        ));
        // Losing the race leaves the remote content untouched.
        assert_eq!(exchange.body_of("mem:///docs/a.txt").unwrap(), "v1");
    }

    #[tokio::test]
    async fn delete_removes_the_entity() {
        let exchange = Arc::new(MemoryExchange::new());
        exchange.insert("mem:///docs/a.txt", "x", None);
        let file = RemoteFile::new(
            engine(&exchange),
            "mem:///docs/a.txt",
            RemoteMetadata::default(),
        );

        file.delete().await.unwrap();
        assert!(!exchange.contains("mem:///docs/a.txt"));

        let result = file.delete().await;
        assert!(matches!(result, Err(TransferError::NotFound { .. })));
    }

    #[test]
    fn folder_urls_gain_a_trailing_slash() {
        let exchange = Arc::new(MemoryExchange::new());
        let folder = RemoteFolder::new(engine(&exchange), "mem:///docs");
        assert_eq!(folder.url(), "mem:///docs/");
        assert_eq!(folder.child_url("a.txt"), "mem:///docs/a.txt");
    }
}
