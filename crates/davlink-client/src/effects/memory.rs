//! In-memory transport for tests and examples.
//!
//! [`MemoryExchange`] speaks the same conditional-write protocol the
//! engine does, records every request it sees, and can shape its answers
//! (chunking, latency) to exercise streaming behavior without a network.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use bytes::Bytes;
use futures_util::stream;
use thiserror::Error;

use crate::core::status::header_value;
use crate::effects::http::{
    BodyStream, ByteStream, HttpExchange, Method, WireRequest, WireResponse,
};

/// Transport-level failure surfaced by the memory exchange, produced when
/// an outgoing body stream fails mid-drain.
#[derive(Debug, Error)]
#[error("memory transport failure: {0}")]
pub struct MemoryError(pub String);

/// One request as the exchange saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub timeout: Option<Duration>,
    /// Request entity; `None` when the exchange never consumed one
    /// (no body, or a precondition was rejected from the headers alone).
    pub body: Option<Vec<u8>>,
}

struct Entry {
    body: Bytes,
    etag: String,
    content_type: Option<String>,
}

/// An [`HttpExchange`] backed by an in-memory map.
///
/// Writes honor `If-Match` / `If-None-Match: *` preconditions and answer
/// 412 on violation, before touching the request body. Reads serve the
/// whole entity; byte ranges are accepted but not sliced.
#[derive(Default)]
pub struct MemoryExchange {
    entries: Mutex<HashMap<String, Entry>>,
    requests: Mutex<Vec<RecordedRequest>>,
    next_version: AtomicU64,
    /// 0 means the whole entity in one chunk.
    chunk_size: AtomicUsize,
    latency: Mutex<Option<Duration>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MemoryExchange {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an entity and return the entity tag issued for it.
    pub fn insert(
        &self,
        url: impl Into<String>,
        body: impl Into<Bytes>,
        content_type: Option<&str>,
    ) -> String {
        let etag = self.issue_etag();
        self.entries.lock().unwrap().insert(
            url.into(),
            Entry {
                body: body.into(),
                etag: etag.clone(),
                content_type: content_type.map(str::to_string),
            },
        );
        etag
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries.lock().unwrap().contains_key(url)
    }

    pub fn body_of(&self, url: &str) -> Option<Bytes> {
        self.entries
            .lock()
            .unwrap()
            .get(url)
            .map(|entry| entry.body.clone())
    }

    pub fn etag_of(&self, url: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap()
            .get(url)
            .map(|entry| entry.etag.clone())
    }

    /// Everything executed so far, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Serve GET bodies in chunks of `size` bytes.
    pub fn set_chunk_size(&self, size: usize) {
        self.chunk_size.store(size, Ordering::SeqCst);
    }

    /// Hold every exchange open for `latency` before answering.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = Some(latency);
    }

    /// Highest number of exchanges that were ever in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn issue_etag(&self) -> String {
        format!("\"v{}\"", self.next_version.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn serve_get(&self, url: &str) -> WireResponse {
        let entries = self.entries.lock().unwrap();
        match entries.get(url) {
            Some(entry) => {
                let mut headers = vec![
                    ("ETag".to_string(), entry.etag.clone()),
                    ("Content-Length".to_string(), entry.body.len().to_string()),
                ];
                if let Some(content_type) = &entry.content_type {
                    headers.push(("Content-Type".to_string(), content_type.clone()));
                }
                WireResponse {
                    status: 200,
                    headers,
                    body: Some(chunked(
                        entry.body.clone(),
                        self.chunk_size.load(Ordering::SeqCst),
                    )),
                }
            }
            None => status_response(404),
        }
    }

    fn serve_delete(&self, url: &str) -> WireResponse {
        match self.entries.lock().unwrap().remove(url) {
            Some(_) => status_response(204),
            None => status_response(404),
        }
    }

    async fn serve_put(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: Option<(BodyStream, u64)>,
        record: &mut RecordedRequest,
    ) -> Result<WireResponse, MemoryError> {
        use futures_util::StreamExt;

        let exists = self.contains(url);
        let precondition_ok = match (
            header_value(headers, "if-match"),
            header_value(headers, "if-none-match"),
        ) {
            (Some(tag), _) => self.etag_of(url).is_some_and(|etag| etag == tag),
            (None, Some("*")) => !exists,
            _ => true,
        };
        if !precondition_ok {
            return Ok(status_response(412));
        }

        let Some((mut stream, _length)) = body else {
            return Ok(status_response(400));
        };
        let mut content = Vec::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|error| MemoryError(error.to_string()))?;
            content.extend_from_slice(&chunk);
        }
        record.body = Some(content.clone());

        let etag = self.issue_etag();
        self.entries.lock().unwrap().insert(
            url.to_string(),
            Entry {
                body: Bytes::from(content),
                etag: etag.clone(),
                content_type: header_value(headers, "content-type").map(str::to_string),
            },
        );
        Ok(WireResponse {
            status: if exists { 204 } else { 201 },
            headers: vec![("ETag".to_string(), etag)],
            body: None,
        })
    }
}

impl HttpExchange for MemoryExchange {
    type Error = MemoryError;

    async fn execute(&self, request: WireRequest) -> Result<WireResponse, Self::Error> {
        let _gauge = Gauge::enter(&self.in_flight, &self.max_in_flight);
        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let WireRequest {
            method,
            url,
            headers,
            body,
            timeout,
        } = request;
        let mut record = RecordedRequest {
            method,
            url: url.clone(),
            headers: headers.clone(),
            timeout,
            body: None,
        };

        let outcome = match method {
            Method::Get => Ok(self.serve_get(&url)),
            Method::Delete => Ok(self.serve_delete(&url)),
            Method::Put => self.serve_put(&url, &headers, body, &mut record).await,
        };

        self.requests.lock().unwrap().push(record);
        outcome
    }
}

/// Error responses still carry an (empty) entity, like real servers.
fn status_response(status: u16) -> WireResponse {
    WireResponse {
        status,
        headers: Vec::new(),
        body: Some(Box::pin(stream::empty())),
    }
}

fn chunked(body: Bytes, chunk_size: usize) -> ByteStream {
    let size = if chunk_size == 0 {
        body.len().max(1)
    } else {
        chunk_size
    };
    let mut parts: Vec<std::io::Result<Bytes>> = Vec::new();
    let mut rest = body;
    while rest.len() > size {
        parts.push(Ok(rest.split_to(size)));
    }
    parts.push(Ok(rest));
    Box::pin(stream::iter(parts))
}

struct Gauge<'a> {
    current: &'a AtomicUsize,
}

impl<'a> Gauge<'a> {
    fn enter(current: &'a AtomicUsize, max: &AtomicUsize) -> Self {
        let now = current.fetch_add(1, Ordering::SeqCst) + 1;
        max.fetch_max(now, Ordering::SeqCst);
        Self { current }
    }
}

impl Drop for Gauge<'_> {
    fn drop(&mut self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_etags_are_unique() {
        let exchange = MemoryExchange::new();
        let first = exchange.insert("mem:///a", "a", None);
        let second = exchange.insert("mem:///b", "b", None);
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn get_of_seeded_entry_serves_body_and_tag() {
        use futures_util::StreamExt;

        let exchange = MemoryExchange::new();
        let etag = exchange.insert("mem:///a", "payload", Some("text/plain"));

        let response = exchange
            .execute(WireRequest {
                method: Method::Get,
                url: "mem:///a".to_string(),
                headers: Vec::new(),
                body: None,
                timeout: None,
            })
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert!(response.headers.contains(&("ETag".to_string(), etag)));

        let mut body = response.body.unwrap();
        let mut collected = Vec::new();
        while let Some(chunk) = body.next().await {
            collected.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(collected, b"payload");
    }

    #[tokio::test]
    async fn delete_twice_answers_404_the_second_time() {
        let exchange = MemoryExchange::new();
        exchange.insert("mem:///a", "x", None);

        let request = |url: &str| WireRequest {
            method: Method::Delete,
            url: url.to_string(),
            headers: Vec::new(),
            body: None,
            timeout: None,
        };

        let first = exchange.execute(request("mem:///a")).await.unwrap();
        assert_eq!(first.status, 204);
        let second = exchange.execute(request("mem:///a")).await.unwrap();
        assert_eq!(second.status, 404);
    }
}
