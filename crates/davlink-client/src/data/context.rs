//! Per-request transport context.

/// Opaque per-call context merged into the outgoing request.
///
/// The authentication layer lives outside this crate; whatever headers it
/// needs (tokens, cookies) travel here and are sent verbatim with the
/// exchange they were supplied for.
///
/// # Examples
///
/// ```
/// use davlink_client::RequestContext;
///
/// let ctx = RequestContext::new()
///     .header("Authorization", "Bearer token")
///     .header("X-Request-Id", "42");
/// assert_eq!(ctx.headers().len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    headers: Vec<(String, String)>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header sent with this request.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }
}
