use axum::http::HeaderValue;
use uuid::Uuid;

/// Header carrying the request correlation id in both directions.
pub const CORRELATION_HEADER: &str = "x-correlation-id";

const MAX_CORRELATION_LEN: usize = 128;

/// Correlation id for a request.
///
/// Taken from the caller's `x-correlation-id` header when it is usable,
/// otherwise generated. Present on every request that passed the
/// correlation middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationId(String);

impl CorrelationId {
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Accept a caller-supplied id if it is short, non-empty, visible ASCII.
    pub fn from_header(value: &HeaderValue) -> Option<Self> {
        let s = value.to_str().ok()?.trim();
        if s.is_empty() || s.len() > MAX_CORRELATION_LEN || !s.bytes().all(|b| b.is_ascii_graphic()) {
            return None;
        }
        Some(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
