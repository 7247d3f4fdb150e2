use uuid::Uuid;

/// Per-request correlation id.
///
/// Recorded on the request span by the tracing middleware and echoed back in
/// the `x-request-id` response header.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    /// UUIDv7, so ids sort by arrival time in logs.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for RequestId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}
