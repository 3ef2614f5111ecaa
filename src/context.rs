use std::fmt;

use uuid::Uuid;

use crate::error::MetadataError;

const LOG_TARGET: &str = "metadata";

/// Request-scoped logging context threaded through every backend call.
///
/// It carries no cancellation; the request id only correlates log lines
/// emitted by the backend with the request that triggered them.
#[derive(Debug, Clone)]
pub struct Context {
    request_id: String,
}

impl Context {
    pub fn new() -> Self {
        Self { request_id: Uuid::now_v7().to_string() }
    }

    pub fn with_request_id(request_id: impl Into<String>) -> Self {
        Self { request_id: request_id.into() }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Logs `err` at warning level and hands it back.
    pub fn warning(&self, err: MetadataError) -> MetadataError {
        log::warn!(target: LOG_TARGET, "[{}] {}", self.request_id, err);
        err
    }

    /// Converts `err`, logs it prefixed with `action` and hands it back.
    pub fn fail(&self, action: &str, err: impl Into<MetadataError>) -> MetadataError {
        let err = err.into();
        log::warn!(target: LOG_TARGET, "[{}] {} : {}", self.request_id, action, err);
        err
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        log::debug!(target: LOG_TARGET, "[{}] {}", self.request_id, args);
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
