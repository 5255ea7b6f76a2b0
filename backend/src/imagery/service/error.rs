//! Error types for imagery service operations.
//!
//! Every failure carries an [`ErrorContext`] naming the operation that was
//! running, so a failed render cycle can be traced back to the query,
//! composite or tile request that caused it.

use std::fmt;

/// Result type for imagery service operations
pub type ImageryResult<T> = Result<T, ImageryError>;

/// Structured context for imagery errors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorContext {
    /// The operation being performed (e.g., "query_images", "get_tile_handle")
    pub operation: Option<String>,
    /// The entity involved (e.g., "collection", "map", "token")
    pub entity: Option<String>,
    /// The entity ID if applicable
    pub entity_id: Option<String>,
    /// Additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Default::default()
        }
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    pub fn with_entity_id(mut self, id: impl ToString) -> Self {
        self.entity_id = Some(id.to_string());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(ref op) = self.operation {
            parts.push(format!("operation={}", op));
        }
        if let Some(ref entity) = self.entity {
            parts.push(format!("entity={}", entity));
        }
        if let Some(ref id) = self.entity_id {
            parts.push(format!("id={}", id));
        }
        if let Some(ref details) = self.details {
            parts.push(format!("details={}", details));
        }
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Failure talking to, or reported by, the imagery service.
///
/// None of these are retried locally; they end the current render cycle.
#[derive(Debug, thiserror::Error)]
pub enum ImageryError {
    /// Credentials rejected or token exchange failed.
    #[error("Authentication error: {message} {context}")]
    Authentication {
        message: String,
        context: ErrorContext,
    },

    /// Transport-level failure reaching the service.
    #[error("Connection error: {message} {context}")]
    Connection {
        message: String,
        context: ErrorContext,
    },

    /// Service usage quota or rate limit exceeded.
    #[error("Quota exceeded: {message} {context}")]
    QuotaExceeded {
        message: String,
        context: ErrorContext,
    },

    /// The service rejected or failed the request.
    #[error("Remote error: {message} {context}")]
    Remote {
        message: String,
        context: ErrorContext,
    },

    /// Response body could not be decoded into the expected shape.
    #[error("Malformed response: {message} {context}")]
    MalformedResponse {
        message: String,
        context: ErrorContext,
    },

    /// Requested map or image does not exist.
    #[error("Not found: {message} {context}")]
    NotFound {
        message: String,
        context: ErrorContext,
    },

    /// The backend cannot perform this operation.
    #[error("Unsupported: {message} {context}")]
    Unsupported {
        message: String,
        context: ErrorContext,
    },

    /// Configuration or initialization error.
    #[error("Configuration error: {message} {context}")]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    /// Internal/unexpected errors.
    #[error("Internal error: {message} {context}")]
    Internal {
        message: String,
        context: ErrorContext,
    },
}

impl ImageryError {
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn quota(message: impl Into<String>) -> Self {
        Self::QuotaExceeded {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn not_found_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::NotFound {
            message: message.into(),
            context,
        }
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn internal_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::Internal {
            message: message.into(),
            context,
        }
    }

    /// Short machine-readable code, used in API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Authentication { .. } => "AUTHENTICATION_ERROR",
            Self::Connection { .. } => "CONNECTION_ERROR",
            Self::QuotaExceeded { .. } => "QUOTA_EXCEEDED",
            Self::Remote { .. } => "REMOTE_ERROR",
            Self::MalformedResponse { .. } => "MALFORMED_RESPONSE",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Unsupported { .. } => "UNSUPPORTED",
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::Authentication { context, .. }
            | Self::Connection { context, .. }
            | Self::QuotaExceeded { context, .. }
            | Self::Remote { context, .. }
            | Self::MalformedResponse { context, .. }
            | Self::NotFound { context, .. }
            | Self::Unsupported { context, .. }
            | Self::Configuration { context, .. }
            | Self::Internal { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::Authentication { context, .. }
            | Self::Connection { context, .. }
            | Self::QuotaExceeded { context, .. }
            | Self::Remote { context, .. }
            | Self::MalformedResponse { context, .. }
            | Self::NotFound { context, .. }
            | Self::Unsupported { context, .. }
            | Self::Configuration { context, .. }
            | Self::Internal { context, .. } => context,
        }
    }

    /// Add or update the operation in the error context.
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.context_mut().operation = Some(operation.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.context_mut().details = Some(details.into());
        self
    }
}

impl From<crate::raster::RasterError> for ImageryError {
    fn from(err: crate::raster::RasterError) -> Self {
        match err {
            crate::raster::RasterError::InvalidTile { .. } => ImageryError::not_found_with_context(
                err.to_string(),
                ErrorContext::default().with_entity("tile"),
            ),
            _ => ImageryError::internal_with_context(
                err.to_string(),
                ErrorContext::default().with_entity("raster"),
            ),
        }
    }
}

#[cfg(feature = "earthengine")]
impl From<reqwest::Error> for ImageryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ImageryError::malformed(err.to_string())
        } else {
            ImageryError::connection(err.to_string())
        }
    }
}
