/// Convenience result type used across slidecast.
pub type SlidecastResult<T> = Result<T, SlidecastError>;

/// External collaborator that produced a [`SlidecastError::Service`] failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    /// Text-to-speech service.
    Speech,
    /// Translation service.
    Translation,
    /// Image generation service.
    ImageGeneration,
    /// Document + blob store.
    Store,
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Speech => "speech synthesis",
            Self::Translation => "translation",
            Self::ImageGeneration => "image generation",
            Self::Store => "content store",
        };
        f.write_str(name)
    }
}

/// Top-level error taxonomy used by library APIs.
#[derive(thiserror::Error, Debug)]
pub enum SlidecastError {
    /// Invalid user-provided input (slides, config, sizes).
    #[error("validation error: {0}")]
    Validation(String),

    /// A non-success answer from an external service.
    #[error("{service} service error: {message}")]
    Service {
        /// Which collaborator failed.
        service: ServiceKind,
        /// Status and body summary.
        message: String,
    },

    /// Local media write/mux/concatenate failure.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Store write failure after a valid final video exists.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SlidecastError {
    /// Build a [`SlidecastError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SlidecastError::Service`] value.
    pub fn service(service: ServiceKind, msg: impl Into<String>) -> Self {
        Self::Service {
            service,
            message: msg.into(),
        }
    }

    /// Build a [`SlidecastError::Encoding`] value.
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Build a [`SlidecastError::Persistence`] value.
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Build a [`SlidecastError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return `true` for failures reported by an external service.
    pub fn is_service(&self) -> bool {
        matches!(self, Self::Service { .. })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
