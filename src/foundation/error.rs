/// Convenience result type used across picstitch.
pub type StitchResult<T> = Result<T, StitchError>;

/// Top-level error taxonomy used by merge APIs.
#[derive(thiserror::Error, Debug)]
pub enum StitchError {
    /// Caller-supplied options or template data failed declared constraints.
    #[error("validation error: {0}")]
    Validation(String),

    /// Raster conditions with a recognizable meaning in this domain, such as
    /// an encoded output exceeding the chosen format's size limit.
    #[error("image error: {0}")]
    Image(String),

    /// Violated stage preconditions or unclassified raster failures. Always a
    /// defect signal; the original cause is preserved for diagnostics.
    #[error("internal error: {message}")]
    Internal {
        /// Human-readable description of the defect.
        message: String,
        /// Underlying fault, when one exists.
        #[source]
        cause: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl StitchError {
    /// Build a [`StitchError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StitchError::Image`] value.
    pub fn image(msg: impl Into<String>) -> Self {
        Self::Image(msg.into())
    }

    /// Build a [`StitchError::Internal`] value without an underlying cause.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal {
            message: msg.into(),
            cause: None,
        }
    }

    /// Build a [`StitchError::Internal`] value wrapping an underlying cause.
    pub fn internal_with(
        msg: impl Into<String>,
        cause: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Internal {
            message: msg.into(),
            cause: Some(cause.into()),
        }
    }
}

impl From<anyhow::Error> for StitchError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal {
            message: "an internal error has occurred".to_string(),
            cause: Some(err.into()),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
