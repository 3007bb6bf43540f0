//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// No usable image was supplied. Raised locally, before any network call.
    #[error("Missing input: {0}")]
    MissingInput(String),

    /// The remote analysis call failed (transport, auth, quota or content policy).
    #[error("Analysis failed: {0}")]
    AnalysisFailure(String),

    #[error("Unsupported image type: {0}")]
    UnsupportedMediaType(String),

    /// The submitted upload exceeds the accepted size.
    #[error("Upload too large: {0}")]
    PayloadTooLarge(String),

    /// A submission arrived but could not be read.
    #[error("Could not read upload: {0}")]
    InvalidUpload(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),
}

impl Error {
    /// Stable machine-readable name for the error, used by structured front-ends.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::MissingInput(_) => "missing_input",
            Error::AnalysisFailure(_) => "analysis_failure",
            Error::UnsupportedMediaType(_) => "unsupported_media_type",
            Error::PayloadTooLarge(_) => "payload_too_large",
            Error::InvalidUpload(_) => "invalid_upload",
            Error::Config(_) => "configuration",
            Error::Io(_) => "io",
            Error::Image(_) => "image",
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::AnalysisFailure(error_chain(&e))
    }
}

/// Joins an error and each of its sources into one message, skipping levels
/// whose text is already part of the message.
pub(crate) fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !text.is_empty() && !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_input_message() {
        let err = Error::MissingInput("No file uploaded".to_string());
        assert_eq!(err.to_string(), "Missing input: No file uploaded");
    }

    #[test]
    fn test_analysis_failure_keeps_cause_text() {
        let err = Error::AnalysisFailure("API key not valid".to_string());
        assert!(err.to_string().contains("API key not valid"));
        assert_eq!(err.kind(), "analysis_failure");
    }

    #[derive(Debug, Error)]
    #[error("{message}")]
    struct Layer {
        message: &'static str,
        #[source]
        source: Option<Box<Layer>>,
    }

    fn layer(message: &'static str, source: Option<Layer>) -> Layer {
        Layer {
            message,
            source: source.map(Box::new),
        }
    }

    #[test]
    fn test_error_chain_includes_every_cause() {
        let err = layer(
            "error sending request",
            Some(layer(
                "client error (Connect)",
                Some(layer("tcp connect error: Connection refused", None)),
            )),
        );
        assert_eq!(
            error_chain(&err),
            "error sending request: client error (Connect): tcp connect error: Connection refused"
        );
    }

    #[test]
    fn test_error_chain_skips_repeated_text() {
        let err = layer("timed out: deadline has elapsed", Some(layer("deadline has elapsed", None)));
        assert_eq!(error_chain(&err), "timed out: deadline has elapsed");
    }

    #[tokio::test]
    async fn test_reqwest_error_keeps_connect_cause() {
        // Nothing listens on port 1.
        let e = reqwest::Client::new()
            .get("http://127.0.0.1:1/")
            .send()
            .await
            .unwrap_err();
        let err = Error::from(e);
        assert_eq!(err.kind(), "analysis_failure");
        assert!(err.to_string().to_lowercase().contains("refused"));
    }
}
