//! Interchangeable presentation layers
//!
//! Every front-end renders the same two outcomes of [`crate::app::App::analyze`]:
//! the analysis text or a single error notice. Presenters only format; they
//! never call the model or touch the upload.

pub mod html;
pub mod json;
pub mod markdown;
pub mod plain;

pub use html::HtmlPresenter;
pub use json::JsonPresenter;
pub use markdown::MarkdownPresenter;
pub use plain::PlainPresenter;

use crate::image::{self, Upload};
use crate::models::AnalysisResult;
use crate::Error;

pub const TITLE: &str = "Advanced Image Analysis Assistant";
pub const SUCCESS_NOTICE: &str = "Analysis Complete!";
pub const RESULTS_HEADING: &str = "Analysis Results";

/// Everything a presenter may show besides the outcome itself.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub model: &'a str,
    pub question: &'a str,
    pub preview: Option<&'a PreviewImage>,
}

impl<'a> RenderContext<'a> {
    pub fn new(model: &'a str, question: &'a str) -> Self {
        Self {
            model,
            question,
            preview: None,
        }
    }

    pub fn with_preview(mut self, preview: Option<&'a PreviewImage>) -> Self {
        self.preview = preview;
        self
    }

    pub fn footer(&self) -> String {
        format!("Powered by Google Gemini ({})", self.model)
    }
}

/// Preview of the uploaded image.
#[derive(Debug, Clone)]
pub struct PreviewImage {
    pub data_uri: String,
    pub caption: String,
}

impl PreviewImage {
    /// Returns `None` when the bytes cannot be read as an image; analysis
    /// still goes ahead in that case.
    pub fn from_upload(upload: &Upload) -> Option<Self> {
        match image::inspect(&upload.bytes) {
            Ok(preview) => Some(Self {
                data_uri: upload.to_data_uri(),
                caption: preview.caption(),
            }),
            Err(e) => {
                tracing::warn!("Could not build image preview: {}", e);
                None
            }
        }
    }
}

pub trait Presenter: Send + Sync {
    fn render_result(&self, result: &AnalysisResult, context: &RenderContext<'_>) -> String;
    fn render_error(&self, error: &Error, context: &RenderContext<'_>) -> String;
}

/// Output formats offered on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    Plain,
    Markdown,
    Json,
    Html,
}

pub fn presenter_for(format: Format) -> Box<dyn Presenter> {
    match format {
        Format::Plain => Box::new(PlainPresenter),
        Format::Markdown => Box::new(MarkdownPresenter),
        Format::Json => Box::new(JsonPresenter),
        Format::Html => Box::new(HtmlPresenter::new()),
    }
}

/// The message shown inside an error notice.
pub fn error_message(error: &Error) -> String {
    format!("An error occurred: {}", error)
}
