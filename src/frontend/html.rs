use super::{error_message, Presenter, RenderContext, RESULTS_HEADING, SUCCESS_NOTICE, TITLE};
use crate::image::mime::ALLOWED_EXTENSIONS;
use crate::models::AnalysisResult;
use crate::Error;
use escaper::encode_minimal;

const STYLESHEET: &str = include_str!("../../data/static/style.css");

/// Single-page web UI: upload form, preview, and the outcome below it.
#[derive(Debug, Clone)]
pub struct HtmlPresenter {
    action: String,
}

impl HtmlPresenter {
    pub fn new() -> Self {
        Self {
            action: "/analyze".to_string(),
        }
    }

    /// Empty form, shown before anything was submitted.
    pub fn render_form(&self, context: &RenderContext<'_>) -> String {
        self.page(context, "")
    }

    fn accept_attribute() -> String {
        ALLOWED_EXTENSIONS
            .iter()
            .map(|ext| format!(".{}", ext))
            .collect::<Vec<_>>()
            .join(",")
    }

    fn preview_section(context: &RenderContext<'_>) -> String {
        match context.preview {
            Some(preview) => format!(
                r#"<figure class="preview"><img src="{}" alt="Uploaded image"><figcaption>{}</figcaption></figure>"#,
                encode_minimal(&preview.data_uri),
                encode_minimal(&preview.caption)
            ),
            None => String::new(),
        }
    }

    fn page(&self, context: &RenderContext<'_>, outcome: &str) -> String {
        let formats = ALLOWED_EXTENSIONS
            .iter()
            .map(|ext| ext.to_ascii_uppercase())
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>
{style}</style>
</head>
<body>
<main class="main">
<h1>{title}</h1>
<form method="post" action="{action}" enctype="multipart/form-data">
<label for="question">What would you like to know about the image?</label>
<input type="text" id="question" name="question" placeholder="Enter your question here..." value="{question}">
<label for="image">Upload Image</label>
<input type="file" id="image" name="image" accept="{accept}" title="Supported formats: {formats}">
<small>Supported formats: {formats}</small>
<button type="submit">Analyze Image</button>
</form>
{preview}
{outcome}
<div class="footer">{footer}</div>
</main>
</body>
</html>
"#,
            title = TITLE,
            style = STYLESHEET,
            action = encode_minimal(&self.action),
            question = encode_minimal(context.question),
            accept = Self::accept_attribute(),
            formats = formats,
            preview = Self::preview_section(context),
            outcome = outcome,
            footer = encode_minimal(&context.footer()),
        )
    }
}

impl Default for HtmlPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Presenter for HtmlPresenter {
    fn render_result(&self, result: &AnalysisResult, context: &RenderContext<'_>) -> String {
        let outcome = format!(
            r#"<div class="notice success">{}</div>
<h3>{}</h3>
<blockquote class="result">{}</blockquote>"#,
            SUCCESS_NOTICE,
            RESULTS_HEADING,
            encode_minimal(result.text.trim())
        );
        self.page(context, &outcome)
    }

    fn render_error(&self, error: &Error, context: &RenderContext<'_>) -> String {
        let outcome = format!(
            r#"<div class="notice error" role="alert">{}</div>"#,
            encode_minimal(&error_message(error))
        );
        self.page(context, &outcome)
    }
}
