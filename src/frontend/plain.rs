use super::{error_message, Presenter, RenderContext, SUCCESS_NOTICE};
use crate::models::AnalysisResult;
use crate::Error;

/// Bare terminal output.
pub struct PlainPresenter;

impl Presenter for PlainPresenter {
    fn render_result(&self, result: &AnalysisResult, context: &RenderContext<'_>) -> String {
        let mut out = String::new();
        if let Some(preview) = context.preview {
            out.push_str(&preview.caption);
            out.push('\n');
        }
        out.push_str(SUCCESS_NOTICE);
        out.push_str("\n\n");
        out.push_str(result.text.trim_end());
        out.push('\n');
        out
    }

    fn render_error(&self, error: &Error, _context: &RenderContext<'_>) -> String {
        format!("{}\n", error_message(error))
    }
}
