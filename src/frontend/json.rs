use super::{error_message, Presenter, RenderContext};
use crate::models::AnalysisResult;
use crate::Error;
use serde_json::json;

/// Machine-readable output for scripts.
pub struct JsonPresenter;

impl Presenter for JsonPresenter {
    fn render_result(&self, result: &AnalysisResult, context: &RenderContext<'_>) -> String {
        let value = json!({
            "status": "ok",
            "model": context.model,
            "question": context.question,
            "text": result.text,
        });
        format!("{:#}\n", value)
    }

    fn render_error(&self, error: &Error, context: &RenderContext<'_>) -> String {
        let value = json!({
            "status": "error",
            "model": context.model,
            "kind": error.kind(),
            "message": error_message(error),
        });
        format!("{:#}\n", value)
    }
}
