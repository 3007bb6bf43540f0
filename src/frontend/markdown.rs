use super::{error_message, Presenter, RenderContext, RESULTS_HEADING, SUCCESS_NOTICE};
use crate::models::AnalysisResult;
use crate::Error;

/// Markdown with the answer as a block quote.
pub struct MarkdownPresenter;

impl MarkdownPresenter {
    fn quote(text: &str) -> String {
        text.trim_end()
            .lines()
            .map(|line| {
                if line.is_empty() {
                    ">".to_string()
                } else {
                    format!("> {}", line)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Presenter for MarkdownPresenter {
    fn render_result(&self, result: &AnalysisResult, context: &RenderContext<'_>) -> String {
        let mut out = format!("**{}**\n\n### {}\n\n", SUCCESS_NOTICE, RESULTS_HEADING);
        if !context.question.trim().is_empty() {
            out.push_str(&format!("_Question:_ {}\n\n", context.question.trim()));
        }
        out.push_str(&Self::quote(&result.text));
        out.push_str(&format!("\n\n---\n_{}_\n", context.footer()));
        out
    }

    fn render_error(&self, error: &Error, _context: &RenderContext<'_>) -> String {
        format!("> **Error:** {}\n", error_message(error))
    }
}
