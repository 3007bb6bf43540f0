//! Data models for a single analysis round trip.

use crate::image::ImagePayload;

/// One user-triggered analysis. Owned by the invocation that issues it.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub instruction: String,
    pub question: String,
    pub image: ImagePayload,
}

impl AnalysisRequest {
    pub fn new(
        instruction: impl Into<String>,
        image: ImagePayload,
        question: impl Into<String>,
    ) -> Self {
        Self {
            instruction: instruction.into(),
            question: question.into(),
            image,
        }
    }

    /// True when neither instruction nor question carry any text.
    pub fn is_degenerate(&self) -> bool {
        self.instruction.trim().is_empty() && self.question.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResult {
    pub text: String,
}
