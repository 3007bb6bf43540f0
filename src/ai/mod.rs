//! Remote image analysis
//!
//! Sends an instruction, an image and a question to a hosted multimodal model
//! and returns the generated text.

pub mod gemini;
pub mod mock;

pub use gemini::GeminiAnalysisClient;
pub use mock::MockAnalysisClient;

use crate::models::AnalysisRequest;
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// Issues exactly one remote call. Nothing is cached or retried.
    ///
    /// Every remote-side problem surfaces as [`crate::Error::AnalysisFailure`].
    async fn analyze(&self, request: &AnalysisRequest) -> Result<String>;

    /// Model identifier shown in front-end footers.
    fn model(&self) -> &str;
}
