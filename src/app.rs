//! Application core: one user action in, one analysis (or one error) out.

use crate::ai::{AnalysisService, GeminiAnalysisClient};
use crate::config::Config;
use crate::image::{self, Upload};
use crate::models::{AnalysisRequest, AnalysisResult};
use crate::{prompts, Result};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

/// Wires the image preparer to an analysis backend.
///
/// Holds no per-request state, so a single instance can be shared by every
/// front-end.
pub struct App {
    analyzer: Box<dyn AnalysisService>,
    instruction: String,
}

impl App {
    /// Build an app around a concrete analysis backend.
    ///
    /// Integration tests and local harnesses use this to inject mocks.
    pub fn with_service(analyzer: Box<dyn AnalysisService>) -> Self {
        Self {
            analyzer,
            instruction: prompts::instruction().to_string(),
        }
    }

    /// Construct an app talking to Gemini as configured.
    pub fn from_config(config: &Config) -> Self {
        info!("Analysis provider: Gemini (model: {})", config.model);
        Self::with_service(Box::new(GeminiAnalysisClient::from_config(config)))
    }

    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = instruction.into();
        self
    }

    pub fn model(&self) -> &str {
        self.analyzer.model()
    }

    /// Prepare the upload, then ask the model.
    ///
    /// A missing upload fails before any network call is attempted.
    pub async fn analyze(&self, upload: Option<Upload>, question: &str) -> Result<AnalysisResult> {
        let request_id = Uuid::new_v4();
        let span = info_span!("analysis", %request_id);

        async move {
            let image = image::prepare(upload)?;
            info!(
                media_type = image.media_type(),
                bytes = image.len(),
                "Image prepared"
            );

            let request = AnalysisRequest::new(self.instruction.clone(), image, question);
            if request.is_degenerate() {
                warn!("Sending analysis request without instruction or question");
            }

            match self.analyzer.analyze(&request).await {
                Ok(text) => {
                    info!("Analysis complete");
                    Ok(AnalysisResult { text })
                }
                Err(e) => {
                    warn!("Analysis failed: {}", e);
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }
}
