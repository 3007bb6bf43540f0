use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentRequest, GenerateContentResponse, InlineData, Part};
use crate::ai::AnalysisService;
use crate::config::Config;
use crate::models::AnalysisRequest;
use crate::{Error, Result};
use async_trait::async_trait;

pub struct GeminiAnalysisClient {
    http: GeminiHttpClient,
}

impl GeminiAnalysisClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(api_key, model, client),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            http: GeminiHttpClient::new(config.api_key.clone(), config.model.clone())
                .with_base_url(config.base_url.clone())
                .with_timeout(config.timeout),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    /// Parts in the order the model sees them: instruction, image, question.
    fn build_request(request: &AnalysisRequest) -> GenerateContentRequest {
        let mut parts = Vec::with_capacity(3);

        if !request.instruction.trim().is_empty() {
            parts.push(Part::Text {
                text: request.instruction.clone(),
            });
        }
        parts.push(Part::InlineData {
            inline_data: InlineData {
                mime_type: request.image.media_type().to_string(),
                data: request.image.to_base64(),
            },
        });
        // Gemini rejects empty text parts.
        if !request.question.trim().is_empty() {
            parts.push(Part::Text {
                text: request.question.clone(),
            });
        }

        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
        }
    }

    /// Joins the text parts of the first candidate.
    fn extract_text(response: GenerateContentResponse) -> Result<String> {
        if let Some(reason) = response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            return Err(Error::AnalysisFailure(format!(
                "Request was blocked by Gemini (reason: {})",
                reason
            )));
        }

        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| Error::AnalysisFailure("No candidates in Gemini response".to_string()))?;

        let text: String = candidate
            .content
            .map(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|p| match p {
                Part::Text { text } => Some(text),
                _ => None,
            })
            .collect();

        if text.is_empty() {
            let reason = candidate.finish_reason.as_deref().unwrap_or("UNKNOWN");
            return Err(Error::AnalysisFailure(format!(
                "Gemini returned no text (finish reason: {})",
                reason
            )));
        }

        Ok(text)
    }
}

#[async_trait]
impl AnalysisService for GeminiAnalysisClient {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<String> {
        tracing::debug!(
            "Analyzing {} image ({} bytes) with {}",
            request.image.media_type(),
            request.image.len(),
            self.http.model()
        );

        let body = Self::build_request(request);
        let response: GenerateContentResponse = self.http.generate_content(&body).await?;
        let text = Self::extract_text(response)?;

        tracing::info!("Gemini analysis returned {} characters", text.len());
        Ok(text)
    }

    fn model(&self) -> &str {
        self.http.model()
    }
}
