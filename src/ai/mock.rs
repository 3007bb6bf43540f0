use super::AnalysisService;
use crate::models::AnalysisRequest;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// What the mock saw on its most recent call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub instruction: String,
    pub question: String,
    pub media_type: String,
    pub image_len: usize,
}

#[derive(Clone)]
pub struct MockAnalysisClient {
    responses: Arc<Mutex<Vec<String>>>,
    failure: Arc<Mutex<Option<String>>>,
    call_count: Arc<Mutex<usize>>,
    last_call: Arc<Mutex<Option<RecordedCall>>>,
    model: String,
}

impl MockAnalysisClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            failure: Arc::new(Mutex::new(None)),
            call_count: Arc::new(Mutex::new(0)),
            last_call: Arc::new(Mutex::new(None)),
            model: "mock-vision".to_string(),
        }
    }

    pub fn with_response(self, response: String) -> Self {
        self.responses.lock().unwrap().push(response);
        self
    }

    /// Every call fails with `AnalysisFailure(message)`.
    pub fn with_failure(self, message: String) -> Self {
        *self.failure.lock().unwrap() = Some(message);
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn last_call(&self) -> Option<RecordedCall> {
        self.last_call.lock().unwrap().clone()
    }
}

impl Default for MockAnalysisClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnalysisService for MockAnalysisClient {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<String> {
        let count = {
            let mut count = self.call_count.lock().unwrap();
            *count += 1;
            *count
        };

        *self.last_call.lock().unwrap() = Some(RecordedCall {
            instruction: request.instruction.clone(),
            question: request.question.clone(),
            media_type: request.image.media_type().to_string(),
            image_len: request.image.len(),
        });

        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(Error::AnalysisFailure(message));
        }

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(format!(
                "A {} image ({} bytes)",
                request.image.media_type(),
                request.image.len()
            ))
        } else {
            let index = (count - 1) % responses.len();
            Ok(responses[index].clone())
        }
    }

    fn model(&self) -> &str {
        &self.model
    }
}
