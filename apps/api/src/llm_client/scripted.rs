//! Scripted gateway for tests: canned completions keyed by prompt fragment.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{CompletionError, CompletionGateway, CompletionRequest, CompletionResponse};

/// A deterministic `CompletionGateway` double.
///
/// Rules are checked in insertion order; the first rule whose fragment appears in the
/// prompt wins. Prompts containing any configured failure marker fail with a 503 `Api` error.
/// A matching delay is slept before the reply, which lets tests reorder completions.
pub struct ScriptedGateway {
    available: bool,
    rules: Vec<(String, String)>,
    delays: Vec<(String, Duration)>,
    fallback: String,
    failure_markers: Vec<String>,
    calls: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self {
            available: true,
            rules: Vec::new(),
            delays: Vec::new(),
            fallback: String::new(),
            failure_markers: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    pub fn respond(mut self, fragment: &str, content: &str) -> Self {
        self.rules.push((fragment.to_string(), content.to_string()));
        self
    }

    pub fn fallback(mut self, content: &str) -> Self {
        self.fallback = content.to_string();
        self
    }

    pub fn delay(mut self, fragment: &str, delay: Duration) -> Self {
        self.delays.push((fragment.to_string(), delay));
        self
    }

    pub fn fail_when(mut self, marker: &str) -> Self {
        self.failure_markers.push(marker.to_string());
        self
    }

    pub fn calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionGateway for ScriptedGateway {
    fn is_available(&self) -> bool {
        self.available
    }

    fn model(&self) -> &str {
        "scripted"
    }

    async fn generate_completion(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        self.calls.lock().unwrap().push(request.clone());

        if !self.available {
            return Err(CompletionError::Unavailable);
        }
        if let Some((_, delay)) = self
            .delays
            .iter()
            .find(|(fragment, _)| request.prompt.contains(fragment.as_str()))
        {
            tokio::time::sleep(*delay).await;
        }
        if self
            .failure_markers
            .iter()
            .any(|m| request.prompt.contains(m.as_str()))
        {
            return Err(CompletionError::Api {
                status: 503,
                message: "scripted failure".to_string(),
            });
        }

        let content = self
            .rules
            .iter()
            .find(|(fragment, _)| request.prompt.contains(fragment.as_str()))
            .map(|(_, content)| content.clone())
            .unwrap_or_else(|| self.fallback.clone());

        Ok(CompletionResponse {
            usage_tokens: (content.len() / 4) as u32,
            content,
            model: "scripted".to_string(),
            duration_ms: 1,
        })
    }
}
