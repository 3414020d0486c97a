// Resume Intelligence: analysis and enhancement orchestration over the completion gateway.
// Orchestrators fan out task prompts concurrently, parse replies with `parser`, then
// aggregate (analysis) or reassemble the document (enhancement) synchronously.

pub mod analyzer;
pub mod batch;
pub mod enhancer;
pub mod handlers;
pub mod input;
pub mod metrics;
pub mod outcome;
pub mod parser;
pub mod prompts;
pub mod recommendations;
pub mod scoring;
pub mod sections;
pub mod summary;
pub mod verbs;

use crate::errors::AppError;
use crate::llm_client::{CompletionGateway, CompletionRequest};

/// Runs one completion and returns its text. Gateway failures surface unchanged.
pub(crate) async fn complete(
    gateway: &dyn CompletionGateway,
    prompt: String,
    temperature: f32,
    max_tokens: u32,
) -> Result<String, AppError> {
    let response = gateway
        .generate_completion(CompletionRequest::new(prompt, temperature, max_tokens))
        .await?;
    Ok(response.content)
}
