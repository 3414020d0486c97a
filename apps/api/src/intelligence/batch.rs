//! Batch processing: up to ten resumes, all items in flight at once.
//!
//! Each item's outcome lands at its input index. A failing item (bad input or a
//! completion error) is recorded on that item only and never cancels its siblings.

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::intelligence::analyzer::{analyze_resume, AnalysisResult};
use crate::intelligence::enhancer::{enhance_resume, EnhancementResult};
use crate::intelligence::input::{ensure_available, ResumeInput};
use crate::llm_client::CompletionGateway;

pub const MAX_BATCH_ITEMS: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchOperation {
    #[default]
    Analyze,
    Enhance,
}

impl BatchOperation {
    /// `None` selects the default operation; any unknown name is a validation error.
    pub fn from_name(name: Option<&str>) -> Result<Self, AppError> {
        match name.map(str::trim) {
            None | Some("") | Some("analyze") => Ok(BatchOperation::Analyze),
            Some("enhance") => Ok(BatchOperation::Enhance),
            Some(other) => Err(AppError::Validation(format!(
                "Unsupported operation: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum BatchPayload {
    Analysis(Box<AnalysisResult>),
    Enhancement(EnhancementResult),
}

/// `{index, success, ...result}` on success, `{index, success: false, error}` on failure.
#[derive(Debug, Clone, Serialize)]
pub struct BatchItemResult {
    pub index: usize,
    pub success: bool,
    #[serde(flatten)]
    pub result: Option<BatchPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchItemResult {
    fn from_outcome(index: usize, outcome: Result<BatchPayload, AppError>) -> Self {
        match outcome {
            Ok(payload) => Self {
                index,
                success: true,
                result: Some(payload),
                error: None,
            },
            Err(e) => {
                warn!("Batch item {index} failed: {e}");
                Self {
                    index,
                    success: false,
                    result: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

/// Batch size and availability are hard stops; everything after is per item.
pub async fn batch_process(
    gateway: &dyn CompletionGateway,
    items: &[ResumeInput],
    operation: BatchOperation,
) -> Result<Vec<BatchItemResult>, AppError> {
    if items.is_empty() {
        return Err(AppError::Validation(
            "Resumes array is required and should not be empty".to_string(),
        ));
    }
    if items.len() > MAX_BATCH_ITEMS {
        return Err(AppError::Validation(format!(
            "Maximum {MAX_BATCH_ITEMS} resumes allowed in batch processing"
        )));
    }
    ensure_available(gateway)?;

    info!(
        "Starting batch processing: count={}, operation={:?}",
        items.len(),
        operation
    );

    let futures = items.iter().enumerate().map(|(index, item)| async move {
        let outcome = match operation {
            BatchOperation::Analyze => analyze_resume(gateway, item)
                .await
                .map(|r| BatchPayload::Analysis(Box::new(r))),
            BatchOperation::Enhance => enhance_resume(gateway, item)
                .await
                .map(BatchPayload::Enhancement),
        };
        BatchItemResult::from_outcome(index, outcome)
    });

    // join_all yields results in input order, whatever order they finish in.
    let results = join_all(futures).await;

    let successful = results.iter().filter(|r| r.success).count();
    info!(
        "Batch processing complete: total={}, successful={}, failed={}",
        results.len(),
        successful,
        results.len() - successful
    );
    Ok(results)
}
