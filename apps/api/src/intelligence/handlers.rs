//! Axum route handlers for the Resume Intelligence API.

use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::intelligence::analyzer::{analyze_resume, check_ats_compatibility, AnalysisResult, AtsAnalysis};
use crate::intelligence::batch::{batch_process, BatchItemResult, BatchOperation, MAX_BATCH_ITEMS};
use crate::intelligence::enhancer::{enhance_resume, EnhancementResult};
use crate::intelligence::input::{
    check_max, ensure_available, validate_resume_text, ResumeInput, MAX_JOB_DESCRIPTION_CHARS,
};
use crate::intelligence::outcome::TaskOutcome;
use crate::intelligence::prompts::HEALTH_CHECK_PROMPT;
use crate::intelligence::summary::{generate_summary, GeneratedSummary, Profile};
use crate::llm_client::CompletionRequest;
use crate::state::AppState;

/// Largest `max_tokens` any task requests (full-document ATS rewrite).
const MAX_TASK_TOKENS: u32 = 3000;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub analysis: AnalysisResult,
    pub model: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceResponse {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub enhancement: EnhancementResult,
    pub model: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    #[serde(default)]
    pub resumes: Vec<ResumeInput>,
    #[serde(default)]
    pub operation: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    pub success: bool,
    pub message: String,
    pub batch_id: Uuid,
    pub operation: BatchOperation,
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub results: Vec<BatchItemResult>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtsCheckRequest {
    #[serde(default)]
    pub resume_text: String,
    #[serde(default)]
    pub job_description: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AtsCheckResponse {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub ats_analysis: TaskOutcome<AtsAnalysis>,
    pub model: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRequest {
    #[serde(default)]
    pub profile: Profile,
    #[serde(default)]
    pub target_role: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub success: bool,
    pub message: String,
    pub summary: TaskOutcome<GeneratedSummary>,
    pub model: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/ai/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<ResumeInput>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let analysis = analyze_resume(state.gateway.as_ref(), &request).await?;

    Ok(Json(AnalyzeResponse {
        success: true,
        message: "Resume analysis completed successfully".to_string(),
        analysis,
        model: state.gateway.model().to_string(),
    }))
}

/// POST /api/v1/ai/enhance
///
/// `enhancementType` defaults to `comprehensive`.
pub async fn handle_enhance(
    State(state): State<AppState>,
    Json(request): Json<ResumeInput>,
) -> Result<Json<EnhanceResponse>, AppError> {
    let enhancement = enhance_resume(state.gateway.as_ref(), &request).await?;

    Ok(Json(EnhanceResponse {
        success: true,
        message: "Resume enhancement completed successfully".to_string(),
        enhancement,
        model: state.gateway.model().to_string(),
    }))
}

/// POST /api/v1/ai/batch
///
/// Always 200 once the batch is accepted; per-item failures live in `results`.
pub async fn handle_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> Result<Json<BatchResponse>, AppError> {
    let operation = BatchOperation::from_name(request.operation.as_deref())?;
    let batch_id = Uuid::new_v4();
    info!("Batch {batch_id} accepted: {} resumes", request.resumes.len());

    let results = batch_process(state.gateway.as_ref(), &request.resumes, operation).await?;
    let total = results.len();
    let successful = results.iter().filter(|r| r.success).count();

    Ok(Json(BatchResponse {
        success: true,
        message: format!("Batch processing completed. {successful}/{total} successful"),
        batch_id,
        operation,
        total,
        successful,
        failed: total - successful,
        results,
        timestamp: Utc::now(),
    }))
}

/// POST /api/v1/ai/ats-check
pub async fn handle_ats_check(
    State(state): State<AppState>,
    Json(request): Json<AtsCheckRequest>,
) -> Result<Json<AtsCheckResponse>, AppError> {
    let job_description = request.job_description.trim();
    if job_description.is_empty() {
        return Err(AppError::Validation(
            "Both resume text and job description are required".to_string(),
        ));
    }
    validate_resume_text(&request.resume_text)?;
    check_max("jobDescription", Some(job_description), MAX_JOB_DESCRIPTION_CHARS)?;
    ensure_available(state.gateway.as_ref())?;

    let ats_analysis =
        check_ats_compatibility(state.gateway.as_ref(), &request.resume_text, job_description)
            .await?;
    info!(
        "ATS compatibility check complete: score={:?}",
        ats_analysis.value().ats_score
    );

    Ok(Json(AtsCheckResponse {
        success: true,
        message: "ATS compatibility analysis completed".to_string(),
        ats_analysis,
        model: state.gateway.model().to_string(),
    }))
}

/// POST /api/v1/ai/summary
pub async fn handle_summary(
    State(state): State<AppState>,
    Json(request): Json<SummaryRequest>,
) -> Result<Json<SummaryResponse>, AppError> {
    let summary = generate_summary(
        state.gateway.as_ref(),
        &request.profile,
        request.target_role.as_deref(),
    )
    .await?;

    Ok(Json(SummaryResponse {
        success: true,
        message: "Professional summary generated successfully".to_string(),
        summary,
        model: state.gateway.model().to_string(),
    }))
}

/// GET /api/v1/ai/health
///
/// Sends a tiny completion. `disabled` when no API key is configured,
/// `unhealthy` (503) when it fails.
pub async fn handle_ai_health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let model = state.gateway.model().to_string();
    if !state.gateway.is_available() {
        return (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "status": "disabled",
                "message": "AI service is not configured",
                "model": model,
                "timestamp": Utc::now(),
            })),
        );
    }

    let started = Instant::now();
    let request = CompletionRequest::new(HEALTH_CHECK_PROMPT, 0.0, 5);
    match state.gateway.generate_completion(request).await {
        Ok(response) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "status": "healthy",
                "model": response.model,
                "latencyMs": started.elapsed().as_millis() as u64,
                "timestamp": Utc::now(),
            })),
        ),
        Err(e) => {
            warn!("AI health check failed: {e}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "status": "unhealthy",
                    "error": "AI service is not healthy",
                    "model": model,
                    "timestamp": Utc::now(),
                })),
            )
        }
    }
}

/// GET /api/v1/ai/status
pub async fn handle_ai_status(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "success": true,
        "configured": state.gateway.is_available(),
        "model": state.gateway.model(),
        "limits": {
            "maxTokens": MAX_TASK_TOKENS,
            "maxBatchItems": MAX_BATCH_ITEMS,
            "timeoutSecs": state.config.llm_timeout.as_secs(),
            "maxRetries": state.config.llm_max_retries,
            "supportedFeatures": [
                "resume_analysis",
                "resume_enhancement",
                "summary_generation",
                "ats_analysis",
                "bullet_point_enhancement",
                "batch_processing"
            ]
        },
        "timestamp": Utc::now(),
    }))
}
