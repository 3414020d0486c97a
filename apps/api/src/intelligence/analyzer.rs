//! Analysis Orchestrator: scores a resume and derives recommendations.
//!
//! Flow: validate → availability → fan out {basic, ATS (only with a job description),
//!       suggestions} concurrently → parse each reply → aggregate score → rank recommendations.
//!
//! A gateway failure in any task is fatal for the call. A reply that does not parse
//! degrades that task to its default shape and the analysis continues.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::intelligence::complete;
use crate::intelligence::input::{ensure_available, non_blank, ResumeInput};
use crate::intelligence::metrics::TextMetrics;
use crate::intelligence::outcome::TaskOutcome;
use crate::intelligence::parser::{decode_shape, lenient};
use crate::intelligence::prompts::{
    optional_block, ATS_ANALYSIS_PROMPT, BASIC_ANALYSIS_PROMPT, ENHANCEMENT_SUGGESTIONS_PROMPT,
};
use crate::intelligence::recommendations::{rank, Recommendation};
use crate::intelligence::scoring::aggregate;
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::llm_client::CompletionGateway;

// ────────────────────────────────────────────────────────────────────────────
// Task shapes (every field has an explicit default)
// ────────────────────────────────────────────────────────────────────────────

/// Basic quality task: 1–10 sub-scores plus issue lists, merged with local text metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicAnalysis {
    #[serde(default, deserialize_with = "lenient::score")]
    pub readability_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient::score")]
    pub structure_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient::score")]
    pub content_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub grammar_issues: Vec<String>,
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub formatting_issues: Vec<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub overall_impression: Option<String>,
    /// Computed locally, never taken from the model.
    #[serde(default, skip_deserializing)]
    pub raw_metrics: TextMetrics,
}

/// ATS / job-match task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtsAnalysis {
    #[serde(default, deserialize_with = "lenient::score")]
    pub ats_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub keyword_match: Option<String>,
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub missing_keywords: Vec<String>,
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub formatting_issues: Vec<String>,
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub suggestions: Vec<String>,
}

/// Enhancement-suggestion task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancementSuggestions {
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub action_verbs: Vec<String>,
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub achievement_examples: Vec<String>,
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub keywords: Vec<String>,
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub section_improvements: Vec<String>,
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub formatting_tips: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Result models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Always present, in [0, 100].
    pub overall_score: f64,
    pub basic_analysis: TaskOutcome<BasicAnalysis>,
    /// `None` when no job description was supplied.
    pub ats_analysis: Option<TaskOutcome<AtsAnalysis>>,
    pub enhancement_suggestions: TaskOutcome<EnhancementSuggestions>,
    pub recommendations: Vec<Recommendation>,
    pub metrics: AnalysisMetrics,
    pub timestamp: DateTime<Utc>,
}

/// Flat summary of an analysis, for dashboards and logs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetrics {
    pub overall_score: f64,
    pub word_count: usize,
    pub section_count: usize,
    pub bullet_count: usize,
    pub recommendation_count: usize,
    pub ats_score: f64,
    pub keyword_match: String,
}

impl AnalysisMetrics {
    fn collect(
        overall_score: f64,
        basic: &BasicAnalysis,
        ats: Option<&AtsAnalysis>,
        recommendation_count: usize,
    ) -> Self {
        Self {
            overall_score,
            word_count: basic.raw_metrics.word_count,
            section_count: basic.raw_metrics.section_count,
            bullet_count: basic.raw_metrics.bullet_point_count,
            recommendation_count,
            ats_score: ats.and_then(|a| a.ats_score).unwrap_or(0.0),
            keyword_match: ats
                .and_then(|a| a.keyword_match.clone())
                .unwrap_or_else(|| "N/A".to_string()),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Orchestration
// ────────────────────────────────────────────────────────────────────────────

pub async fn analyze_resume(
    gateway: &dyn CompletionGateway,
    input: &ResumeInput,
) -> Result<AnalysisResult, AppError> {
    input.validate()?;
    ensure_available(gateway)?;

    let text = input.text.as_str();
    let job_description = input.job_description();
    info!(
        "Starting resume analysis: text_len={}, has_job_description={}, target_role={:?}, industry={:?}",
        text.len(),
        job_description.is_some(),
        input.target_role(),
        input.industry()
    );

    let ats_task = async {
        match job_description {
            Some(jd) => check_ats_compatibility(gateway, text, jd).await.map(Some),
            None => Ok(None),
        }
    };

    let (basic, ats, suggestions) = tokio::try_join!(
        basic_analysis(gateway, text),
        ats_task,
        enhancement_suggestions(
            gateway,
            text,
            job_description,
            input.target_role(),
            input.industry()
        ),
    )?;

    let overall_score = aggregate(basic.value(), ats.as_ref().map(TaskOutcome::value));
    let recommendations = rank(
        basic.value(),
        ats.as_ref().map(TaskOutcome::value),
        suggestions.value(),
    );
    let metrics = AnalysisMetrics::collect(
        overall_score,
        basic.value(),
        ats.as_ref().map(TaskOutcome::value),
        recommendations.len(),
    );

    info!(
        "Resume analysis complete: score={}, recommendations={}, degraded_tasks={}",
        overall_score,
        recommendations.len(),
        [
            basic.is_degraded(),
            ats.as_ref().is_some_and(TaskOutcome::is_degraded),
            suggestions.is_degraded()
        ]
        .iter()
        .filter(|d| **d)
        .count()
    );

    Ok(AnalysisResult {
        overall_score,
        basic_analysis: basic,
        ats_analysis: ats,
        enhancement_suggestions: suggestions,
        recommendations,
        metrics,
        timestamp: Utc::now(),
    })
}

/// Standalone ATS check; also slot (b) of `analyze_resume`.
/// Callers validate inputs; this only runs the task.
pub async fn check_ats_compatibility(
    gateway: &dyn CompletionGateway,
    resume_text: &str,
    job_description: &str,
) -> Result<TaskOutcome<AtsAnalysis>, AppError> {
    let prompt = ATS_ANALYSIS_PROMPT
        .replace("{resume_text}", resume_text)
        .replace("{job_description}", job_description);
    let raw = complete(gateway, with_json_instruction(prompt), 0.2, 2000).await?;
    Ok(decode_shape(&raw, "ATS analysis"))
}

async fn basic_analysis(
    gateway: &dyn CompletionGateway,
    resume_text: &str,
) -> Result<TaskOutcome<BasicAnalysis>, AppError> {
    let prompt = BASIC_ANALYSIS_PROMPT.replace("{resume_text}", resume_text);
    let raw = complete(gateway, with_json_instruction(prompt), 0.3, 1500).await?;

    let mut outcome: TaskOutcome<BasicAnalysis> = decode_shape(&raw, "basic analysis");
    outcome.value_mut().raw_metrics = TextMetrics::measure(resume_text);
    Ok(outcome)
}

async fn enhancement_suggestions(
    gateway: &dyn CompletionGateway,
    resume_text: &str,
    job_description: Option<&str>,
    target_role: Option<&str>,
    industry: Option<&str>,
) -> Result<TaskOutcome<EnhancementSuggestions>, AppError> {
    let role_line = match (non_blank(target_role), non_blank(industry)) {
        (Some(role), Some(industry)) => Some(format!("{role} ({industry})")),
        (Some(role), None) => Some(role.to_string()),
        (None, Some(industry)) => Some(format!("Any role in {industry}")),
        (None, None) => None,
    };

    let prompt = ENHANCEMENT_SUGGESTIONS_PROMPT
        .replace("{resume_text}", resume_text)
        .replace("{job_block}", &optional_block("TARGET JOB", job_description))
        .replace("{role_block}", &optional_block("TARGET ROLE", role_line.as_deref()));
    let raw = complete(gateway, with_json_instruction(prompt), 0.5, 2000).await?;
    Ok(decode_shape(&raw, "enhancement suggestions"))
}

pub(crate) fn with_json_instruction(prompt: String) -> String {
    format!("{prompt}\n\n{JSON_ONLY_INSTRUCTION}")
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
