//! Enhancement Orchestrator: rewrites a resume in one of four modes.
//!
//! Comprehensive mode runs in two phases. First all four rewrites are fetched concurrently
//! and collected as `Rewrite` values; nothing touches the document yet. Then
//! `apply_rewrites` folds them over the original in fixed order:
//! summary → experience → skills → verbs. Task completion order never affects the output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::intelligence::analyzer::with_json_instruction;
use crate::intelligence::complete;
use crate::intelligence::input::{ensure_available, ResumeInput};
use crate::intelligence::metrics::{bullet_lines, ChangeSummary};
use crate::intelligence::parser::decode_shape;
use crate::intelligence::prompts::{
    optional_block, ATS_OPTIMIZATION_PROMPT, BULLET_POINTS_PROMPT, REWRITE_EXPERIENCE_PROMPT,
    REWRITE_SKILLS_PROMPT, REWRITE_SUMMARY_PROMPT, VERB_MAPPING_PROMPT,
};
use crate::intelligence::sections::{replace_section, SectionKind};
use crate::intelligence::verbs::VerbMapping;
use crate::llm_client::CompletionGateway;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnhancementMode {
    BulletPoints,
    Summary,
    AtsOptimization,
    #[default]
    Comprehensive,
}

impl EnhancementMode {
    /// Unknown names select comprehensive mode.
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "bullet_points" => EnhancementMode::BulletPoints,
            "summary" => EnhancementMode::Summary,
            "ats_optimization" => EnhancementMode::AtsOptimization,
            _ => EnhancementMode::Comprehensive,
        }
    }
}

impl<'de> Deserialize<'de> for EnhancementMode {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(name) => EnhancementMode::from_name(&name),
            _ => EnhancementMode::default(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancementResult {
    pub enhanced_text: String,
    /// Characters, not bytes.
    pub original_length: usize,
    pub enhanced_length: usize,
    pub changes: ChangeSummary,
    pub enhancement_type: EnhancementMode,
    pub timestamp: DateTime<Utc>,
}

impl EnhancementResult {
    /// Lengths and changes are always derived from the final pair.
    fn between(original: &str, enhanced_text: String, mode: EnhancementMode) -> Self {
        Self {
            original_length: original.chars().count(),
            enhanced_length: enhanced_text.chars().count(),
            changes: ChangeSummary::between(original, &enhanced_text),
            enhanced_text,
            enhancement_type: mode,
            timestamp: Utc::now(),
        }
    }
}

/// One computed rewrite, not yet applied.
#[derive(Debug, Clone, PartialEq)]
pub enum Rewrite {
    Section(SectionKind, String),
    Verbs(VerbMapping),
}

/// Applies rewrites left to right, each over the previous step's output.
pub fn apply_rewrites(original: &str, rewrites: &[Rewrite]) -> String {
    rewrites
        .iter()
        .fold(original.to_string(), |document, rewrite| match rewrite {
            Rewrite::Section(kind, content) => replace_section(&document, *kind, content),
            Rewrite::Verbs(mapping) => mapping.apply(&document),
        })
}

pub async fn enhance_resume(
    gateway: &dyn CompletionGateway,
    input: &ResumeInput,
) -> Result<EnhancementResult, AppError> {
    input.validate()?;
    let mode = input.enhancement_type.unwrap_or_default();
    if mode == EnhancementMode::AtsOptimization && input.job_description().is_none() {
        return Err(AppError::Precondition(
            "Job description is required for ATS optimization".to_string(),
        ));
    }
    ensure_available(gateway)?;

    let text = input.text.as_str();
    let job_description = input.job_description();
    info!(
        "Starting resume enhancement: mode={:?}, text_len={}, has_job_description={}",
        mode,
        text.len(),
        job_description.is_some()
    );

    let enhanced_text = match mode {
        EnhancementMode::BulletPoints => enhance_bullets(gateway, text, job_description).await?,
        EnhancementMode::Summary => {
            let summary = rewrite_summary(gateway, text, job_description).await?;
            replace_section(text, SectionKind::Summary, &summary)
        }
        EnhancementMode::AtsOptimization => {
            // Guarded above.
            let jd = job_description.unwrap_or_default();
            optimize_for_ats(gateway, text, jd).await?
        }
        EnhancementMode::Comprehensive => {
            let (summary, experience, skills, verbs) = tokio::try_join!(
                rewrite_summary(gateway, text, job_description),
                rewrite_experience(gateway, text, job_description),
                rewrite_skills(gateway, text, job_description),
                verb_mapping(gateway, text),
            )?;
            let rewrites = [
                Rewrite::Section(SectionKind::Summary, summary),
                Rewrite::Section(SectionKind::Experience, experience),
                Rewrite::Section(SectionKind::Skills, skills),
                Rewrite::Verbs(verbs),
            ];
            apply_rewrites(text, &rewrites)
        }
    };

    let result = EnhancementResult::between(text, enhanced_text, mode);
    info!(
        "Resume enhancement complete: mode={:?}, word_count_change={}, sections_added={}",
        mode, result.changes.word_count_change, result.changes.sections_added
    );
    Ok(result)
}

async fn rewrite_summary(
    gateway: &dyn CompletionGateway,
    text: &str,
    job_description: Option<&str>,
) -> Result<String, AppError> {
    let prompt = REWRITE_SUMMARY_PROMPT
        .replace("{resume_text}", text)
        .replace("{job_block}", &optional_block("TARGET JOB", job_description));
    complete(gateway, prompt, 0.6, 500).await
}

async fn rewrite_experience(
    gateway: &dyn CompletionGateway,
    text: &str,
    job_description: Option<&str>,
) -> Result<String, AppError> {
    let prompt = REWRITE_EXPERIENCE_PROMPT
        .replace("{resume_text}", text)
        .replace("{job_block}", &optional_block("TARGET JOB", job_description));
    complete(gateway, prompt, 0.5, 2000).await
}

async fn rewrite_skills(
    gateway: &dyn CompletionGateway,
    text: &str,
    job_description: Option<&str>,
) -> Result<String, AppError> {
    let prompt = REWRITE_SKILLS_PROMPT
        .replace("{resume_text}", text)
        .replace("{job_block}", &optional_block("JOB REQUIREMENTS", job_description));
    complete(gateway, prompt, 0.4, 1000).await
}

/// A reply that does not parse yields an empty mapping, which is a no-op.
async fn verb_mapping(gateway: &dyn CompletionGateway, text: &str) -> Result<VerbMapping, AppError> {
    let prompt = VERB_MAPPING_PROMPT.replace("{resume_text}", text);
    let raw = complete(gateway, with_json_instruction(prompt), 0.3, 500).await?;
    Ok(decode_shape::<VerbMapping>(&raw, "verb mapping").into_value())
}

async fn enhance_bullets(
    gateway: &dyn CompletionGateway,
    text: &str,
    job_description: Option<&str>,
) -> Result<String, AppError> {
    let bullets = bullet_lines(text);
    let bullet_block = if bullets.is_empty() {
        format!("Extract the bullet points from this resume, then enhance them:\n\nRESUME:\n{text}")
    } else {
        let numbered = bullets
            .iter()
            .enumerate()
            .map(|(i, line)| format!("{}. {}", i + 1, line))
            .collect::<Vec<_>>()
            .join("\n");
        format!("BULLET POINTS:\n{numbered}")
    };

    let prompt = BULLET_POINTS_PROMPT
        .replace("{bullet_block}", &bullet_block)
        .replace("{job_block}", &optional_block("TARGET JOB", job_description));
    let rewritten = complete(gateway, prompt, 0.5, 2500).await?;
    Ok(keep_original_if_blank(text, rewritten, "bullet points"))
}

async fn optimize_for_ats(
    gateway: &dyn CompletionGateway,
    text: &str,
    job_description: &str,
) -> Result<String, AppError> {
    let prompt = ATS_OPTIMIZATION_PROMPT
        .replace("{resume_text}", text)
        .replace("{job_description}", job_description);
    let rewritten = complete(gateway, prompt, 0.3, 3000).await?;
    Ok(keep_original_if_blank(text, rewritten, "ATS optimization"))
}

fn keep_original_if_blank(original: &str, rewritten: String, task: &str) -> String {
    let trimmed = rewritten.trim();
    if trimmed.is_empty() {
        warn!("Empty rewrite for {task}; keeping original text");
        original.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::llm_client::scripted::ScriptedGateway;

    const RESUME: &str = "Jane Doe\n\nPROFESSIONAL SUMMARY\n\
        Backend engineer with eight years building payment systems.\n\n\
        EXPERIENCE\nAcme Payments\n- Managed the billing service\n- Responsible for on-call\n\n\
        EDUCATION\nBSc Computer Science, State University";

    const SUMMARY_FRAGMENT: &str = "Rewrite the professional summary";
    const EXPERIENCE_FRAGMENT: &str = "Enhance the experience section";
    const SKILLS_FRAGMENT: &str = "Optimize the skills section";
    const VERBS_FRAGMENT: &str = "Identify and suggest better action verbs";

    fn comprehensive_gateway() -> ScriptedGateway {
        ScriptedGateway::new()
            .respond(SUMMARY_FRAGMENT, "SUMMARY\nStaff engineer who managed payment platforms.")
            .respond(
                EXPERIENCE_FRAGMENT,
                "EXPERIENCE\nAcme Payments\n- Managed billing for 2M customers\n- Led incident reviews",
            )
            .respond(SKILLS_FRAGMENT, "SKILLS\nRust, Go, Kafka")
            .respond(
                VERBS_FRAGMENT,
                r#"```json
{"weakVerbs": ["managed"], "strongVerbs": ["Directed"]}
```"#,
            )
    }

    #[tokio::test]
    async fn test_comprehensive_applies_rewrites_in_order() {
        let gateway = comprehensive_gateway();
        let result = enhance_resume(&gateway, &ResumeInput::new(RESUME)).await.unwrap();

        assert_eq!(gateway.call_count(), 4);
        assert_eq!(
            result.enhanced_text,
            "Jane Doe\n\nSUMMARY\nStaff engineer who Directed payment platforms.\n\n\
             EXPERIENCE\nAcme Payments\n- Directed billing for 2M customers\n- Led incident reviews\n\n\
             SKILLS\nRust, Go, Kafka\n\n\
             EDUCATION\nBSc Computer Science, State University"
        );
        assert_eq!(result.enhancement_type, EnhancementMode::Comprehensive);
    }

    #[tokio::test]
    async fn test_changes_recomputed_from_final_pair() {
        let gateway = comprehensive_gateway();
        let result = enhance_resume(&gateway, &ResumeInput::new(RESUME)).await.unwrap();

        assert_eq!(result.changes, ChangeSummary::between(RESUME, &result.enhanced_text));
        assert_eq!(result.changes.sections_added, 1);
        assert_eq!(result.original_length, RESUME.chars().count());
        assert_eq!(result.enhanced_length, result.enhanced_text.chars().count());
    }

    #[test]
    fn test_apply_rewrites_verbs_see_section_output() {
        let rewrites = [
            Rewrite::Section(SectionKind::Experience, "EXPERIENCE\n- Managed search".to_string()),
            Rewrite::Verbs(VerbMapping {
                weak_verbs: vec!["managed".to_string()],
                strong_verbs: vec!["Owned".to_string()],
            }),
        ];
        let out = apply_rewrites("Name\n\nEXPERIENCE\n- Built things", &rewrites);
        assert_eq!(out, "Name\n\nEXPERIENCE\n- Owned search");
    }

    #[tokio::test]
    async fn test_unparseable_verb_mapping_is_noop() {
        let gateway = ScriptedGateway::new().respond(VERBS_FRAGMENT, "no verbs to change");
        let result = enhance_resume(&gateway, &ResumeInput::new(RESUME)).await.unwrap();
        // Every rewrite is blank and the verb map is empty.
        assert_eq!(result.enhanced_text, RESUME);
        assert_eq!(result.changes.word_count_change, 0);
    }

    #[tokio::test]
    async fn test_ats_optimization_requires_job_description() {
        let gateway = ScriptedGateway::new();
        let input = ResumeInput::new(RESUME).with_mode(EnhancementMode::AtsOptimization);
        let err = enhance_resume(&gateway, &input).await.unwrap_err();
        assert!(matches!(err, AppError::Precondition(_)));
        assert_eq!(gateway.call_count(), 0);

        // Precondition wins over availability.
        let offline = ScriptedGateway::unavailable();
        let err = enhance_resume(&offline, &input).await.unwrap_err();
        assert!(matches!(err, AppError::Precondition(_)));
    }

    #[tokio::test]
    async fn test_ats_optimization_returns_full_rewrite() {
        let gateway = ScriptedGateway::new().fallback("  Optimized resume with Kubernetes  \n");
        let input = ResumeInput::new(RESUME)
            .with_mode(EnhancementMode::AtsOptimization)
            .with_job_description("Platform engineer, Kubernetes");
        let result = enhance_resume(&gateway, &input).await.unwrap();

        assert_eq!(result.enhanced_text, "Optimized resume with Kubernetes");
        let calls = gateway.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].max_tokens, 3000);
        assert!(calls[0].prompt.contains("Platform engineer, Kubernetes"));
    }

    #[tokio::test]
    async fn test_summary_mode_returns_full_document() {
        let gateway = ScriptedGateway::new().respond(SUMMARY_FRAGMENT, "SUMMARY\nStaff engineer.");
        let input = ResumeInput::new(RESUME).with_mode(EnhancementMode::Summary);
        let result = enhance_resume(&gateway, &input).await.unwrap();

        assert_eq!(gateway.call_count(), 1);
        assert!(result.enhanced_text.starts_with("Jane Doe\n\nSUMMARY\nStaff engineer.\n\nEXPERIENCE"));
        assert!(result.enhanced_text.contains("- Managed the billing service"));
    }

    #[tokio::test]
    async fn test_bullet_mode_numbers_detected_bullets() {
        let gateway = ScriptedGateway::new().fallback("- Directed billing\n- Owned on-call");
        let input = ResumeInput::new(RESUME).with_mode(EnhancementMode::BulletPoints);
        let result = enhance_resume(&gateway, &input).await.unwrap();

        assert_eq!(result.enhanced_text, "- Directed billing\n- Owned on-call");
        let prompt = &gateway.calls()[0].prompt;
        assert!(prompt.contains("1. Managed the billing service\n2. Responsible for on-call"));
        assert_eq!(result.changes.bullet_points_added, 0);
    }

    #[tokio::test]
    async fn test_bullet_mode_without_bullets_asks_for_extraction() {
        let text = "Jane Doe. Backend engineer with eight years of payments work at Acme.";
        let gateway = ScriptedGateway::new().fallback("- Built payments at Acme");
        let input = ResumeInput::new(text).with_mode(EnhancementMode::BulletPoints);
        enhance_resume(&gateway, &input).await.unwrap();

        let prompt = &gateway.calls()[0].prompt;
        assert!(prompt.contains("Extract the bullet points"));
        assert!(prompt.contains(text));
    }

    #[tokio::test]
    async fn test_gateway_failure_is_fatal() {
        let gateway = comprehensive_gateway().fail_when(SKILLS_FRAGMENT);
        let err = enhance_resume(&gateway, &ResumeInput::new(RESUME)).await.unwrap_err();
        assert!(matches!(err, AppError::Completion(_)));
    }

    #[test]
    fn test_mode_wire_names() {
        let mode: EnhancementMode = serde_json::from_str("\"bullet_points\"").unwrap();
        assert_eq!(mode, EnhancementMode::BulletPoints);
        assert_eq!(
            serde_json::from_str::<EnhancementMode>("\"everything\"").unwrap(),
            EnhancementMode::Comprehensive
        );
        assert_eq!(
            serde_json::from_str::<EnhancementMode>("7").unwrap(),
            EnhancementMode::Comprehensive
        );
        assert_eq!(EnhancementMode::default(), EnhancementMode::Comprehensive);
    }

    #[tokio::test(start_paused = true)]
    async fn test_comprehensive_output_ignores_completion_order() {
        let baseline = enhance_resume(&comprehensive_gateway(), &ResumeInput::new(RESUME))
            .await
            .unwrap();

        // Summary and experience finish last, skills and verbs first.
        let slow_sections = comprehensive_gateway()
            .delay(SUMMARY_FRAGMENT, Duration::from_millis(80))
            .delay(EXPERIENCE_FRAGMENT, Duration::from_millis(40));
        let reordered = enhance_resume(&slow_sections, &ResumeInput::new(RESUME))
            .await
            .unwrap();

        assert_eq!(reordered.enhanced_text, baseline.enhanced_text);
        assert_eq!(reordered.changes, baseline.changes);
    }
}
