//! Professional summary generation from a structured candidate profile.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::intelligence::analyzer::with_json_instruction;
use crate::intelligence::complete;
use crate::intelligence::input::{check_max, ensure_available, non_blank, MAX_TARGET_ROLE_CHARS};
use crate::intelligence::outcome::TaskOutcome;
use crate::intelligence::parser::{decode_shape, lenient};
use crate::intelligence::prompts::PROFILE_SUMMARY_PROMPT;
use crate::llm_client::CompletionGateway;

const NOT_SPECIFIED: &str = "Not specified";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub skills: Vec<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub achievements: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedSummary {
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub variations: Vec<String>,
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub keywords: Vec<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub tone: Option<String>,
}

pub async fn generate_summary(
    gateway: &dyn CompletionGateway,
    profile: &Profile,
    target_role: Option<&str>,
) -> Result<TaskOutcome<GeneratedSummary>, AppError> {
    let Some(experience) = non_blank(profile.experience.as_deref()) else {
        return Err(AppError::Validation(
            "Profile with experience is required".to_string(),
        ));
    };
    let target_role = non_blank(target_role);
    check_max("targetRole", target_role, MAX_TARGET_ROLE_CHARS)?;
    ensure_available(gateway)?;

    info!(
        "Starting summary generation: skills={}, target_role={:?}",
        profile.skills.len(),
        target_role
    );

    let skills = if profile.skills.is_empty() {
        NOT_SPECIFIED.to_string()
    } else {
        profile.skills.join(", ")
    };
    let role_line = target_role
        .map(|role| format!("- Target Role: {role}\n"))
        .unwrap_or_default();

    let prompt = PROFILE_SUMMARY_PROMPT
        .replace("{experience}", experience)
        .replace("{skills}", &skills)
        .replace(
            "{industry}",
            non_blank(profile.industry.as_deref()).unwrap_or(NOT_SPECIFIED),
        )
        .replace(
            "{achievements}",
            non_blank(profile.achievements.as_deref()).unwrap_or(NOT_SPECIFIED),
        )
        .replace("{role_line}", &role_line);

    let raw = complete(gateway, with_json_instruction(prompt), 0.6, 1500).await?;
    Ok(decode_shape(&raw, "summary generation"))
}
