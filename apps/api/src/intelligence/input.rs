//! Caller-supplied resume input and the boundary checks run before any task is spawned.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::intelligence::enhancer::EnhancementMode;
use crate::llm_client::CompletionGateway;

pub const MIN_RESUME_CHARS: usize = 50;
pub const MAX_RESUME_CHARS: usize = 10_000;
pub const MAX_JOB_DESCRIPTION_CHARS: usize = 5_000;
pub const MAX_TARGET_ROLE_CHARS: usize = 100;
pub const MAX_INDUSTRY_CHARS: usize = 50;

/// One resume to analyze or enhance. Also the element type of a batch request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeInput {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub job_description: Option<String>,
    #[serde(default)]
    pub target_role: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub enhancement_type: Option<EnhancementMode>,
}

impl ResumeInput {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_job_description(mut self, job_description: impl Into<String>) -> Self {
        self.job_description = Some(job_description.into());
        self
    }

    #[cfg(test)]
    pub fn with_mode(mut self, mode: EnhancementMode) -> Self {
        self.enhancement_type = Some(mode);
        self
    }

    /// The job description, if one was supplied and is not blank.
    pub fn job_description(&self) -> Option<&str> {
        non_blank(self.job_description.as_deref())
    }

    pub fn target_role(&self) -> Option<&str> {
        non_blank(self.target_role.as_deref())
    }

    pub fn industry(&self) -> Option<&str> {
        non_blank(self.industry.as_deref())
    }

    pub fn validate(&self) -> Result<(), AppError> {
        validate_resume_text(&self.text)?;
        check_max("jobDescription", self.job_description(), MAX_JOB_DESCRIPTION_CHARS)?;
        check_max("targetRole", self.target_role(), MAX_TARGET_ROLE_CHARS)?;
        check_max("industry", self.industry(), MAX_INDUSTRY_CHARS)?;
        Ok(())
    }
}

/// Trimmed length must be within [`MIN_RESUME_CHARS`, `MAX_RESUME_CHARS`].
pub fn validate_resume_text(text: &str) -> Result<(), AppError> {
    let length = text.trim().chars().count();
    if length < MIN_RESUME_CHARS {
        return Err(AppError::Validation(format!(
            "Resume text is required and should be at least {MIN_RESUME_CHARS} characters"
        )));
    }
    if length > MAX_RESUME_CHARS {
        return Err(AppError::Validation(format!(
            "Resume text cannot exceed {MAX_RESUME_CHARS} characters"
        )));
    }
    Ok(())
}

pub fn check_max(field: &str, value: Option<&str>, max: usize) -> Result<(), AppError> {
    match value {
        Some(v) if v.chars().count() > max => Err(AppError::Validation(format!(
            "{field} cannot exceed {max} characters"
        ))),
        _ => Ok(()),
    }
}

/// Fails fast when the completion service is not configured.
pub fn ensure_available(gateway: &dyn CompletionGateway) -> Result<(), AppError> {
    if gateway.is_available() {
        Ok(())
    } else {
        Err(AppError::ServiceUnavailable)
    }
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
