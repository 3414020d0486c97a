// All completion prompt templates for analysis and enhancement tasks.
// Placeholders are `{name}`; optional blocks ({job_block}, {role_block}) are rendered
// by `optional_block` and collapse to nothing when the input is absent.

/// Basic quality task. Replace: {resume_text}
pub const BASIC_ANALYSIS_PROMPT: &str = r#"Analyze this resume for basic quality metrics:

RESUME:
{resume_text}

Provide analysis on:
1. Readability and clarity (score 1-10)
2. Structure and organization (score 1-10)
3. Content completeness (score 1-10)
4. Grammar and spelling issues
5. Formatting issues
6. Overall impression

Format as JSON with: readabilityScore, structureScore, contentScore, grammarIssues, formattingIssues, overallImpression"#;

/// ATS task. Replace: {resume_text}, {job_description}
pub const ATS_ANALYSIS_PROMPT: &str = r#"Analyze ATS (Applicant Tracking System) compatibility:

RESUME:
{resume_text}

JOB DESCRIPTION:
{job_description}

Please analyze:
1. Keyword match score (percentage)
2. Missing keywords from job description
3. Formatting issues that might affect ATS parsing
4. Suggested improvements for better ATS compatibility
5. Overall ATS score (1-100)

Format as JSON with keys: atsScore, keywordMatch, missingKeywords, formattingIssues, suggestions"#;

/// Enhancement-suggestion task. Replace: {resume_text}, {job_block}, {role_block}
pub const ENHANCEMENT_SUGGESTIONS_PROMPT: &str = r#"Provide specific enhancement suggestions for this resume:

RESUME:
{resume_text}

{job_block}{role_block}Suggest improvements for:
1. Action verbs to use
2. Quantifiable achievements to add
3. Keywords to include
4. Section improvements
5. Formatting enhancements

Format as JSON with: actionVerbs, achievementExamples, keywords, sectionImprovements, formattingTips"#;

/// Summary rewrite. Replace: {resume_text}, {job_block}
pub const REWRITE_SUMMARY_PROMPT: &str = r#"Rewrite the professional summary/objective section of this resume to be more impactful:

ORIGINAL RESUME:
{resume_text}

{job_block}Requirements:
1. Make it achievement-focused
2. Include relevant keywords
3. Keep it concise (2-3 sentences)
4. Tailor to target role if provided

Return ONLY the rewritten summary section, nothing else."#;

/// Experience rewrite. Replace: {resume_text}, {job_block}
pub const REWRITE_EXPERIENCE_PROMPT: &str = r#"Enhance the experience section of this resume using the STAR method:

ORIGINAL RESUME:
{resume_text}

{job_block}Enhancement requirements:
1. Convert responsibilities to achievements
2. Add quantifiable metrics
3. Use strong action verbs
4. Align with target job requirements
5. Maintain chronological order

Return ONLY the enhanced experience section."#;

/// Skills rewrite. Replace: {resume_text}, {job_block}
pub const REWRITE_SKILLS_PROMPT: &str = r#"Optimize the skills section of this resume:

ORIGINAL RESUME:
{resume_text}

{job_block}Requirements:
1. Categorize skills (Technical, Soft, Tools, etc.)
2. Add missing skills from job description
3. Prioritize relevant skills
4. Remove outdated or irrelevant skills
5. Format clearly

Return ONLY the optimized skills section."#;

/// Weak → strong verb mapping. Replace: {resume_text}
pub const VERB_MAPPING_PROMPT: &str = r#"Identify and suggest better action verbs for this resume:

RESUME:
{resume_text}

Provide a mapping of weak verbs to strong verbs found in the resume.
The strongVerbs entry at each index replaces the weakVerbs entry at the same index.
Format as JSON: { "weakVerbs": ["managed", "responsible for"], "strongVerbs": ["led", "oversaw"] }"#;

/// Bullet rewrite. Replace: {bullet_block}, {job_block}
pub const BULLET_POINTS_PROMPT: &str = r#"Enhance these resume bullet points:

{bullet_block}

{job_block}Enhance each bullet point by:
1. Starting with strong action verbs
2. Adding quantifiable results
3. Using the STAR method
4. Making them achievement-oriented

Return the enhanced bullet points in the same order, one per line."#;

/// Full-document ATS rewrite. Replace: {resume_text}, {job_description}
pub const ATS_OPTIMIZATION_PROMPT: &str = r#"Optimize this resume specifically for ATS (Applicant Tracking System) compatibility:

RESUME:
{resume_text}

JOB DESCRIPTION:
{job_description}

Optimization requirements:
1. Increase keyword density from job description
2. Improve formatting for ATS parsing
3. Add missing required skills/terms
4. Maintain readability for humans
5. Ensure proper section headers

Return the fully optimized resume."#;

/// Profile summary generation. Replace: {experience}, {skills}, {industry}, {achievements}, {role_line}
pub const PROFILE_SUMMARY_PROMPT: &str = r#"Generate a professional summary for a resume based on this profile:

PROFILE:
- Experience: {experience}
- Skills: {skills}
- Industry: {industry}
- Achievements: {achievements}
{role_line}
Please generate:
1. A compelling professional summary (2-3 sentences)
2. 3 variations with different tones (achievement-focused, skill-focused, hybrid)
3. Keywords to include for ATS optimization

Format as JSON with keys: summary, variations, keywords, tone"#;

/// Used by the AI health check.
pub const HEALTH_CHECK_PROMPT: &str = "Say \"OK\" if you are working.";

/// Renders `LABEL:\n{value}\n\n` or nothing when the value is absent/blank.
pub fn optional_block(label: &str, value: Option<&str>) -> String {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => format!("{label}:\n{v}\n\n"),
        None => String::new(),
    }
}
