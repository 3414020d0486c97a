//! Pure counting helpers over raw resume text.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static SECTION_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:summary|experience|education|skills|projects|objective)\b")
        .expect("section keyword pattern is valid")
});

static BULLET_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*[•\-*▪◦][ \t]+(.*)$").expect("bullet pattern is valid")
});

/// Section names tracked when diffing an original document against its enhancement.
const CHANGE_SECTIONS: &[&str] = &[
    "summary",
    "experience",
    "education",
    "skills",
    "projects",
    "certifications",
    "languages",
    "awards",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextMetrics {
    pub word_count: usize,
    pub section_count: usize,
    pub bullet_point_count: usize,
}

impl TextMetrics {
    pub fn measure(text: &str) -> Self {
        Self {
            word_count: word_count(text),
            section_count: section_count(text),
            bullet_point_count: bullet_point_count(text),
        }
    }
}

/// Whitespace-delimited token count.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Occurrences of the section-header vocabulary, case-insensitive, whole words.
pub fn section_count(text: &str) -> usize {
    SECTION_KEYWORD.find_iter(text).count()
}

/// List markers (`•`, `-`, `*`, `▪`, `◦`) at line starts.
pub fn bullet_point_count(text: &str) -> usize {
    BULLET_LINE.find_iter(text).count()
}

/// The text of every detected bullet line, markers stripped.
pub fn bullet_lines(text: &str) -> Vec<&str> {
    BULLET_LINE
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Before/after summary of an enhancement. Always computed from the final pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSummary {
    pub word_count_change: i64,
    pub percent_change: f64,
    pub sections_added: usize,
    pub bullet_points_added: i64,
}

impl ChangeSummary {
    pub fn between(original: &str, enhanced: &str) -> Self {
        let before = word_count(original) as i64;
        let after = word_count(enhanced) as i64;
        let percent_change = if before > 0 {
            (((after - before) as f64 / before as f64) * 1000.0).round() / 10.0
        } else {
            0.0
        };

        let original_sections = present_sections(original);
        let sections_added = present_sections(enhanced)
            .into_iter()
            .filter(|s| !original_sections.contains(s))
            .count();

        Self {
            word_count_change: after - before,
            percent_change,
            sections_added,
            bullet_points_added: bullet_point_count(enhanced) as i64
                - bullet_point_count(original) as i64,
        }
    }
}

fn present_sections(text: &str) -> Vec<&'static str> {
    let lower = text.to_lowercase();
    CHANGE_SECTIONS
        .iter()
        .copied()
        .filter(|s| lower.contains(s))
        .collect()
}
