//! Locates a named section span in free text and swaps it out.
//!
//! A section starts at the first header match and ends at the next blank line or the end
//! of the document. Headers are matched case-insensitively anywhere in the text, so a body
//! line mentioning "experience" before the real header wins. Known limitation.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static SUMMARY_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:professional summary|summary|objective)\b")
        .expect("summary header pattern is valid")
});

static EXPERIENCE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:work experience|experience|employment)\b")
        .expect("experience header pattern is valid")
});

static SKILLS_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:technical skills|skills|competencies)\b")
        .expect("skills header pattern is valid")
});

static BLANK_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("blank line pattern is valid"));

static EDUCATION_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:education|academic background)\b")
        .expect("education header pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Summary,
    Experience,
    Skills,
}

impl SectionKind {
    fn header(self) -> &'static Regex {
        match self {
            SectionKind::Summary => &SUMMARY_HEADER,
            SectionKind::Experience => &EXPERIENCE_HEADER,
            SectionKind::Skills => &SKILLS_HEADER,
        }
    }
}

/// Byte range of the section, header included, up to (not including) the next blank line.
pub fn locate_section(document: &str, kind: SectionKind) -> Option<Range<usize>> {
    let header = kind.header().find(document)?;
    let end = BLANK_LINE
        .find_at(document, header.end())
        .map_or(document.len(), |m| m.start());
    Some(header.start()..end)
}

/// Replaces the section with `new_content`, or inserts it when the section is missing:
/// before the education header if one exists, otherwise at the end.
///
/// Blank content leaves the document untouched. A rewrite without its own header keeps the
/// located header. Replaying the same rewrite is a no-op: the located span already equals
/// the replacement, or the inserted block already sits at the insertion point.
pub fn replace_section(document: &str, kind: SectionKind, new_content: &str) -> String {
    let new_content = new_content.trim();
    if new_content.is_empty() {
        return document.to_string();
    }

    if let Some(span) = locate_section(document, kind) {
        let replacement = if kind.header().is_match(new_content) {
            new_content.to_string()
        } else {
            let header_end = kind
                .header()
                .find_at(document, span.start)
                .map_or(span.start, |m| m.end());
            format!("{}\n{}", &document[span.start..header_end], new_content)
        };
        if document[span.clone()] == replacement {
            return document.to_string();
        }

        let mut out = String::with_capacity(document.len() + replacement.len());
        out.push_str(&document[..span.start]);
        out.push_str(&replacement);
        out.push_str(&document[span.end..]);
        return out;
    }

    match EDUCATION_HEADER.find(document) {
        Some(education) => {
            let before = document[..education.start()].trim_end();
            if ends_with_block(before, new_content) {
                return document.to_string();
            }
            format!(
                "{}\n\n{}\n\n{}",
                before,
                new_content,
                &document[education.start()..]
            )
        }
        None => {
            let before = document.trim_end();
            if ends_with_block(before, new_content) {
                return document.to_string();
            }
            format!("{}\n\n{}", before, new_content)
        }
    }
}

/// True when `text` ends with `block` starting on a line of its own.
fn ends_with_block(text: &str, block: &str) -> bool {
    text.strip_suffix(block)
        .is_some_and(|rest| rest.is_empty() || rest.ends_with('\n'))
}
