//! Weak → strong verb substitution over a whole document.

use regex::{NoExpand, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::intelligence::parser::lenient;

/// Parallel lists: `strong_verbs[i]` replaces `weak_verbs[i]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerbMapping {
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub weak_verbs: Vec<String>,
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub strong_verbs: Vec<String>,
}

impl VerbMapping {
    pub fn apply(&self, document: &str) -> String {
        apply_verb_map(document, &self.weak_verbs, &self.strong_verbs)
    }
}

/// Replaces every whole-word, case-insensitive occurrence of each weak verb.
///
/// A missing or blank replacement at index `i` falls back to `strong[0]`. Entries with
/// no usable weak or strong verb are skipped. Replacements are inserted literally.
pub fn apply_verb_map(document: &str, weak: &[String], strong: &[String]) -> String {
    let fallback = strong.first().map(|s| s.trim()).filter(|s| !s.is_empty());
    let mut out = document.to_string();

    for (i, weak_verb) in weak.iter().enumerate() {
        let weak_verb = weak_verb.trim();
        if weak_verb.is_empty() {
            continue;
        }
        let replacement = strong
            .get(i)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .or(fallback);
        let Some(replacement) = replacement else {
            continue;
        };

        let pattern = format!(r"\b{}\b", regex::escape(weak_verb));
        let Ok(re) = RegexBuilder::new(&pattern).case_insensitive(true).build() else {
            debug!("Skipping unusable weak verb pattern: {weak_verb}");
            continue;
        };
        out = re.replace_all(&out, NoExpand(replacement)).into_owned();
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_missing_strong_verb_falls_back_to_first() {
        let out = apply_verb_map(
            "Managed a team. Led the migration.",
            &strings(&["managed", "led"]),
            &strings(&["directed"]),
        );
        assert_eq!(out, "directed a team. directed the migration.");
    }

    #[test]
    fn test_whole_word_only() {
        let out = apply_verb_map(
            "Helped onboard; helpers helped too",
            &strings(&["helped"]),
            &strings(&["enabled"]),
        );
        assert_eq!(out, "enabled onboard; helpers enabled too");
    }

    #[test]
    fn test_multi_word_weak_phrase() {
        let out = apply_verb_map(
            "- Responsible for billing",
            &strings(&["responsible for"]),
            &strings(&["Owned"]),
        );
        assert_eq!(out, "- Owned billing");
    }

    #[test]
    fn test_blank_entries_skipped() {
        let out = apply_verb_map(
            "Worked on search",
            &strings(&["", "worked on"]),
            &strings(&["", "Built"]),
        );
        assert_eq!(out, "Built search");
    }

    #[test]
    fn test_no_strong_verbs_is_noop() {
        let doc = "Managed things";
        assert_eq!(apply_verb_map(doc, &strings(&["managed"]), &[]), doc);
    }

    #[test]
    fn test_replacement_is_literal() {
        let out = apply_verb_map("Did work", &strings(&["did"]), &strings(&["$1 Delivered"]));
        assert_eq!(out, "$1 Delivered work");
    }

    #[test]
    fn test_mapping_decodes_single_string_lists() {
        let mapping: VerbMapping =
            serde_json::from_str(r#"{"weakVerbs": "managed", "strongVerbs": ["led"]}"#).unwrap();
        assert_eq!(mapping.apply("I managed it"), "I led it");
    }
}
