//! Recommendation Ranker: turns analysis outputs into a prioritized action list.

use serde::{Deserialize, Serialize};

use crate::intelligence::analyzer::{AtsAnalysis, BasicAnalysis, EnhancementSuggestions};

/// Content scores below this trigger a content recommendation.
const CONTENT_SCORE_THRESHOLD: f64 = 7.0;
/// Max keywords / verbs quoted in an action line.
const MAX_LISTED: usize = 5;

/// Ordered high → medium → low; the derived `Ord` drives the ranking sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    #[allow(dead_code)]
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub category: String,
    pub title: String,
    pub description: String,
    pub action: String,
}

/// Evaluates every rule independently, then stable-sorts by priority.
pub fn rank(
    basic: &BasicAnalysis,
    ats: Option<&AtsAnalysis>,
    suggestions: &EnhancementSuggestions,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if !basic.grammar_issues.is_empty() {
        recommendations.push(Recommendation {
            priority: Priority::High,
            category: "grammar".to_string(),
            title: "Fix Grammar Issues".to_string(),
            description: format!(
                "Found {} grammar/spelling issues",
                basic.grammar_issues.len()
            ),
            action: "Review and correct grammatical errors".to_string(),
        });
    }

    if let Some(ats) = ats.filter(|a| !a.missing_keywords.is_empty()) {
        recommendations.push(Recommendation {
            priority: Priority::High,
            category: "ats".to_string(),
            title: "Add Missing Keywords".to_string(),
            description: format!(
                "Add {} keywords for better ATS match",
                ats.missing_keywords.len()
            ),
            action: format!("Incorporate: {}", first_n(&ats.missing_keywords)),
        });
    }

    if basic
        .content_score
        .is_some_and(|score| score < CONTENT_SCORE_THRESHOLD)
    {
        recommendations.push(Recommendation {
            priority: Priority::Medium,
            category: "content".to_string(),
            title: "Improve Content Quality".to_string(),
            description: "Resume content needs enhancement".to_string(),
            action: "Add more quantifiable achievements and specific details".to_string(),
        });
    }

    if !suggestions.action_verbs.is_empty() {
        recommendations.push(Recommendation {
            priority: Priority::Medium,
            category: "enhancement".to_string(),
            title: "Use Stronger Action Verbs".to_string(),
            description: "Replace weak verbs with impactful ones".to_string(),
            action: format!("Consider using: {}", first_n(&suggestions.action_verbs)),
        });
    }

    // sort_by_key is stable: equal priorities keep insertion order.
    recommendations.sort_by_key(|r| r.priority);
    recommendations
}

fn first_n(items: &[String]) -> String {
    items
        .iter()
        .take(MAX_LISTED)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn basic(grammar: &[&str], content: Option<f64>) -> BasicAnalysis {
        BasicAnalysis {
            grammar_issues: strings(grammar),
            content_score: content,
            ..BasicAnalysis::default()
        }
    }

    fn suggestions(verbs: &[&str]) -> EnhancementSuggestions {
        EnhancementSuggestions {
            action_verbs: strings(verbs),
            ..EnhancementSuggestions::default()
        }
    }

    #[test]
    fn test_no_triggers_no_recommendations() {
        let recs = rank(&basic(&[], Some(9.0)), None, &suggestions(&[]));
        assert!(recs.is_empty());
    }

    #[test]
    fn test_all_rules_fire_in_priority_order() {
        let ats = AtsAnalysis {
            missing_keywords: strings(&["Kubernetes", "Terraform"]),
            ..AtsAnalysis::default()
        };
        let recs = rank(
            &basic(&["teh"], Some(5.0)),
            Some(&ats),
            &suggestions(&["Spearheaded"]),
        );
        let categories: Vec<_> = recs.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(categories, vec!["grammar", "ats", "content", "enhancement"]);
    }

    #[test]
    fn test_medium_never_precedes_high() {
        // Only medium rules plus one high rule: high must still lead.
        let ats = AtsAnalysis {
            missing_keywords: strings(&["Go"]),
            ..AtsAnalysis::default()
        };
        let recs = rank(&basic(&[], Some(3.0)), Some(&ats), &suggestions(&["Led"]));
        let first_medium = recs.iter().position(|r| r.priority == Priority::Medium);
        let last_high = recs.iter().rposition(|r| r.priority == Priority::High);
        assert!(last_high < first_medium);
    }

    #[test]
    fn test_ats_action_lists_at_most_five() {
        let ats = AtsAnalysis {
            missing_keywords: strings(&["a", "b", "c", "d", "e", "f", "g"]),
            ..AtsAnalysis::default()
        };
        let recs = rank(&basic(&[], None), Some(&ats), &suggestions(&[]));
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].action, "Incorporate: a, b, c, d, e");
        assert_eq!(recs[0].description, "Add 7 keywords for better ATS match");
    }

    #[test]
    fn test_missing_content_score_does_not_trigger() {
        let recs = rank(&basic(&[], None), None, &suggestions(&[]));
        assert!(recs.iter().all(|r| r.category != "content"));
    }

    #[test]
    fn test_content_threshold_is_strict() {
        assert!(rank(&basic(&[], Some(7.0)), None, &suggestions(&[])).is_empty());
        assert_eq!(rank(&basic(&[], Some(6.9)), None, &suggestions(&[])).len(), 1);
    }

    #[test]
    fn test_no_ats_no_keyword_rule() {
        let recs = rank(&basic(&["x"], None), None, &suggestions(&["Built"]));
        assert!(recs.iter().all(|r| r.category != "ats"));
    }

    #[test]
    fn test_priority_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"high\"");
        assert_eq!(serde_json::to_string(&Priority::Low).unwrap(), "\"low\"");
    }
}
