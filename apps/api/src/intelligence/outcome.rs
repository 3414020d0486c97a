//! Tagged task result: a completion either decoded cleanly or degraded to a default shape.
//!
//! Hard failures (gateway errors) travel separately as `Err(AppError)`, so every task
//! returns `Result<TaskOutcome<T>, AppError>` and the degrade-vs-fail split is explicit.

use serde::{Serialize, Serializer};

#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome<T> {
    Complete(T),
    Degraded {
        partial: T,
        reason: String,
        raw_content: String,
    },
}

impl<T> TaskOutcome<T> {
    pub fn value(&self) -> &T {
        match self {
            TaskOutcome::Complete(v) => v,
            TaskOutcome::Degraded { partial, .. } => partial,
        }
    }

    pub fn value_mut(&mut self) -> &mut T {
        match self {
            TaskOutcome::Complete(v) => v,
            TaskOutcome::Degraded { partial, .. } => partial,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            TaskOutcome::Complete(v) => v,
            TaskOutcome::Degraded { partial, .. } => partial,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, TaskOutcome::Degraded { .. })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OutcomeWire<'a, T> {
    #[serde(flatten)]
    data: &'a T,
    parsed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw_content: Option<&'a str>,
}

/// Serializes as the flattened shape plus `parsed`, and for degraded results
/// `parseError` and `rawContent`.
impl<T: Serialize> Serialize for TaskOutcome<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let wire = match self {
            TaskOutcome::Complete(data) => OutcomeWire {
                data,
                parsed: true,
                parse_error: None,
                raw_content: None,
            },
            TaskOutcome::Degraded {
                partial,
                reason,
                raw_content,
            } => OutcomeWire {
                data: partial,
                parsed: false,
                parse_error: Some(reason),
                raw_content: Some(raw_content),
            },
        };
        wire.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Debug, Default, Serialize, PartialEq)]
    struct Shape {
        score: Option<f64>,
    }

    #[test]
    fn test_complete_serializes_flat_with_parsed_true() {
        let outcome = TaskOutcome::Complete(Shape { score: Some(8.0) });
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["score"], 8.0);
        assert_eq!(value["parsed"], true);
        assert!(value.get("parseError").is_none());
    }

    #[test]
    fn test_degraded_carries_reason_and_raw_content() {
        let outcome = TaskOutcome::Degraded {
            partial: Shape::default(),
            reason: "no JSON object found".to_string(),
            raw_content: "plain prose".to_string(),
        };
        assert!(outcome.is_degraded());
        assert_eq!(outcome.value(), &Shape::default());

        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["parsed"], false);
        assert_eq!(value["parseError"], "no JSON object found");
        assert_eq!(value["rawContent"], "plain prose");
        assert!(value["score"].is_null());
    }
}
