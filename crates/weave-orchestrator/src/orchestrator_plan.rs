use std::fmt;
use std::path::{Component, Path};
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::orchestrator_policy::OrchestratorPolicy;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPlanStep {
    #[serde(rename = "type")]
    kind: String,
    path: String,
    content: String,
    cmd: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanStep {
    Write { path: String, content: String },
    Run { cmd: String },
    Other { kind: String },
}

impl PlanStep {
    fn from_value(value: &Value) -> Self {
        let Ok(raw) = RawPlanStep::deserialize(value) else {
            return Self::Other {
                kind: String::new(),
            };
        };
        match raw.kind.to_uppercase().as_str() {
            "WRITE" => Self::Write {
                path: raw.path,
                content: raw.content,
            },
            "RUN" => Self::Run {
                cmd: raw.cmd.trim().to_string(),
            },
            _ => Self::Other { kind: raw.kind },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Steps proposed by the model for one orchestration loop.
pub struct OrchestratorPlan {
    pub steps: Vec<PlanStep>,
}

impl OrchestratorPlan {
    pub fn from_value(payload: &Value) -> Self {
        let steps = payload
            .get("steps")
            .and_then(Value::as_array)
            .map(|steps| steps.iter().map(PlanStep::from_value).collect())
            .unwrap_or_default();
        Self { steps }
    }

    /// Parses a model reply that should be a bare `{"steps": [...]}` object.
    /// Prose before a trailing object is tolerated; anything else yields an
    /// empty plan.
    pub fn parse_model_reply(content: &str) -> Self {
        if let Ok(payload) = serde_json::from_str::<Value>(content) {
            return Self::from_value(&payload);
        }
        trailing_json_object(content)
            .and_then(|raw| serde_json::from_str::<Value>(raw).ok())
            .map(|payload| Self::from_value(&payload))
            .unwrap_or_default()
    }

    /// Screens every step against `policy` without touching the filesystem.
    pub fn screen(&self, policy: &OrchestratorPolicy) -> Vec<StepDecision> {
        self.steps
            .iter()
            .map(|step| match step {
                PlanStep::Write { path, content } if is_safe_relative_path(path) => {
                    StepDecision::Write {
                        path: path.clone(),
                        chars: content.chars().count(),
                    }
                }
                PlanStep::Write { path, .. } => StepDecision::SkipUnsafeWrite { path: path.clone() },
                PlanStep::Run { cmd } if policy.is_command_allowed(cmd) => {
                    StepDecision::Run { cmd: cmd.clone() }
                }
                PlanStep::Run { cmd } => StepDecision::SkipDisallowedRun { cmd: cmd.clone() },
                PlanStep::Other { kind } => StepDecision::Ignore { kind: kind.clone() },
            })
            .collect()
    }
}

fn trailing_json_object(content: &str) -> Option<&str> {
    static TRAILING_OBJECT: OnceLock<Option<Regex>> = OnceLock::new();
    TRAILING_OBJECT
        .get_or_init(|| Regex::new(r"(?s)\{.*\}\s*$").ok())
        .as_ref()?
        .find(content)
        .map(|found| found.as_str())
}

/// A write target must stay inside the working tree: relative, non-empty
/// and free of `..` components.
pub fn is_safe_relative_path(raw: &str) -> bool {
    if raw.trim().is_empty() {
        return false;
    }
    Path::new(raw)
        .components()
        .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepDecision {
    Write { path: String, chars: usize },
    SkipUnsafeWrite { path: String },
    Run { cmd: String },
    SkipDisallowedRun { cmd: String },
    Ignore { kind: String },
}

impl StepDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Write { .. } | Self::Run { .. })
    }
}

impl fmt::Display for StepDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Write { path, chars } => write!(f, "WRITE {path} ({chars} chars)"),
            Self::SkipUnsafeWrite { path } => write!(f, "SKIP WRITE {path} (unsafe)"),
            Self::Run { cmd } => write!(f, "RUN {cmd}"),
            Self::SkipDisallowedRun { cmd } => write!(f, "SKIP RUN {cmd} (not allowed)"),
            Self::Ignore { kind } => write!(f, "IGNORE step type '{kind}'"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unit_steps_parse_with_case_insensitive_types() {
        let plan = OrchestratorPlan::from_value(&json!({
            "steps": [
                {"type": "write", "path": "app/blog/page.tsx", "content": "x"},
                {"type": "RUN", "cmd": "  npm install  "},
                {"type": "DELETE", "path": "app"},
                "not an object"
            ]
        }));
        assert_eq!(
            plan.steps,
            vec![
                PlanStep::Write {
                    path: "app/blog/page.tsx".to_string(),
                    content: "x".to_string()
                },
                PlanStep::Run {
                    cmd: "npm install".to_string()
                },
                PlanStep::Other {
                    kind: "DELETE".to_string()
                },
                PlanStep::Other {
                    kind: String::new()
                },
            ]
        );
    }

    #[test]
    fn unit_model_reply_with_leading_prose_uses_trailing_object() {
        let plan = OrchestratorPlan::parse_model_reply(
            "Sure, here you go:\n{\"steps\": [{\"type\": \"RUN\", \"cmd\": \"echo hi\"}]}\n",
        );
        assert_eq!(
            plan.steps,
            vec![PlanStep::Run {
                cmd: "echo hi".to_string()
            }]
        );
    }

    #[test]
    fn regression_unparseable_model_reply_yields_empty_plan() {
        for reply in ["no json here", "{broken", "[1, 2]", "{\"steps\": 3}"] {
            assert!(OrchestratorPlan::parse_model_reply(reply).steps.is_empty());
        }
    }

    #[test]
    fn unit_path_guard_rejects_parent_and_absolute_paths() {
        assert!(is_safe_relative_path("app/about/page.tsx"));
        assert!(is_safe_relative_path("./pages/index.tsx"));
        assert!(!is_safe_relative_path("../secrets.txt"));
        assert!(!is_safe_relative_path("app/../../etc/passwd"));
        assert!(!is_safe_relative_path("/etc/passwd"));
        assert!(!is_safe_relative_path("  "));
    }

    #[test]
    fn functional_screen_applies_path_guard_and_allow_list() {
        let mut policy = OrchestratorPolicy::default();
        policy.allow_run = vec!["npm".to_string()];
        let plan = OrchestratorPlan::parse_model_reply(
            &json!({
                "steps": [
                    {"type": "WRITE", "path": "app/blog/page.tsx", "content": "héllo"},
                    {"type": "WRITE", "path": "../outside.txt", "content": "x"},
                    {"type": "RUN", "cmd": "npm run lint"},
                    {"type": "RUN", "cmd": "curl https://example.com"},
                    {"type": "NOTE"}
                ]
            })
            .to_string(),
        );

        let decisions = plan.screen(&policy);
        let lines: Vec<String> = decisions.iter().map(ToString::to_string).collect();
        assert_eq!(
            lines,
            vec![
                "WRITE app/blog/page.tsx (5 chars)",
                "SKIP WRITE ../outside.txt (unsafe)",
                "RUN npm run lint",
                "SKIP RUN curl https://example.com (not allowed)",
                "IGNORE step type 'NOTE'",
            ]
        );
        let accepted = decisions.iter().filter(|decision| decision.is_accepted());
        assert_eq!(accepted.count(), 2);
    }
}
