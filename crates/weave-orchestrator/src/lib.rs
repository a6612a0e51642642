//! Issue-driven site orchestrator support.
//!
//! Issues opened from the dashboard are consumed by an orchestrator that
//! reads a persisted policy, honours `policy:` admin titles, screens model
//! plans against the policy and reports back on the issue.
mod orchestrator_plan;
mod orchestrator_policy;
mod orchestrator_report;

pub use orchestrator_plan::{is_safe_relative_path, OrchestratorPlan, PlanStep, StepDecision};
pub use orchestrator_policy::{
    IssueDisposition, OrchestratorError, OrchestratorPolicy, PolicyCommand, DEFAULT_POLICY_PATH,
    POLICY_TITLE_PREFIX,
};
pub use orchestrator_report::{orchestrator_result_comment, RESULT_COMMENT_LOG_TAIL_CHARS};
