//! Orchestrator helper subcommands run from the issue workflow.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;
use weave_gateway::WeaveGatewayConfig;
use weave_github_issues::{GithubIssueClient, GithubIssueClientConfig};
use weave_orchestrator::{
    orchestrator_result_comment, IssueDisposition, OrchestratorPlan, OrchestratorPolicy,
    DEFAULT_POLICY_PATH,
};

use crate::cli_args::parse_positive_u64;

#[derive(Debug, Clone, Subcommand)]
pub enum WeaveCommand {
    /// Apply a `policy:` admin title, or report whether a task issue may run.
    TriageIssue {
        #[arg(long, env = "ISSUE_TITLE")]
        title: String,
        #[arg(long, default_value = DEFAULT_POLICY_PATH)]
        policy_path: PathBuf,
    },
    /// Screen a model plan against the policy allow-list and path guard.
    ScreenPlan {
        #[arg(long)]
        plan_file: PathBuf,
        #[arg(long, default_value = DEFAULT_POLICY_PATH)]
        policy_path: PathBuf,
    },
    /// Post the orchestration result comment on an issue.
    ReportResult {
        #[arg(long, env = "ISSUE_NUMBER", value_parser = parse_positive_u64)]
        issue_number: u64,
        #[arg(long, default_value_t = false)]
        succeeded: bool,
        #[arg(long)]
        loops: u32,
        #[arg(long)]
        log_file: PathBuf,
    },
}

pub async fn run_weave_command(command: WeaveCommand, config: &WeaveGatewayConfig) -> Result<()> {
    match command {
        WeaveCommand::TriageIssue { title, policy_path } => {
            println!("{}", triage_issue(&title, &policy_path)?);
        }
        WeaveCommand::ScreenPlan {
            plan_file,
            policy_path,
        } => {
            for line in screen_plan_file(&plan_file, &policy_path)? {
                println!("{line}");
            }
        }
        WeaveCommand::ReportResult {
            issue_number,
            succeeded,
            loops,
            log_file,
        } => {
            let url = report_result(config, issue_number, succeeded, loops, &log_file).await?;
            println!("{url}");
        }
    }
    Ok(())
}

fn triage_issue(title: &str, policy_path: &Path) -> Result<String> {
    let mut policy = OrchestratorPolicy::load_or_init(policy_path)?;
    let summary = match policy.disposition(title) {
        IssueDisposition::PolicyUpdate(command) => {
            if policy.apply_command(&command) {
                policy.save(policy_path)?;
                tracing::info!(
                    ?command,
                    path = %policy_path.display(),
                    "orchestrator policy updated"
                );
            }
            format!(
                "policy: enabled={} max_loops={}",
                policy.enabled, policy.max_loops
            )
        }
        IssueDisposition::Disabled => "orchestrator disabled by policy".to_string(),
        IssueDisposition::Task => format!("task accepted: up to {} loop(s)", policy.max_loops),
    };
    Ok(summary)
}

fn screen_plan_file(plan_file: &Path, policy_path: &Path) -> Result<Vec<String>> {
    let policy = OrchestratorPolicy::load_or_init(policy_path)?;
    let reply = fs::read_to_string(plan_file)
        .with_context(|| format!("failed to read plan file {}", plan_file.display()))?;
    let decisions = OrchestratorPlan::parse_model_reply(&reply).screen(&policy);
    tracing::debug!(
        steps = decisions.len(),
        accepted = decisions.iter().filter(|decision| decision.is_accepted()).count(),
        "screened orchestrator plan"
    );
    Ok(decisions.iter().map(ToString::to_string).collect())
}

async fn report_result(
    config: &WeaveGatewayConfig,
    issue_number: u64,
    succeeded: bool,
    loops: u32,
    log_file: &Path,
) -> Result<String> {
    let log = fs::read_to_string(log_file)
        .with_context(|| format!("failed to read log file {}", log_file.display()))?;
    let client = GithubIssueClient::new(GithubIssueClientConfig {
        api_base: config.github_api_base.clone(),
        token: config.github_token.clone(),
        request_timeout_ms: config.request_timeout_ms,
    })
    .context("failed to construct github issue client")?;
    let comment = client
        .comment_on_issue(
            issue_number,
            &orchestrator_result_comment(succeeded, loops, &log),
        )
        .await
        .with_context(|| format!("failed to comment on issue #{issue_number}"))?;
    Ok(comment.url)
}
