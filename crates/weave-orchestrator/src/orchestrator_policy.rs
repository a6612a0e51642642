use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub const DEFAULT_POLICY_PATH: &str = ".weave/policy.json";
/// Issue titles starting with this prefix are admin commands, not tasks.
pub const POLICY_TITLE_PREFIX: &str = "policy:";
const DEFAULT_MAX_LOOPS: u32 = 4;
const DEFAULT_BUILD_CMD: &str = "npm run build";
const DEFAULT_ALLOW_RUN: [&str; 18] = [
    "npm", "npx", "pnpm", "yarn", "node", "bun", "echo", "printf", "mkdir", "touch", "cp", "mv",
    "rm", "sed", "awk", "bash", "sh", "curl",
];

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed policy file {}: {source}", path.display())]
    MalformedPolicy {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode policy: {0}")]
    Encode(#[source] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
/// Persisted orchestrator settings. Keys missing from the file take their
/// defaults; keys this crate does not know are kept and written back.
pub struct OrchestratorPolicy {
    pub enabled: bool,
    pub max_loops: u32,
    pub build_cmd: String,
    /// First words a `RUN` step may start with.
    pub allow_run: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for OrchestratorPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            max_loops: DEFAULT_MAX_LOOPS,
            build_cmd: DEFAULT_BUILD_CMD.to_string(),
            allow_run: DEFAULT_ALLOW_RUN
                .iter()
                .map(|command| (*command).to_string())
                .collect(),
            extra: Map::new(),
        }
    }
}

impl OrchestratorPolicy {
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Reads the policy at `path`, writing the defaults there first when the
    /// file does not exist yet.
    pub fn load_or_init(path: &Path) -> Result<Self, OrchestratorError> {
        if !path.exists() {
            let policy = Self::default();
            policy.save(path)?;
            tracing::info!(path = %path.display(), "initialized default orchestrator policy");
            return Ok(policy);
        }
        let raw = fs::read_to_string(path).map_err(|source| OrchestratorError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw).map_err(|source| OrchestratorError::MalformedPolicy {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), OrchestratorError> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| OrchestratorError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let encoded = serde_json::to_string_pretty(self).map_err(OrchestratorError::Encode)?;
        fs::write(path, encoded).map_err(|source| OrchestratorError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// True when the first whitespace-separated word of `cmd` is allow-listed.
    pub fn is_command_allowed(&self, cmd: &str) -> bool {
        cmd.split_whitespace()
            .next()
            .is_some_and(|first| self.allow_run.iter().any(|allowed| allowed == first))
    }

    /// Applies an admin command; returns whether the policy changed.
    pub fn apply_command(&mut self, command: &PolicyCommand) -> bool {
        let before = self.clone();
        match command {
            PolicyCommand::Enable => self.enabled = true,
            PolicyCommand::Disable => self.enabled = false,
            PolicyCommand::SetMaxLoops(loops) => self.max_loops = *loops,
            PolicyCommand::Unrecognized(_) => {}
        }
        *self != before
    }

    pub fn disposition(&self, title: &str) -> IssueDisposition {
        if let Some(command) = PolicyCommand::parse_title(title) {
            return IssueDisposition::PolicyUpdate(command);
        }
        if !self.enabled {
            return IssueDisposition::Disabled;
        }
        IssueDisposition::Task
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyCommand {
    Enable,
    Disable,
    SetMaxLoops(u32),
    /// A `policy:` title whose command is unknown or lacks a number.
    Unrecognized(String),
}

impl PolicyCommand {
    /// Reads a `policy: ...` admin title, case-insensitively. `None` for
    /// ordinary task titles.
    pub fn parse_title(title: &str) -> Option<Self> {
        let lowered = title.trim().to_lowercase();
        let command = lowered.strip_prefix(POLICY_TITLE_PREFIX)?.trim();
        let parsed = match command {
            "enable" => Self::Enable,
            "disable" => Self::Disable,
            _ if command.starts_with("loops") => match first_number(command) {
                Some(loops) => Self::SetMaxLoops(loops),
                None => Self::Unrecognized(command.to_string()),
            },
            _ => Self::Unrecognized(command.to_string()),
        };
        Some(parsed)
    }
}

fn first_number(text: &str) -> Option<u32> {
    static DIGITS: OnceLock<Option<Regex>> = OnceLock::new();
    DIGITS
        .get_or_init(|| Regex::new(r"\d+").ok())
        .as_ref()?
        .find(text)?
        .as_str()
        .parse()
        .ok()
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// What the orchestrator does with an incoming issue title.
pub enum IssueDisposition {
    PolicyUpdate(PolicyCommand),
    Disabled,
    Task,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn unit_policy_commands_parse_case_insensitively() {
        assert_eq!(
            PolicyCommand::parse_title("Policy: Disable"),
            Some(PolicyCommand::Disable)
        );
        assert_eq!(
            PolicyCommand::parse_title("  policy:enable  "),
            Some(PolicyCommand::Enable)
        );
        assert_eq!(
            PolicyCommand::parse_title("policy: loops 7"),
            Some(PolicyCommand::SetMaxLoops(7))
        );
        assert_eq!(
            PolicyCommand::parse_title("policy: loops=12 please"),
            Some(PolicyCommand::SetMaxLoops(12))
        );
        assert_eq!(PolicyCommand::parse_title("GEN: page /about"), None);
    }

    #[test]
    fn regression_loops_without_number_is_unrecognized() {
        assert_eq!(
            PolicyCommand::parse_title("policy: loops"),
            Some(PolicyCommand::Unrecognized("loops".to_string()))
        );
        assert_eq!(
            PolicyCommand::parse_title("policy: freeze"),
            Some(PolicyCommand::Unrecognized("freeze".to_string()))
        );
    }

    #[test]
    fn unit_partial_policy_merges_over_defaults_and_keeps_unknown_keys() {
        let policy =
            OrchestratorPolicy::from_json_str(r#"{"max_loops": 2, "owner": "ops"}"#).expect("parse");
        assert!(policy.enabled);
        assert_eq!(policy.max_loops, 2);
        assert_eq!(policy.build_cmd, "npm run build");
        assert_eq!(policy.allow_run.len(), 18);
        assert_eq!(policy.extra.get("owner"), Some(&Value::from("ops")));

        let encoded = serde_json::to_value(&policy).expect("encode");
        assert_eq!(encoded["owner"], "ops");
        assert_eq!(encoded["max_loops"], 2);
    }

    #[test]
    fn unit_apply_command_reports_changes() {
        let mut policy = OrchestratorPolicy::default();
        assert!(!policy.apply_command(&PolicyCommand::Enable));
        assert!(policy.apply_command(&PolicyCommand::Disable));
        assert!(!policy.enabled);
        assert!(policy.apply_command(&PolicyCommand::SetMaxLoops(9)));
        assert_eq!(policy.max_loops, 9);
        assert!(!policy.apply_command(&PolicyCommand::Unrecognized("x".to_string())));
    }

    #[test]
    fn unit_command_allow_list_checks_first_word_only() {
        let policy = OrchestratorPolicy::default();
        assert!(policy.is_command_allowed("npm install --yes"));
        assert!(policy.is_command_allowed("  echo hi && python evil.py"));
        assert!(!policy.is_command_allowed("python -c 'print(1)'"));
        assert!(!policy.is_command_allowed("npmx install"));
        assert!(!policy.is_command_allowed("   "));
    }

    #[test]
    fn functional_disposition_prefers_policy_titles_then_enabled_flag() {
        let mut policy = OrchestratorPolicy::default();
        assert_eq!(policy.disposition("GEN: page /blog"), IssueDisposition::Task);

        policy.enabled = false;
        assert_eq!(policy.disposition("GEN: page /blog"), IssueDisposition::Disabled);
        assert_eq!(
            policy.disposition("policy: enable"),
            IssueDisposition::PolicyUpdate(PolicyCommand::Enable)
        );
    }

    #[test]
    fn integration_load_or_init_writes_defaults_then_round_trips_updates() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join(".weave").join("policy.json");

        let mut policy = OrchestratorPolicy::load_or_init(&path).expect("init policy");
        assert_eq!(policy, OrchestratorPolicy::default());
        assert!(path.exists());

        policy.apply_command(&PolicyCommand::SetMaxLoops(3));
        policy.save(&path).expect("save policy");
        let reloaded = OrchestratorPolicy::load_or_init(&path).expect("reload policy");
        assert_eq!(reloaded.max_loops, 3);
    }

    #[test]
    fn regression_malformed_policy_file_is_reported_with_path() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("policy.json");
        fs::write(&path, "{not json").expect("write policy");

        let error = OrchestratorPolicy::load_or_init(&path).expect_err("malformed policy");
        assert!(matches!(error, OrchestratorError::MalformedPolicy { .. }));
        assert!(error.to_string().contains("policy.json"));
    }
}
