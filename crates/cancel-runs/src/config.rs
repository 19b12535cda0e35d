//! Process inputs: repository, current run and the branch to deduplicate.

use tracing::info;

use crate::error::ConfigError;
use crate::models::TriggerEvent;

const BRANCH_PREFIX: &str = "refs/heads/";
const TAG_PREFIX: &str = "refs/tags/";

/// Repository an operation is scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

impl Repository {
    /// Parse an `owner/repo` slug.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRepository`] unless the slug has exactly
    /// two non-empty segments.
    pub fn parse(slug: &str) -> Result<Self, ConfigError> {
        match slug.trim().split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(ConfigError::InvalidRepository(slug.to_string())),
        }
    }
}

impl std::fmt::Display for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Raw inputs, as read from flags or the Actions environment.
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    pub repository: String,
    pub run_id: String,
    pub event_name: String,
    pub git_ref: Option<String>,
    pub head_ref: Option<String>,
}

/// Everything the pipeline needs to know about the current run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    pub repository: Repository,
    pub run_id: u64,
    pub event: TriggerEvent,
    pub branch: String,
}

/// Outcome of validating the inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Deduplicate sibling runs on this branch.
    Dedupe(RunContext),
    /// Nothing to do for this invocation.
    Skip(String),
}

/// Branch named by a ref, if the ref is deduplicable at all.
enum RefKind {
    Branch(String),
    Tag,
}

fn classify_ref(git_ref: &str) -> Result<RefKind, ConfigError> {
    if let Some(branch) = git_ref.strip_prefix(BRANCH_PREFIX) {
        if branch.is_empty() {
            return Err(ConfigError::UnsupportedRef(git_ref.to_string()));
        }
        Ok(RefKind::Branch(branch.to_string()))
    } else if git_ref.starts_with(TAG_PREFIX) {
        Ok(RefKind::Tag)
    } else {
        Err(ConfigError::UnsupportedRef(git_ref.to_string()))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn required<'a>(value: &'a str, name: &'static str) -> Result<&'a str, ConfigError> {
    non_empty(Some(value)).ok_or(ConfigError::Missing(name))
}

impl Inputs {
    /// Validate the inputs and decide whether this invocation deduplicates.
    ///
    /// Push runs take their branch from `git_ref`; pull request runs from
    /// `head_ref`, falling back to `git_ref`. Tag refs and other events skip.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for missing or malformed inputs and for refs
    /// that are neither branches nor tags.
    pub fn resolve_target(&self) -> Result<Target, ConfigError> {
        let repository = Repository::parse(required(&self.repository, "repository")?)?;
        let raw_run_id = required(&self.run_id, "run id")?;
        let run_id = raw_run_id
            .parse::<u64>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| ConfigError::InvalidRunId(raw_run_id.to_string()))?;
        let event_name = required(&self.event_name, "event name")?;

        let event = TriggerEvent::parse(event_name);
        let git_ref = non_empty(self.git_ref.as_deref());
        let head_ref = non_empty(self.head_ref.as_deref());

        let branch = match event {
            TriggerEvent::PullRequest if head_ref.is_some() => {
                head_ref.map(ToString::to_string)
            }
            TriggerEvent::Push | TriggerEvent::PullRequest => {
                match classify_ref(git_ref.ok_or(ConfigError::Missing("ref"))?)? {
                    RefKind::Branch(branch) => Some(branch),
                    RefKind::Tag => None,
                }
            }
            _ => {
                info!(event = event_name, "Event is not deduplicated, skipping");
                return Ok(Target::Skip(format!("event '{event_name}' is not deduplicated")));
            }
        };

        let Some(branch) = branch else {
            info!(git_ref = ?git_ref, "Tag refs are not deduplicated, skipping");
            return Ok(Target::Skip("tag refs are not deduplicated".to_string()));
        };

        Ok(Target::Dedupe(RunContext {
            repository,
            run_id,
            event,
            branch,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(event: &str, git_ref: Option<&str>, head_ref: Option<&str>) -> Inputs {
        Inputs {
            repository: "octo/widgets".to_string(),
            run_id: "4242".to_string(),
            event_name: event.to_string(),
            git_ref: git_ref.map(ToString::to_string),
            head_ref: head_ref.map(ToString::to_string),
        }
    }

    fn branch_of(target: Target) -> String {
        match target {
            Target::Dedupe(ctx) => ctx.branch,
            Target::Skip(reason) => panic!("unexpected skip: {reason}"),
        }
    }

    #[test]
    fn test_push_strips_branch_prefix() {
        let target = inputs("push", Some("refs/heads/feature/login"), None)
            .resolve_target()
            .unwrap();
        let Target::Dedupe(ctx) = target else {
            panic!("expected dedupe");
        };
        assert_eq!(ctx.branch, "feature/login");
        assert_eq!(ctx.run_id, 4242);
        assert_eq!(ctx.event, TriggerEvent::Push);
        assert_eq!(ctx.repository.to_string(), "octo/widgets");
    }

    #[test]
    fn test_push_tag_skips() {
        let target = inputs("push", Some("refs/tags/v1.2.0"), None)
            .resolve_target()
            .unwrap();
        assert!(matches!(target, Target::Skip(_)));
    }

    #[test]
    fn test_push_unsupported_ref() {
        let err = inputs("push", Some("refs/pull/12/merge"), None)
            .resolve_target()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnsupportedRef("refs/pull/12/merge".to_string())
        );

        let err = inputs("push", Some("refs/heads/"), None)
            .resolve_target()
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedRef(_)));
    }

    #[test]
    fn test_push_missing_ref() {
        let err = inputs("push", Some("  "), None).resolve_target().unwrap_err();
        assert_eq!(err, ConfigError::Missing("ref"));
    }

    #[test]
    fn test_pull_request_uses_head_ref() {
        let target = inputs("pull_request", Some("refs/pull/7/merge"), Some("fix-typo"))
            .resolve_target()
            .unwrap();
        assert_eq!(branch_of(target), "fix-typo");
    }

    #[test]
    fn test_pull_request_falls_back_to_ref() {
        let target = inputs("pull_request", Some("refs/heads/main"), Some(""))
            .resolve_target()
            .unwrap();
        assert_eq!(branch_of(target), "main");
    }

    #[test]
    fn test_other_events_skip() {
        for event in ["schedule", "workflow_dispatch", "release"] {
            let target = inputs(event, Some("refs/heads/main"), None)
                .resolve_target()
                .unwrap();
            assert!(matches!(target, Target::Skip(_)), "{event} should skip");
        }
    }

    #[test]
    fn test_invalid_inputs() {
        let mut bad = inputs("push", Some("refs/heads/main"), None);
        bad.repository = "no-slash".to_string();
        assert!(matches!(
            bad.resolve_target(),
            Err(ConfigError::InvalidRepository(_))
        ));

        let mut bad = inputs("push", Some("refs/heads/main"), None);
        bad.run_id = "abc".to_string();
        assert_eq!(
            bad.resolve_target(),
            Err(ConfigError::InvalidRunId("abc".to_string()))
        );

        let mut bad = inputs("push", Some("refs/heads/main"), None);
        bad.event_name = String::new();
        assert_eq!(bad.resolve_target(), Err(ConfigError::Missing("event name")));
    }

    #[test]
    fn test_repository_parse() {
        assert!(Repository::parse("a/b").is_ok());
        assert!(Repository::parse("a/b/c").is_err());
        assert!(Repository::parse("/b").is_err());
        assert!(Repository::parse("a/").is_err());
    }
}
