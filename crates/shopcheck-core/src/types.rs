//! Core type definitions for the shopcheck suite

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::warn;

use crate::config::SuiteConfig;
use crate::{Result, ShopError};

/// One of the three stages of a single test's execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Setup,
    Call,
    Teardown,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Setup => write!(f, "setup"),
            Self::Call => write!(f, "call"),
            Self::Teardown => write!(f, "teardown"),
        }
    }
}

/// Outcome of a single phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PhaseOutcome {
    Passed,
    Failed { detail: String },
}

impl PhaseOutcome {
    pub fn failed(detail: impl Into<String>) -> Self {
        Self::Failed {
            detail: detail.into(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Failure detail, if the phase failed
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Passed => None,
            Self::Failed { detail } => Some(detail),
        }
    }
}

/// Per-test record of phase outcomes
///
/// One record exists per test invocation. The runner fills in one outcome per
/// phase as it goes; post-test hooks only ever see it by shared reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRecord {
    test_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    setup: Option<PhaseOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    call: Option<PhaseOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    teardown: Option<PhaseOutcome>,
}

impl TestRecord {
    pub fn new(test_id: impl Into<String>) -> Self {
        Self {
            test_id: test_id.into(),
            setup: None,
            call: None,
            teardown: None,
        }
    }

    pub fn test_id(&self) -> &str {
        &self.test_id
    }

    fn slot(&mut self, phase: Phase) -> &mut Option<PhaseOutcome> {
        match phase {
            Phase::Setup => &mut self.setup,
            Phase::Call => &mut self.call,
            Phase::Teardown => &mut self.teardown,
        }
    }

    /// Record the outcome of a phase. A phase is recorded once; later writes
    /// for the same phase are ignored.
    pub fn record(&mut self, phase: Phase, outcome: PhaseOutcome) {
        if self.outcome(phase).is_some() {
            warn!("{} phase of {} already recorded, ignoring", phase, self.test_id);
            return;
        }
        *self.slot(phase) = Some(outcome);
    }

    pub fn outcome(&self, phase: Phase) -> Option<&PhaseOutcome> {
        match phase {
            Phase::Setup => self.setup.as_ref(),
            Phase::Call => self.call.as_ref(),
            Phase::Teardown => self.teardown.as_ref(),
        }
    }

    /// True only when the call phase ran and failed
    pub fn call_failed(&self) -> bool {
        self.call.as_ref().is_some_and(PhaseOutcome::is_failed)
    }

    /// True when any recorded phase failed
    pub fn failed(&self) -> bool {
        self.first_failure().is_some()
    }

    /// First failing phase in execution order, with its detail
    pub fn first_failure(&self) -> Option<(Phase, &str)> {
        [Phase::Setup, Phase::Call, Phase::Teardown]
            .into_iter()
            .find_map(|phase| {
                self.outcome(phase)
                    .and_then(PhaseOutcome::detail)
                    .map(|detail| (phase, detail))
            })
    }
}

/// Login credentials for one scenario user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }
}

/// Immutable table of scenario users keyed by scenario name
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserTable {
    users: BTreeMap<String, Credentials>,
}

impl UserTable {
    /// The users known to the saucedemo application
    pub fn saucedemo() -> Self {
        let entries = [
            ("correctUser1", "standard_user", "secret_sauce"),
            ("lockedUser1", "locked_out_user", "secret_sauce"),
            ("wrongPass1", "standard_user", "wrong_password"),
            ("emptyUsername1", "", "secret_sauce"),
            ("emptyPassword1", "standard_user", ""),
            ("problemUser1", "problem_user", "secret_sauce"),
            ("visualUser1", "visual_user", "secret_sauce"),
            ("performanceUser1", "performance_glitch_user", "secret_sauce"),
            ("errorUser1", "error_user", "secret_sauce"),
        ];

        Self {
            users: entries
                .into_iter()
                .map(|(key, user, pass)| (key.to_string(), Credentials::new(user, pass)))
                .collect(),
        }
    }

    /// Consume the table and return one with `overrides` merged over it
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, Credentials>) -> Self {
        for (key, creds) in overrides {
            self.users.insert(key.clone(), creds.clone());
        }
        self
    }

    pub fn get(&self, key: &str) -> Result<&Credentials> {
        self.users
            .get(key)
            .ok_or_else(|| ShopError::UnknownUser(key.to_string()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.users.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Credentials)> {
        self.users.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// Test data shared by every test in a run
///
/// Built once from [`SuiteConfig`] and handed to tests behind an `Arc`; it is
/// never mutated after construction.
#[derive(Debug, Clone)]
pub struct Fixtures {
    pub base_url: String,
    pub users: UserTable,
    pub login_failure_users: Vec<String>,
    pub screenshot_dir: PathBuf,
}

impl Fixtures {
    pub fn from_config(config: &SuiteConfig) -> Result<Self> {
        let users = UserTable::saucedemo().with_overrides(&config.users);

        for key in &config.login_failure_users {
            users.get(key).map_err(|_| {
                ShopError::Config(format!(
                    "login_failure_users references unknown user '{}'",
                    key
                ))
            })?;
        }

        Ok(Self {
            base_url: config.base_url.clone(),
            users,
            login_failure_users: config.login_failure_users.clone(),
            screenshot_dir: config.screenshot_dir.clone(),
        })
    }

    /// Join a page path onto the base URL
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn user(&self, key: &str) -> Result<&Credentials> {
        self.users.get(key)
    }
}
