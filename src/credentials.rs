//! Provider API key lookup.
//!
//! The key gates generation only; rendering and validation never need it.
//! Lookup is behind [`CredentialProvider`] so hosts can inject their own
//! source and tests never touch the process environment.

use std::env;
use std::fmt;

use tracing::debug;

use crate::utils::error::CredentialError;

/// Environment variables consulted by [`EnvCredentialProvider`], in order.
pub const DEFAULT_KEY_VARS: [&str; 2] = ["API_KEY", "GEMINI_API_KEY"];

/// A provider API key. `Debug` and `Display` never show the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Check a raw key. Blank keys and keys containing whitespace or control
    /// characters are rejected.
    pub fn parse(raw: &str) -> Result<Self, CredentialError> {
        if raw.trim().is_empty() {
            return Err(CredentialError::Invalid {
                reason: "key is blank".to_string(),
            });
        }
        if raw.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(CredentialError::Invalid {
                reason: "key contains whitespace or control characters".to_string(),
            });
        }
        Ok(ApiKey(raw.to_string()))
    }

    /// The secret itself, for the transport layer.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey(<redacted, {} chars>)", self.0.chars().count())
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

/// Outcome of a key lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialState {
    Absent,
    Present(ApiKey),
    /// A key is configured but unusable; the string says why.
    Invalid(String),
}

impl CredentialState {
    /// State for an optional raw value.
    pub fn from_value(raw: Option<&str>) -> Self {
        match raw {
            None => CredentialState::Absent,
            Some(raw) => match ApiKey::parse(raw) {
                Ok(key) => CredentialState::Present(key),
                Err(CredentialError::Invalid { reason }) => CredentialState::Invalid(reason),
                Err(CredentialError::Absent) => CredentialState::Absent,
            },
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, CredentialState::Present(_))
    }

    pub fn require(self) -> Result<ApiKey, CredentialError> {
        match self {
            CredentialState::Present(key) => Ok(key),
            CredentialState::Absent => Err(CredentialError::Absent),
            CredentialState::Invalid(reason) => Err(CredentialError::Invalid { reason }),
        }
    }
}

impl fmt::Display for CredentialState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialState::Absent => write!(f, "absent"),
            CredentialState::Present(_) => write!(f, "present"),
            CredentialState::Invalid(reason) => write!(f, "invalid ({})", reason),
        }
    }
}

/// Source of the provider API key.
pub trait CredentialProvider {
    fn state(&self) -> CredentialState;

    /// The key, or why generation cannot start.
    fn require(&self) -> Result<ApiKey, CredentialError> {
        self.state().require()
    }
}

/// Reads the key from environment variables.
///
/// The first variable that is set to a non-empty value decides the state.
#[derive(Debug, Clone)]
pub struct EnvCredentialProvider {
    vars: Vec<String>,
}

impl Default for EnvCredentialProvider {
    fn default() -> Self {
        Self::with_vars(DEFAULT_KEY_VARS)
    }
}

impl EnvCredentialProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vars<I, S>(vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            vars: vars.into_iter().map(Into::into).collect(),
        }
    }

    pub fn vars(&self) -> &[String] {
        &self.vars
    }
}

impl CredentialProvider for EnvCredentialProvider {
    fn state(&self) -> CredentialState {
        for var in &self.vars {
            match env::var(var) {
                Ok(value) if value.is_empty() => continue,
                Ok(value) => {
                    debug!(var = var.as_str(), "api key found in environment");
                    return CredentialState::from_value(Some(&value));
                }
                Err(env::VarError::NotPresent) => continue,
                Err(env::VarError::NotUnicode(_)) => {
                    return CredentialState::Invalid(format!("{} is not valid unicode", var));
                }
            }
        }
        CredentialState::Absent
    }
}

/// A fixed key, for hosts that manage secrets themselves and for tests.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialProvider {
    key: Option<String>,
}

impl StaticCredentialProvider {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
        }
    }

    pub fn absent() -> Self {
        Self::default()
    }
}

impl CredentialProvider for StaticCredentialProvider {
    fn state(&self) -> CredentialState {
        CredentialState::from_value(self.key.as_deref())
    }
}
