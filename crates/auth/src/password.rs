//! Password policy checklist.
//!
//! Evaluated on every keystroke of the sign-up / reset-password forms, so
//! everything here is allocation-light and never fails: a malformed password
//! simply leaves rules unmet.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Minimum length used when none (or an invalid one) is configured.
pub const DEFAULT_MIN_LENGTH: usize = 12;

/// Environment variable holding the configured minimum length.
pub const MIN_LENGTH_ENV: &str = "PASSWORD_MIN_LENGTH";

/// Passwords rejected regardless of composition (compared trimmed, lowercase).
const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "password1",
    "password123",
    "passw0rd",
    "p@ssw0rd",
    "p@ssword123",
    "123456",
    "12345678",
    "123456789",
    "1234567890",
    "111111",
    "000000",
    "qwerty",
    "qwerty123",
    "qwertyuiop",
    "abc123",
    "letmein",
    "welcome",
    "welcome1",
    "welcome123",
    "admin",
    "admin123",
    "administrator",
    "iloveyou",
    "monkey",
    "dragon",
    "football",
    "baseball",
    "sunshine",
    "princess",
    "changeme",
    "trustno1",
    "secret",
];

static LOWERCASE: LazyLock<Regex> = LazyLock::new(|| Regex::new("[a-z]").expect("valid regex"));
static UPPERCASE: LazyLock<Regex> = LazyLock::new(|| Regex::new("[A-Z]").expect("valid regex"));
static DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new("[0-9]").expect("valid regex"));
static SPECIAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[^A-Za-z0-9]").expect("valid regex"));

static PROCESS_POLICY: LazyLock<PasswordPolicy> = LazyLock::new(PasswordPolicy::from_env);

/// The six checklist rules, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PasswordRequirementKey {
    MinLength,
    Lowercase,
    Uppercase,
    Digit,
    Special,
    NotCommon,
}

impl PasswordRequirementKey {
    pub const ALL: [PasswordRequirementKey; 6] = [
        Self::MinLength,
        Self::Lowercase,
        Self::Uppercase,
        Self::Digit,
        Self::Special,
        Self::NotCommon,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MinLength => "min_length",
            Self::Lowercase => "lowercase",
            Self::Uppercase => "uppercase",
            Self::Digit => "digit",
            Self::Special => "special",
            Self::NotCommon => "not_common",
        }
    }
}

/// One checklist line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordRequirementState {
    pub key: PasswordRequirementKey,
    pub label: String,
    pub met: bool,
}

/// Checklist plus a summary for progress bars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordPolicyProgress {
    pub met_count: usize,
    pub total_count: usize,
    /// `round(met_count * 100 / total_count)`.
    pub percent: u8,
    pub states: Vec<PasswordRequirementState>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordPolicy {
    min_length: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_LENGTH,
        }
    }
}

impl PasswordPolicy {
    /// A zero minimum length is treated as unset.
    pub fn new(min_length: usize) -> Self {
        if min_length == 0 {
            return Self::default();
        }
        Self { min_length }
    }

    /// Policy configured from `PASSWORD_MIN_LENGTH`.
    pub fn from_env() -> Self {
        let raw = std::env::var(MIN_LENGTH_ENV).ok();
        Self::new(parse_min_length(raw.as_deref()))
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    pub fn requirement_states(&self, password: &str) -> Vec<PasswordRequirementState> {
        PasswordRequirementKey::ALL
            .into_iter()
            .map(|key| PasswordRequirementState {
                key,
                label: self.label(key),
                met: self.is_met(key, password),
            })
            .collect()
    }

    pub fn is_satisfied(&self, password: &str) -> bool {
        PasswordRequirementKey::ALL
            .into_iter()
            .all(|key| self.is_met(key, password))
    }

    pub fn progress(&self, password: &str) -> PasswordPolicyProgress {
        let states = self.requirement_states(password);
        let met_count = states.iter().filter(|s| s.met).count();
        let total_count = states.len();
        let percent = ((met_count as f64 / total_count as f64) * 100.0).round() as u8;

        PasswordPolicyProgress {
            met_count,
            total_count,
            percent,
            states,
        }
    }

    fn is_met(&self, key: PasswordRequirementKey, password: &str) -> bool {
        match key {
            PasswordRequirementKey::MinLength => password.chars().count() >= self.min_length,
            PasswordRequirementKey::Lowercase => LOWERCASE.is_match(password),
            PasswordRequirementKey::Uppercase => UPPERCASE.is_match(password),
            PasswordRequirementKey::Digit => DIGIT.is_match(password),
            PasswordRequirementKey::Special => SPECIAL.is_match(password),
            PasswordRequirementKey::NotCommon => !is_common_password(password),
        }
    }

    fn label(&self, key: PasswordRequirementKey) -> String {
        match key {
            PasswordRequirementKey::MinLength => format!("At least {} characters", self.min_length),
            PasswordRequirementKey::Lowercase => "One lowercase letter".to_string(),
            PasswordRequirementKey::Uppercase => "One uppercase letter".to_string(),
            PasswordRequirementKey::Digit => "One number".to_string(),
            PasswordRequirementKey::Special => "One special character".to_string(),
            PasswordRequirementKey::NotCommon => "Not a commonly used password".to_string(),
        }
    }
}

/// Parse a configured minimum length; anything but a positive integer falls
/// back to [`DEFAULT_MIN_LENGTH`].
pub fn parse_min_length(raw: Option<&str>) -> usize {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return DEFAULT_MIN_LENGTH;
    };

    match raw.parse::<usize>() {
        Ok(n) if n > 0 => n,
        _ => {
            tracing::warn!(
                value = raw,
                default = DEFAULT_MIN_LENGTH,
                "{MIN_LENGTH_ENV} is not a positive integer; using default"
            );
            DEFAULT_MIN_LENGTH
        }
    }
}

/// Blank input counts as common: an empty field must not tick the box.
fn is_common_password(password: &str) -> bool {
    let normalized = password.trim().to_lowercase();
    normalized.is_empty() || COMMON_PASSWORDS.contains(&normalized.as_str())
}

/// Checklist under the process-wide policy.
pub fn password_requirement_states(password: &str) -> Vec<PasswordRequirementState> {
    PROCESS_POLICY.requirement_states(password)
}

/// True when every rule of the process-wide policy is met.
pub fn is_password_policy_satisfied(password: &str) -> bool {
    PROCESS_POLICY.is_satisfied(password)
}

pub fn password_policy_progress(password: &str) -> PasswordPolicyProgress {
    PROCESS_POLICY.progress(password)
}
