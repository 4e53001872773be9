//! Permission requirements attached to screens, actions and API calls.

use serde::{Deserialize, Serialize};

use crate::PermissionCode;

/// How a multi-code requirement is matched against granted permissions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckMode {
    /// Every required code must be granted.
    #[default]
    All,
    /// At least one required code must be granted.
    Any,
}

/// Options for a permission check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOptions {
    #[serde(default)]
    pub mode: CheckMode,
}

impl CheckOptions {
    pub fn all() -> Self {
        Self { mode: CheckMode::All }
    }

    pub fn any() -> Self {
        Self { mode: CheckMode::Any }
    }
}

/// A single permission code or an ordered list of them.
///
/// Deserializes from either a JSON string or an array of strings, matching
/// how route and menu definitions declare their guards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PermissionRequirement {
    Single(PermissionCode),
    List(Vec<PermissionCode>),
}

impl PermissionRequirement {
    /// Normalized list of required codes, blank codes dropped.
    pub fn codes(&self) -> Vec<&PermissionCode> {
        match self {
            Self::Single(code) => core::iter::once(code).filter(|c| !c.is_blank()).collect(),
            Self::List(codes) => codes.iter().filter(|c| !c.is_blank()).collect(),
        }
    }

    /// True when the requirement restricts nothing.
    pub fn is_empty(&self) -> bool {
        self.codes().is_empty()
    }
}

impl From<PermissionCode> for PermissionRequirement {
    fn from(value: PermissionCode) -> Self {
        Self::Single(value)
    }
}

impl From<&str> for PermissionRequirement {
    fn from(value: &str) -> Self {
        Self::Single(PermissionCode::from(value))
    }
}

impl From<Vec<PermissionCode>> for PermissionRequirement {
    fn from(value: Vec<PermissionCode>) -> Self {
        Self::List(value)
    }
}

impl From<&[&str]> for PermissionRequirement {
    fn from(value: &[&str]) -> Self {
        Self::List(value.iter().map(|c| PermissionCode::from(*c)).collect())
    }
}

impl<const N: usize> From<[&str; N]> for PermissionRequirement {
    fn from(value: [&str; N]) -> Self {
        Self::List(value.into_iter().map(PermissionCode::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_code_normalizes_to_one_element_list() {
        let req = PermissionRequirement::from("loan.approve");
        let codes: Vec<&str> = req.codes().into_iter().map(|c| c.as_str()).collect();
        assert_eq!(codes, vec!["loan.approve"]);
    }

    #[test]
    fn blank_codes_are_dropped() {
        let req = PermissionRequirement::from(["", "loan.view_own", "  "]);
        assert_eq!(req.codes().len(), 1);
        assert!(PermissionRequirement::from("").is_empty());
        assert!(PermissionRequirement::List(vec![]).is_empty());
    }

    #[test]
    fn deserializes_string_or_array() {
        let single: PermissionRequirement = serde_json::from_str("\"user.manage\"").unwrap();
        assert_eq!(single, PermissionRequirement::from("user.manage"));

        let list: PermissionRequirement =
            serde_json::from_str(r#"["user.manage", "role.manage"]"#).unwrap();
        assert_eq!(list, PermissionRequirement::from(["user.manage", "role.manage"]));
    }

    #[test]
    fn options_default_to_all() {
        assert_eq!(CheckOptions::default().mode, CheckMode::All);
        let opts: CheckOptions = serde_json::from_str(r#"{"mode":"any"}"#).unwrap();
        assert_eq!(opts, CheckOptions::any());
    }
}
