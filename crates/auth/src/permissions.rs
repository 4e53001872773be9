use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Permission code.
///
/// Permissions are modeled as opaque strings (e.g. "loan.view_own"). By
/// convention codes are dotted, `<namespace>.<action>`, but nothing here
/// depends on that beyond the `namespace`/`action` accessors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionCode(Cow<'static, str>);

impl PermissionCode {
    pub fn new(code: impl Into<Cow<'static, str>>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Empty or whitespace-only codes never restrict anything.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Text before the first dot (`"loan"` for `"loan.view_own"`).
    pub fn namespace(&self) -> Option<&str> {
        self.0.split_once('.').map(|(ns, _)| ns)
    }

    /// Text after the last dot (`"view_own"` for `"loan.view_own"`).
    pub fn action(&self) -> Option<&str> {
        self.0.rsplit_once('.').map(|(_, action)| action)
    }
}

impl core::fmt::Display for PermissionCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PermissionCode {
    fn from(value: &str) -> Self {
        Self(Cow::Owned(value.to_owned()))
    }
}

impl From<String> for PermissionCode {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}
