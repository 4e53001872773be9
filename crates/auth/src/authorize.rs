use std::collections::HashSet;

use serde::Serialize;

use crate::{AuthUser, CheckMode, CheckOptions, PermissionCode, PermissionRequirement};

/// Client-side gate for screens, menu entries and actions.
///
/// Implement this on anything the UI shows conditionally; `can_access`
/// evaluates it against the signed-in user.
pub trait PermissionGated {
    /// `None` means the item is visible to every signed-in user.
    fn required_permissions(&self) -> Option<PermissionRequirement>;

    fn check_options(&self) -> CheckOptions {
        CheckOptions::default()
    }
}

/// Decide whether `user` satisfies `required`.
///
/// - No IO
/// - No panics
/// - Absent inputs degrade to `true`: an absent or empty requirement, or an
///   absent user, always allows
/// - Superusers always pass
pub fn can(
    user: Option<&AuthUser>,
    required: Option<&PermissionRequirement>,
    options: CheckOptions,
) -> bool {
    explain_permission_check(user, required, options).granted
}

/// Same evaluation as [`can`] against a bare permission list.
///
/// There is no superuser flag here; use this when only a list of grants is
/// at hand (e.g. previewing what a role would unlock).
pub fn can_permissions(
    granted: &[PermissionCode],
    required: Option<&PermissionRequirement>,
    options: CheckOptions,
) -> bool {
    let Some(codes) = required.map(PermissionRequirement::codes).filter(|c| !c.is_empty()) else {
        return true;
    };

    let granted: HashSet<&str> = granted.iter().map(|p| p.as_str()).collect();
    missing_codes(&granted, &codes, options.mode).is_empty()
}

/// Evaluate a gated item for the signed-in user.
pub fn can_access<G: PermissionGated + ?Sized>(user: Option<&AuthUser>, item: &G) -> bool {
    can(user, item.required_permissions().as_ref(), item.check_options())
}

// ─────────────────────────────────────────────────────────────────────────────
// Decision Explanation
// ─────────────────────────────────────────────────────────────────────────────

/// Why a permission check came out the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    /// Nothing was required.
    NoRequirement,
    /// The user is a superuser; fine-grained checks were skipped.
    Superuser,
    /// The user's grants satisfied the requirement.
    Granted,
    /// One or more required codes were not granted.
    Missing,
    /// No user was supplied; the check degrades to allow.
    NoUser,
}

/// Detailed, serializable result of a permission check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionDecision {
    pub granted: bool,
    pub reason: DecisionReason,
    pub mode: CheckMode,
    /// Normalized required codes (blank codes dropped).
    pub required: Vec<PermissionCode>,
    /// Codes that would have to be granted for the check to pass. For `any`
    /// mode this is every required code when none is held.
    pub missing: Vec<PermissionCode>,
}

impl PermissionDecision {
    fn allow(reason: DecisionReason, mode: CheckMode, required: Vec<PermissionCode>) -> Self {
        Self {
            granted: true,
            reason,
            mode,
            required,
            missing: Vec::new(),
        }
    }
}

/// Evaluate a permission check and explain the outcome.
///
/// Denials are logged at `debug` with the missing codes, which is usually
/// what one wants when a button unexpectedly disappears.
pub fn explain_permission_check(
    user: Option<&AuthUser>,
    required: Option<&PermissionRequirement>,
    options: CheckOptions,
) -> PermissionDecision {
    let mode = options.mode;
    let codes = required.map(PermissionRequirement::codes).unwrap_or_default();
    let required_owned: Vec<PermissionCode> = codes.iter().map(|c| (*c).clone()).collect();

    if codes.is_empty() {
        return PermissionDecision::allow(DecisionReason::NoRequirement, mode, required_owned);
    }

    let Some(user) = user else {
        tracing::debug!(required = ?required_owned, "permission check without a user; allowing");
        return PermissionDecision::allow(DecisionReason::NoUser, mode, required_owned);
    };

    if user.is_superuser {
        return PermissionDecision::allow(DecisionReason::Superuser, mode, required_owned);
    }

    let missing = missing_codes(&user.permission_set(), &codes, mode);
    if missing.is_empty() {
        return PermissionDecision::allow(DecisionReason::Granted, mode, required_owned);
    }

    tracing::debug!(
        user_id = %user.id,
        ?mode,
        missing = ?missing,
        "permission check denied"
    );

    PermissionDecision {
        granted: false,
        reason: DecisionReason::Missing,
        mode,
        required: required_owned,
        missing,
    }
}

fn missing_codes(
    granted: &HashSet<&str>,
    required: &[&PermissionCode],
    mode: CheckMode,
) -> Vec<PermissionCode> {
    let absent = required.iter().filter(|c| !granted.contains(c.as_str()));

    match mode {
        CheckMode::All => absent.map(|c| (*c).clone()).collect(),
        CheckMode::Any => {
            if required.iter().any(|c| granted.contains(c.as_str())) {
                Vec::new()
            } else {
                absent.map(|c| (*c).clone()).collect()
            }
        }
    }
}
