//! `stockloan-auth` — client-side authorization and credential policy.
//!
//! This crate is intentionally decoupled from HTTP and rendering: every check
//! is a pure function over data the portal already fetched.

pub mod authorize;
pub mod otp;
pub mod password;
pub mod permissions;
pub mod requirement;
pub mod user;

pub use authorize::{
    DecisionReason, PermissionDecision, PermissionGated, can, can_access, can_permissions,
    explain_permission_check,
};
pub use otp::{OtpAlgorithm, OtpKind, OtpUri, OtpUriError, parse_otp_url};
pub use password::{
    PasswordPolicy, PasswordPolicyProgress, PasswordRequirementKey, PasswordRequirementState,
    is_password_policy_satisfied, password_policy_progress, password_requirement_states,
};
pub use permissions::PermissionCode;
pub use requirement::{CheckMode, CheckOptions, PermissionRequirement};
pub use user::AuthUser;
