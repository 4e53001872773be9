//! The authenticated user as returned by the portal's `/auth/me` endpoint.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use stockloan_core::{TenantId, UserId};

use crate::PermissionCode;

/// Authenticated portal user.
///
/// This crate consumes the user; it never fetches or caches it. Fields the
/// API may omit default to the least-privileged value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub tenant_id: Option<TenantId>,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default)]
    pub permissions: Vec<PermissionCode>,
}

impl AuthUser {
    pub fn new(id: UserId, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            tenant_id: None,
            is_superuser: false,
            permissions: Vec::new(),
        }
    }

    pub fn with_tenant(mut self, tenant_id: TenantId) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    pub fn with_permissions<I, P>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PermissionCode>,
    {
        self.permissions = permissions.into_iter().map(Into::into).collect();
        self
    }

    pub fn superuser(mut self) -> Self {
        self.is_superuser = true;
        self
    }

    /// Granted codes as a set (the list is unique and unordered by contract).
    pub fn permission_set(&self) -> HashSet<&str> {
        self.permissions.iter().map(|p| p.as_str()).collect()
    }

    pub fn has_permission(&self, code: &str) -> bool {
        self.permissions.iter().any(|p| p.as_str() == code)
    }
}
