//! Strongly-typed identifiers exchanged with the portal API.
//!
//! All ids are UUIDs on the wire (plain strings in JSON); the newtypes only
//! keep a tenant id from being passed where a loan id is expected.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $t:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $t(Uuid);

        impl $t {
            /// Fresh time-ordered (v7) id, for records created client-side and tests.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::from_str(s.trim())
                    .map(Self)
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", stringify!($t), e)))
            }
        }
    };
}

uuid_id!(
    /// Tenant organization (multi-tenant boundary).
    TenantId
);
uuid_id!(
    /// Portal user.
    UserId
);
uuid_id!(
    /// Stock-option loan.
    LoanId
);
