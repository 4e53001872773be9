//! `stockloan-core` — shared domain primitives (ids, money, errors).
//!
//! This crate contains **pure domain** primitives (no transport or storage concerns).

pub mod error;
pub mod id;
pub mod money;

pub use error::{DomainError, DomainResult};
pub use id::{LoanId, TenantId, UserId};
pub use money::Money;
