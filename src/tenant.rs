// src/tenant.rs

//! Tenant identity and the tenant directory collaborator
//!
//! A tenant is one site within a multi-site deployment of the host
//! platform. Every per-tenant operation in this crate takes an explicit
//! [`TenantId`] parameter; there is no process-wide "current tenant" that
//! gets switched and restored around each call, so a failure mid-operation
//! can never leave the process pointing at the wrong site.
//!
//! The [`TenantDirectory`] answers one question: which tenants are active?
//! Archived, spam, and deleted tenants are excluded at the source, so
//! network-wide lifecycle fan-out never touches them.

use crate::error::Result;
use std::fmt;

/// Identifier for one site within a multi-site deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TenantId(pub u64);

impl TenantId {
    /// The sole tenant of a single-site deployment
    pub const PRIMARY: TenantId = TenantId(1);
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TenantId {
    fn from(id: u64) -> Self {
        TenantId(id)
    }
}

/// Directory of tenants in the deployment
///
/// Implementations must already apply the exclusion filters: the returned
/// set contains only active tenants, never archived, spam, or deleted ones.
pub trait TenantDirectory {
    /// All tenant ids eligible for network-wide operations, in stable order
    fn active_tenants(&self) -> Result<Vec<TenantId>>;
}

/// Directory for single-site deployments: exactly one tenant
#[derive(Debug, Default)]
pub struct SingleSite;

impl TenantDirectory for SingleSite {
    fn active_tenants(&self) -> Result<Vec<TenantId>> {
        Ok(vec![TenantId::PRIMARY])
    }
}

/// Fixed-list directory, used in tests and by embedders that resolve the
/// tenant set themselves
#[derive(Debug, Default)]
pub struct StaticDirectory {
    tenants: Vec<TenantId>,
}

impl StaticDirectory {
    pub fn new(tenants: Vec<TenantId>) -> Self {
        Self { tenants }
    }
}

impl TenantDirectory for StaticDirectory {
    fn active_tenants(&self) -> Result<Vec<TenantId>> {
        Ok(self.tenants.clone())
    }
}
