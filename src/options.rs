// src/options.rs

//! The persisted options record and its gateway
//!
//! The add-on keeps all of its state in one small record per tenant:
//! whether it is installed, whether the routing table has been regenerated
//! since the last (re)activation, the installed version, and the version it
//! was upgraded from. The record is written whole on every transition.
//!
//! Invariant: whenever the record is (re)created, `rewrites_flushed` is
//! forced back to `false` so the pending rewrite flush is guaranteed to run
//! again after reactivation.
//!
//! The gateway is a pass-through over the storage collaborator. It does no
//! caching and no validation, and persistence failures propagate to the
//! caller as errors.

use crate::error::Result;
use crate::store::OptionsStore;
use crate::tenant::TenantId;
use semver::Version;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The settings blob persisted for each tenant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionsRecord {
    /// Whether the add-on has completed activation on this tenant
    pub is_installed: bool,

    /// Whether the host's routing table has been regenerated since the
    /// record was last (re)created
    pub rewrites_flushed: bool,

    /// The add-on version that wrote this record
    pub version: String,

    /// The version installed before the most recent activation, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_from: Option<String>,
}

impl OptionsRecord {
    /// Build the record an activation writes
    ///
    /// The flush flag always starts out false, and the prior record's
    /// version (when one existed) is preserved in `updated_from`.
    pub fn for_activation(version: &Version, prior: Option<&OptionsRecord>) -> Self {
        Self {
            is_installed: true,
            rewrites_flushed: false,
            version: version.to_string(),
            updated_from: prior.map(|p| p.version.clone()),
        }
    }
}

/// Thin accessor over the storage collaborator
pub struct OptionsGateway {
    store: Box<dyn OptionsStore>,
}

impl OptionsGateway {
    pub fn new(store: Box<dyn OptionsStore>) -> Self {
        Self { store }
    }

    /// Read the whole record for a tenant, `None` when absent
    pub fn get_all(&self, tenant: TenantId) -> Result<Option<OptionsRecord>> {
        self.store.load(tenant)
    }

    /// Create the record only if none exists; reports whether it was created
    pub fn add(&mut self, tenant: TenantId, record: &OptionsRecord) -> Result<bool> {
        self.store.create(tenant, record)
    }

    /// Overwrite the record unconditionally
    pub fn set_all(&mut self, tenant: TenantId, record: &OptionsRecord) -> Result<()> {
        self.store.save(tenant, record)
    }

    /// Update the flush flag in place
    ///
    /// A missing record is not created here; activation owns record
    /// creation. Returns whether anything was persisted.
    pub fn set_rewrites_flushed(&mut self, tenant: TenantId, flushed: bool) -> Result<bool> {
        match self.store.load(tenant)? {
            Some(mut record) => {
                record.rewrites_flushed = flushed;
                self.store.save(tenant, &record)?;
                Ok(true)
            }
            None => {
                debug!("no options record for tenant {}; flush flag not persisted", tenant);
                Ok(false)
            }
        }
    }

    /// Delete the record; a no-op when none exists
    pub fn delete(&mut self, tenant: TenantId) -> Result<()> {
        self.store.delete(tenant)
    }
}
