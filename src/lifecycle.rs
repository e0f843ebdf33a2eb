// src/lifecycle.rs

//! Activation, deactivation, and uninstall
//!
//! The coordinator translates the host's three lifecycle triggers into
//! idempotent options-record transitions, fanned out across tenants when a
//! network-wide action is requested. Per-tenant state is a two-state
//! machine: `Uninstalled`, or `Installed` with a pending-or-done rewrite
//! flush.
//!
//! Fan-out is sequential and carries the tenant id as an explicit
//! parameter; there is no global context to switch and restore. A failure
//! mid-iteration stops the fan-out and leaves already-processed tenants
//! transitioned — there is no rollback, matching the best-effort contract
//! of the storage collaborator.
//!
//! Every transition is gated on the acting principal's manage-add-ons
//! capability. Denial is a silent no-op rather than an error; that policy
//! comes from the host platform and is kept as-is.

use crate::error::Result;
use crate::host::{Authorizer, RewriteFlusher};
use crate::options::{OptionsGateway, OptionsRecord};
use crate::tenant::{TenantDirectory, TenantId};
use semver::Version;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Per-tenant install state derived from the options record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallState {
    Uninstalled,
    Installed { rewrites_flushed: bool },
}

/// How far a lifecycle action reaches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Act on a single tenant
    Tenant(TenantId),
    /// Act on every active tenant in the deployment
    Network,
}

/// Coordinates lifecycle transitions across the deployment
pub struct Lifecycle {
    options: Arc<Mutex<OptionsGateway>>,
    directory: Box<dyn TenantDirectory>,
    authorizer: Box<dyn Authorizer>,
    flusher: Arc<Mutex<dyn RewriteFlusher>>,
    version: Version,
}

impl Lifecycle {
    pub fn new(
        options: Arc<Mutex<OptionsGateway>>,
        directory: Box<dyn TenantDirectory>,
        authorizer: Box<dyn Authorizer>,
        flusher: Arc<Mutex<dyn RewriteFlusher>>,
        version: Version,
    ) -> Self {
        Self {
            options,
            directory,
            authorizer,
            flusher,
            version,
        }
    }

    /// Set up the options record on activation
    ///
    /// Idempotent: activating an already-activated tenant rewrites the
    /// record in the same shape, resetting the flush flag.
    pub fn activate(&mut self, scope: Scope) -> Result<()> {
        self.fan_out(scope, Self::activate_tenant)
    }

    /// Flush rewrite rules on deactivation; the record is left alone
    pub fn deactivate(&mut self, scope: Scope) -> Result<()> {
        self.fan_out(scope, Self::deactivate_tenant)
    }

    /// Remove the options record everywhere
    ///
    /// Uninstall is always network-wide, however it was invoked.
    pub fn uninstall(&mut self) -> Result<()> {
        self.fan_out(Scope::Network, Self::uninstall_tenant)
    }

    /// Activate a tenant that was just added to the deployment
    pub fn provision_tenant(&mut self, tenant: TenantId) -> Result<()> {
        info!("provisioning new tenant {}", tenant);
        self.activate_tenant(tenant)
    }

    /// Report a tenant's install state
    pub fn status(&self, tenant: TenantId) -> Result<InstallState> {
        let record = self.options.lock().unwrap().get_all(tenant)?;
        Ok(match record {
            Some(record) if record.is_installed => InstallState::Installed {
                rewrites_flushed: record.rewrites_flushed,
            },
            _ => InstallState::Uninstalled,
        })
    }

    fn fan_out(&mut self, scope: Scope, op: fn(&mut Self, TenantId) -> Result<()>) -> Result<()> {
        match scope {
            Scope::Tenant(tenant) => op(self, tenant),
            Scope::Network => {
                for tenant in self.directory.active_tenants()? {
                    op(self, tenant)?;
                }
                Ok(())
            }
        }
    }

    fn authorized(&self) -> bool {
        if self.authorizer.can_manage_addons() {
            return true;
        }
        debug!("principal lacks the manage-add-ons capability; skipping transition");
        false
    }

    fn activate_tenant(&mut self, tenant: TenantId) -> Result<()> {
        if !self.authorized() {
            return Ok(());
        }

        let mut options = self.options.lock().unwrap();
        let prior = options.get_all(tenant)?;
        let record = OptionsRecord::for_activation(&self.version, prior.as_ref());

        if let Some(prior) = &prior {
            self.log_version_change(tenant, &prior.version);
        } else {
            info!("tenant {}: fresh install of {}", tenant, self.version);
        }

        if !options.add(tenant, &record)? {
            options.set_all(tenant, &record)?;
        }
        Ok(())
    }

    fn deactivate_tenant(&mut self, tenant: TenantId) -> Result<()> {
        if !self.authorized() {
            return Ok(());
        }
        self.flusher.lock().unwrap().flush(tenant)
    }

    fn uninstall_tenant(&mut self, tenant: TenantId) -> Result<()> {
        if !self.authorized() {
            return Ok(());
        }
        debug!("tenant {}: deleting options record", tenant);
        self.options.lock().unwrap().delete(tenant)
    }

    fn log_version_change(&self, tenant: TenantId, prior: &str) {
        match Version::parse(prior) {
            Ok(prior_version) if prior_version < self.version => {
                info!("tenant {}: upgraded {} -> {}", tenant, prior_version, self.version);
            }
            Ok(prior_version) if prior_version > self.version => {
                warn!(
                    "tenant {}: downgraded {} -> {}",
                    tenant, prior_version, self.version
                );
            }
            Ok(_) => {
                info!("tenant {}: reactivated {}", tenant, self.version);
            }
            Err(_) => {
                warn!("tenant {}: prior version '{}' is not valid semver", tenant, prior);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{AllowAll, CountingFlusher, DenyAll};
    use crate::store::{MemoryStore, OptionsStore};
    use crate::tenant::{SingleSite, StaticDirectory};

    fn lifecycle_over(
        store: MemoryStore,
        directory: Box<dyn TenantDirectory>,
        authorizer: Box<dyn Authorizer>,
        version: &str,
    ) -> (Lifecycle, Arc<Mutex<CountingFlusher>>) {
        let options = Arc::new(Mutex::new(OptionsGateway::new(Box::new(store))));
        let flusher = Arc::new(Mutex::new(CountingFlusher::new()));
        let lifecycle = Lifecycle::new(
            options,
            directory,
            authorizer,
            flusher.clone(),
            Version::parse(version).unwrap(),
        );
        (lifecycle, flusher)
    }

    fn single_site(version: &str) -> (Lifecycle, MemoryStore) {
        let store = MemoryStore::new();
        let (lifecycle, _flusher) = lifecycle_over(
            store.clone(),
            Box::new(SingleSite),
            Box::new(AllowAll),
            version,
        );
        (lifecycle, store)
    }

    #[test]
    fn test_fresh_install_writes_expected_record() {
        let (mut lifecycle, store) = single_site("0.1.0");
        lifecycle.activate(Scope::Tenant(TenantId::PRIMARY)).unwrap();

        let record = store.load(TenantId::PRIMARY).unwrap().unwrap();
        assert_eq!(
            record,
            crate::options::OptionsRecord {
                is_installed: true,
                rewrites_flushed: false,
                version: "0.1.0".to_string(),
                updated_from: None,
            }
        );
    }

    #[test]
    fn test_activate_twice_is_idempotent() {
        let (mut lifecycle, store) = single_site("0.1.0");
        lifecycle.activate(Scope::Tenant(TenantId::PRIMARY)).unwrap();
        let first = store.load(TenantId::PRIMARY).unwrap().unwrap();

        lifecycle.activate(Scope::Tenant(TenantId::PRIMARY)).unwrap();
        let second = store.load(TenantId::PRIMARY).unwrap().unwrap();

        assert!(!first.rewrites_flushed);
        assert!(!second.rewrites_flushed);
        // The reactivation records where it came from; nothing else moves.
        assert_eq!(second.updated_from.as_deref(), Some("0.1.0"));
        assert_eq!(second.version, first.version);
        assert_eq!(second.is_installed, first.is_installed);
    }

    #[test]
    fn test_reactivation_resets_flush_flag() {
        let (mut lifecycle, mut store) = single_site("0.1.0");
        lifecycle.activate(Scope::Tenant(TenantId::PRIMARY)).unwrap();

        let mut record = store.load(TenantId::PRIMARY).unwrap().unwrap();
        record.rewrites_flushed = true;
        store.save(TenantId::PRIMARY, &record).unwrap();

        lifecycle.activate(Scope::Tenant(TenantId::PRIMARY)).unwrap();
        let record = store.load(TenantId::PRIMARY).unwrap().unwrap();
        assert!(!record.rewrites_flushed);
    }

    #[test]
    fn test_upgrade_preserves_prior_version() {
        let (mut lifecycle, store) = single_site("0.1.0");
        lifecycle.activate(Scope::Tenant(TenantId::PRIMARY)).unwrap();

        let (mut upgraded, _flusher) = lifecycle_over(
            store.clone(),
            Box::new(SingleSite),
            Box::new(AllowAll),
            "0.2.0",
        );
        upgraded.activate(Scope::Tenant(TenantId::PRIMARY)).unwrap();

        let record = store.load(TenantId::PRIMARY).unwrap().unwrap();
        assert_eq!(record.version, "0.2.0");
        assert_eq!(record.updated_from.as_deref(), Some("0.1.0"));
    }

    #[test]
    fn test_uninstall_after_activate_removes_record() {
        let (mut lifecycle, store) = single_site("0.1.0");
        lifecycle.activate(Scope::Tenant(TenantId::PRIMARY)).unwrap();
        lifecycle.uninstall().unwrap();
        assert_eq!(store.load(TenantId::PRIMARY).unwrap(), None);
        assert_eq!(
            lifecycle.status(TenantId::PRIMARY).unwrap(),
            InstallState::Uninstalled
        );
    }

    #[test]
    fn test_uninstall_without_activation_is_a_noop() {
        let (mut lifecycle, store) = single_site("0.1.0");
        lifecycle.uninstall().unwrap();
        assert_eq!(store.load(TenantId::PRIMARY).unwrap(), None);
    }

    #[test]
    fn test_deactivate_flushes_without_touching_record() {
        let (mut lifecycle, _store) = single_site("0.1.0");
        lifecycle.activate(Scope::Tenant(TenantId::PRIMARY)).unwrap();

        let before = lifecycle.status(TenantId::PRIMARY).unwrap();
        lifecycle.deactivate(Scope::Tenant(TenantId::PRIMARY)).unwrap();
        assert_eq!(lifecycle.status(TenantId::PRIMARY).unwrap(), before);
    }

    #[test]
    fn test_deactivate_flush_is_state_independent() {
        let store = MemoryStore::new();
        let (mut lifecycle, flusher) = lifecycle_over(
            store,
            Box::new(SingleSite),
            Box::new(AllowAll),
            "0.1.0",
        );
        // Never activated; the flush still happens.
        lifecycle.deactivate(Scope::Tenant(TenantId::PRIMARY)).unwrap();
        assert_eq!(flusher.lock().unwrap().flushed(), &[TenantId::PRIMARY]);
    }

    #[test]
    fn test_network_activate_covers_active_set_only() {
        let store = MemoryStore::new();
        let active = vec![TenantId(1), TenantId(2), TenantId(5)];
        let (mut lifecycle, _flusher) = lifecycle_over(
            store.clone(),
            Box::new(StaticDirectory::new(active.clone())),
            Box::new(AllowAll),
            "0.1.0",
        );
        lifecycle.activate(Scope::Network).unwrap();

        for tenant in active {
            assert_eq!(
                lifecycle.status(tenant).unwrap(),
                InstallState::Installed {
                    rewrites_flushed: false
                }
            );
        }
        // A tenant the directory filtered out is untouched.
        assert_eq!(store.load(TenantId(3)).unwrap(), None);
    }

    #[test]
    fn test_network_scoped_uninstall_covers_every_tenant() {
        let store = MemoryStore::new();
        let active = vec![TenantId(1), TenantId(2)];
        let (mut lifecycle, _flusher) = lifecycle_over(
            store.clone(),
            Box::new(StaticDirectory::new(active)),
            Box::new(AllowAll),
            "0.1.0",
        );
        lifecycle.activate(Scope::Network).unwrap();
        lifecycle.uninstall().unwrap();

        assert_eq!(store.load(TenantId(1)).unwrap(), None);
        assert_eq!(store.load(TenantId(2)).unwrap(), None);
    }

    #[test]
    fn test_denied_principal_silently_skips() {
        let store = MemoryStore::new();
        let (mut lifecycle, flusher) = lifecycle_over(
            store.clone(),
            Box::new(SingleSite),
            Box::new(DenyAll),
            "0.1.0",
        );

        lifecycle.activate(Scope::Tenant(TenantId::PRIMARY)).unwrap();
        lifecycle.deactivate(Scope::Tenant(TenantId::PRIMARY)).unwrap();
        lifecycle.uninstall().unwrap();

        assert_eq!(store.load(TenantId::PRIMARY).unwrap(), None);
        assert!(flusher.lock().unwrap().flushed().is_empty());
    }

    #[test]
    fn test_persistence_failure_surfaces_from_activate() {
        let store = MemoryStore::new();
        store.set_fail_writes(true);
        let (mut lifecycle, _flusher) = lifecycle_over(
            store,
            Box::new(SingleSite),
            Box::new(AllowAll),
            "0.1.0",
        );
        assert!(lifecycle.activate(Scope::Tenant(TenantId::PRIMARY)).is_err());
    }

    #[test]
    fn test_fan_out_stops_at_first_failure() {
        let store = MemoryStore::new();
        store.set_fail_after_writes(1);
        let (mut lifecycle, _flusher) = lifecycle_over(
            store.clone(),
            Box::new(StaticDirectory::new(vec![TenantId(1), TenantId(2), TenantId(3)])),
            Box::new(AllowAll),
            "0.1.0",
        );

        assert!(lifecycle.activate(Scope::Network).is_err());
        // The first tenant was migrated; later ones were never reached.
        assert!(store.load(TenantId(1)).unwrap().is_some());
        assert_eq!(store.load(TenantId(2)).unwrap(), None);
        assert_eq!(store.load(TenantId(3)).unwrap(), None);
    }

    #[test]
    fn test_provision_tenant_installs_single_tenant() {
        let store = MemoryStore::new();
        let (mut lifecycle, _flusher) = lifecycle_over(
            store.clone(),
            Box::new(StaticDirectory::new(vec![TenantId(1), TenantId(9)])),
            Box::new(AllowAll),
            "0.1.0",
        );
        lifecycle.provision_tenant(TenantId(9)).unwrap();
        assert!(store.load(TenantId(9)).unwrap().is_some());
        assert_eq!(store.load(TenantId(1)).unwrap(), None);
    }
}
