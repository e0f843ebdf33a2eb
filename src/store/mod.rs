// src/store/mod.rs

//! Storage collaborator for the options record
//!
//! The host platform owns options persistence; this crate only assumes a
//! per-tenant load/create/save/delete contract where each call is atomic on
//! its own. [`SqliteStore`] is the database-backed implementation used by
//! the CLI, and [`MemoryStore`] backs tests and embedders that keep state
//! in process.

mod sqlite;

pub use sqlite::{SqliteDirectory, SqliteStore, TenantRow, init, open};

use crate::error::{Error, Result};
use crate::options::OptionsRecord;
use crate::tenant::TenantId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Per-tenant persistence contract for the options record
///
/// Each call is assumed atomic and durable by the time it returns. `create`
/// fails soft: it reports `false` when a record already exists rather than
/// erroring, mirroring add-if-absent semantics in the host's options API.
pub trait OptionsStore {
    /// Read the record for a tenant, `None` when absent
    fn load(&self, tenant: TenantId) -> Result<Option<OptionsRecord>>;

    /// Write the record only if none exists; reports whether it was written
    fn create(&mut self, tenant: TenantId, record: &OptionsRecord) -> Result<bool>;

    /// Write the record unconditionally
    fn save(&mut self, tenant: TenantId, record: &OptionsRecord) -> Result<()>;

    /// Remove the record; a no-op when none exists
    fn delete(&mut self, tenant: TenantId) -> Result<()>;
}

#[derive(Default)]
struct MemoryInner {
    records: HashMap<TenantId, OptionsRecord>,
    fail_writes: bool,
    writes_before_failure: Option<u32>,
}

/// In-process store
///
/// Clones share the same underlying map, the way two handles to one
/// database share state. Write failures can be injected to exercise the
/// error paths persistence collaborators can hit.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with a storage error
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.lock().unwrap().fail_writes = fail;
    }

    /// Allow `n` more writes, then fail the rest
    pub fn set_fail_after_writes(&self, n: u32) {
        self.inner.lock().unwrap().writes_before_failure = Some(n);
    }

    fn write_guard(inner: &mut MemoryInner) -> Result<()> {
        if let Some(remaining) = inner.writes_before_failure {
            if remaining == 0 {
                inner.fail_writes = true;
            } else {
                inner.writes_before_failure = Some(remaining - 1);
            }
        }
        if inner.fail_writes {
            return Err(Error::Store {
                reason: "injected write failure".to_string(),
            });
        }
        Ok(())
    }
}

impl OptionsStore for MemoryStore {
    fn load(&self, tenant: TenantId) -> Result<Option<OptionsRecord>> {
        Ok(self.inner.lock().unwrap().records.get(&tenant).cloned())
    }

    fn create(&mut self, tenant: TenantId, record: &OptionsRecord) -> Result<bool> {
        let mut inner = self.inner.lock().unwrap();
        Self::write_guard(&mut inner)?;
        if inner.records.contains_key(&tenant) {
            return Ok(false);
        }
        inner.records.insert(tenant, record.clone());
        Ok(true)
    }

    fn save(&mut self, tenant: TenantId, record: &OptionsRecord) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        Self::write_guard(&mut inner)?;
        inner.records.insert(tenant, record.clone());
        Ok(())
    }

    fn delete(&mut self, tenant: TenantId) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        Self::write_guard(&mut inner)?;
        inner.records.remove(&tenant);
        Ok(())
    }
}
