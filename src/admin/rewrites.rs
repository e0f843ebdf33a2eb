// src/admin/rewrites.rs

//! Deferred rewrite flush
//!
//! Activation cannot flush the routing table itself: the restriction
//! filters are not registered yet at that point, so a flush would bake the
//! public recipe routes right back in. Activation instead records
//! `rewrites_flushed = false`, and this service completes the flush on the
//! next admin request, after the filters are in place.

use crate::error::Result;
use crate::host::RewriteFlusher;
use crate::options::OptionsGateway;
use crate::registry::{Service, ServiceContext};
use crate::tenant::TenantId;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Service that flushes rewrites once per (re)activation
pub struct RewriteMonitor {
    options: Arc<Mutex<OptionsGateway>>,
    flusher: Arc<Mutex<dyn RewriteFlusher>>,
    tenant: TenantId,
}

impl RewriteMonitor {
    pub fn new(
        options: Arc<Mutex<OptionsGateway>>,
        flusher: Arc<Mutex<dyn RewriteFlusher>>,
        tenant: TenantId,
    ) -> Self {
        Self {
            options,
            flusher,
            tenant,
        }
    }

    pub fn from_context(ctx: &ServiceContext) -> Self {
        Self::new(ctx.options.clone(), ctx.flusher.clone(), ctx.tenant)
    }
}

impl Service for RewriteMonitor {
    fn run(&mut self) -> Result<()> {
        let mut options = self.options.lock().unwrap();

        match options.get_all(self.tenant)? {
            None => {
                debug!("tenant {} has no options record; nothing to flush", self.tenant);
                Ok(())
            }
            Some(record) if record.rewrites_flushed => Ok(()),
            Some(_) => {
                self.flusher.lock().unwrap().flush(self.tenant)?;
                options.set_rewrites_flushed(self.tenant, true)?;
                Ok(())
            }
        }
    }
}
