// src/plugin.rs

//! Bootstrap wiring
//!
//! The plugin owns the registry, knows which service kinds exist, and
//! builds the two bootstrap groups when the host loads the add-on: the
//! global group on every request, the admin group only on admin requests.
//! Observers on the hook bus are notified just before and just after the
//! groups are built, so other add-ons can order themselves around us.
//!
//! When the host's recipe platform is missing, none of the services are
//! built. The compatibility path queues an admin notice explaining why
//! and clears a stale `rewrites_flushed` flag, so the flush re-runs once
//! the platform comes back.

use crate::admin::{RewriteMonitor, SettingsGuard};
use crate::error::Result;
use crate::filters::{ContentFilters, TitleFilter};
use crate::registry::{Registry, Service, ServiceContext, ServiceGroup};
use tracing::{debug, warn};

/// The add-on version, straight from the manifest
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The service kinds the plugin registers
pub mod kinds {
    pub const CONTENT_FILTERS: &str = "content-filters";
    pub const TITLE_FILTER: &str = "title-filter";
    pub const SETTINGS_GUARD: &str = "settings-guard";
    pub const REWRITE_MONITOR: &str = "rewrite-monitor";
}

/// What kind of request the host is serving
#[derive(Debug, Clone, Copy)]
pub struct RequestContext {
    /// Whether the host's recipe platform is installed and active
    pub host_available: bool,
    /// Whether this is an admin request
    pub admin: bool,
}

/// The add-on's bootstrap entry point
pub struct Plugin {
    registry: Registry,
}

impl Plugin {
    /// Wire the registry with every built-in service factory
    pub fn new(ctx: ServiceContext) -> Self {
        let mut registry = Registry::new(ctx);

        registry.register(
            kinds::CONTENT_FILTERS,
            Box::new(|ctx| Ok(Box::new(ContentFilters::from_context(ctx)) as Box<dyn Service>)),
        );
        registry.register(
            kinds::TITLE_FILTER,
            Box::new(|ctx| Ok(Box::new(TitleFilter::from_context(ctx)) as Box<dyn Service>)),
        );
        registry.register(
            kinds::SETTINGS_GUARD,
            Box::new(|ctx| Ok(Box::new(SettingsGuard::from_context(ctx)) as Box<dyn Service>)),
        );
        registry.register(
            kinds::REWRITE_MONITOR,
            Box::new(|ctx| Ok(Box::new(RewriteMonitor::from_context(ctx)) as Box<dyn Service>)),
        );

        Self { registry }
    }

    /// Services built on every request
    pub fn global_group() -> ServiceGroup {
        ServiceGroup::new("global", vec![kinds::CONTENT_FILTERS, kinds::TITLE_FILTER])
    }

    /// Services built only on admin requests
    pub fn admin_group() -> ServiceGroup {
        ServiceGroup::new("admin", vec![kinds::SETTINGS_GUARD, kinds::REWRITE_MONITOR])
    }

    /// The registry, for resolving services directly
    pub fn registry(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Build and run the plugin's services for one request
    pub fn init(&mut self, request: RequestContext) -> Result<()> {
        if !request.host_available {
            return self.compat_init();
        }

        let bus = self.registry.context().bus.clone();
        bus.lock().unwrap().emit_before_init(VERSION);

        Self::global_group().build_required(&mut self.registry)?;
        if request.admin {
            Self::admin_group().build_required(&mut self.registry)?;
        }

        bus.lock().unwrap().emit_after_init(VERSION);
        debug!("plugin {} initialized (admin: {})", VERSION, request.admin);
        Ok(())
    }

    /// The path taken when the host's recipe platform is absent
    fn compat_init(&mut self) -> Result<()> {
        warn!("recipe platform unavailable; add-on services not built");

        let ctx = self.registry.context().clone();

        // A stale "already flushed" flag would suppress the flush after the
        // platform returns; clear it now.
        let mut options = ctx.options.lock().unwrap();
        if let Some(record) = options.get_all(ctx.tenant)? {
            if record.rewrites_flushed {
                options.set_rewrites_flushed(ctx.tenant, false)?;
            }
        }

        ctx.bus.lock().unwrap().push_admin_notice(
            "Recipe Private requires the recipe platform to be installed and active.",
        );
        Ok(())
    }
}
