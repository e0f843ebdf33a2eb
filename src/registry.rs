// src/registry.rs

//! Service registry and service groups
//!
//! The registry is an explicit dependency-injection container: it is
//! constructed once at bootstrap, told which factories exist, and passed by
//! reference to whoever resolves services. There is no ambient static
//! cache. Kinds map to factories through an explicit registration table,
//! so an unknown kind fails fast with a configuration error instead of
//! falling through a naming convention at runtime.
//!
//! Instances are built lazily, at most once per (kind, name) key, and are
//! owned exclusively by the registry for the life of the process. The
//! container is a plain owned value; the single-threaded request model
//! means Rust's borrow rules stand in for a lock.

use crate::error::{Error, Result};
use crate::host::{HookBus, RewriteFlusher, SettingsRegistry};
use crate::options::OptionsGateway;
use crate::tenant::TenantId;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// The default instance name for a service kind
pub const CANONICAL: &str = "canonical";

/// One registered singleton: kind plus instance name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceKey {
    pub kind: String,
    pub name: String,
}

/// A plugin service: built once, then run
pub trait Service {
    fn run(&mut self) -> Result<()>;
}

impl std::fmt::Debug for dyn Service + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn Service")
    }
}

/// Shared collaborator handles passed to every service factory
#[derive(Clone)]
pub struct ServiceContext {
    /// Options persistence for the tenant this request is scoped to
    pub options: Arc<Mutex<OptionsGateway>>,

    /// The hook surface the host drives
    pub bus: Arc<Mutex<HookBus>>,

    /// The host's settings registry
    pub settings: Arc<Mutex<dyn SettingsRegistry>>,

    /// The host's rewrite-rules flush
    pub flusher: Arc<Mutex<dyn RewriteFlusher>>,

    /// The tenant this request operates on
    pub tenant: TenantId,
}

/// Constructor for one service kind
pub type ServiceFactory = Box<dyn Fn(&ServiceContext) -> Result<Box<dyn Service>>>;

/// Explicit DI container mapping (kind, name) to singleton instances
pub struct Registry {
    ctx: ServiceContext,
    factories: HashMap<&'static str, ServiceFactory>,
    instances: HashMap<ServiceKey, Box<dyn Service>>,
}

impl Registry {
    /// Create an empty registry over the given collaborators
    pub fn new(ctx: ServiceContext) -> Self {
        Self {
            ctx,
            factories: HashMap::new(),
            instances: HashMap::new(),
        }
    }

    /// Add a factory for a service kind, replacing any previous one
    pub fn register(&mut self, kind: &'static str, factory: ServiceFactory) {
        self.factories.insert(kind, factory);
    }

    /// The collaborator handles this registry wires into services
    pub fn context(&self) -> &ServiceContext {
        &self.ctx
    }

    /// Resolve the canonical instance of a kind, building it if absent
    pub fn get(&mut self, kind: &str) -> Result<&mut dyn Service> {
        self.get_named(kind, CANONICAL)
    }

    /// Resolve a named instance of a kind, building it if absent
    ///
    /// Fails with a configuration error when no factory is registered for
    /// the kind, regardless of the instance name.
    pub fn get_named(&mut self, kind: &str, name: &str) -> Result<&mut dyn Service> {
        let factory = self
            .factories
            .get(kind)
            .ok_or_else(|| Error::UnknownServiceKind {
                kind: kind.to_string(),
            })?;

        let key = ServiceKey {
            kind: kind.to_string(),
            name: name.to_string(),
        };

        match self.instances.entry(key) {
            Entry::Occupied(entry) => Ok(entry.into_mut().as_mut()),
            Entry::Vacant(entry) => {
                debug!("building service '{}' ('{}')", kind, name);
                let service = factory(&self.ctx)?;
                Ok(entry.insert(service).as_mut())
            }
        }
    }
}

/// A fixed, ordered list of services required for one bootstrap phase
pub struct ServiceGroup {
    name: &'static str,
    required: Vec<&'static str>,
}

impl ServiceGroup {
    pub fn new(name: &'static str, required: Vec<&'static str>) -> Self {
        Self { name, required }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Resolve and run every required service, in declaration order
    ///
    /// An empty required list is a wiring mistake and fails with a
    /// configuration error.
    pub fn build_required(&self, registry: &mut Registry) -> Result<()> {
        if self.required.is_empty() {
            return Err(Error::EmptyServiceGroup {
                group: self.name.to_string(),
            });
        }

        for kind in &self.required {
            debug!("group '{}': running service '{}'", self.name, kind);
            registry.get(kind)?.run()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{CountingFlusher, MemorySettingsRegistry};
    use crate::store::MemoryStore;

    fn context() -> ServiceContext {
        ServiceContext {
            options: Arc::new(Mutex::new(OptionsGateway::new(Box::new(
                MemoryStore::new(),
            )))),
            bus: Arc::new(Mutex::new(HookBus::new())),
            settings: Arc::new(Mutex::new(MemorySettingsRegistry::new())),
            flusher: Arc::new(Mutex::new(CountingFlusher::new())),
            tenant: TenantId::PRIMARY,
        }
    }

    struct Probe {
        label: &'static str,
        runs: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Service for Probe {
        fn run(&mut self) -> Result<()> {
            self.runs.lock().unwrap().push(self.label);
            Ok(())
        }
    }

    fn register_probe(
        registry: &mut Registry,
        kind: &'static str,
        runs: Arc<Mutex<Vec<&'static str>>>,
        built: Arc<Mutex<u32>>,
    ) {
        registry.register(
            kind,
            Box::new(move |_ctx| {
                *built.lock().unwrap() += 1;
                Ok(Box::new(Probe {
                    label: kind,
                    runs: runs.clone(),
                }))
            }),
        );
    }

    #[test]
    fn test_get_returns_identical_instance() {
        let mut registry = Registry::new(context());
        let runs = Arc::new(Mutex::new(Vec::new()));
        let built = Arc::new(Mutex::new(0));
        register_probe(&mut registry, "probe", runs, built.clone());

        let first = registry.get("probe").unwrap() as *mut dyn Service as *mut ();
        let second = registry.get("probe").unwrap() as *mut dyn Service as *mut ();
        assert_eq!(first, second);
        assert_eq!(*built.lock().unwrap(), 1);
    }

    #[test]
    fn test_named_instances_are_distinct_singletons() {
        let mut registry = Registry::new(context());
        let runs = Arc::new(Mutex::new(Vec::new()));
        let built = Arc::new(Mutex::new(0));
        register_probe(&mut registry, "probe", runs, built.clone());

        registry.get_named("probe", "canonical").unwrap();
        registry.get_named("probe", "secondary").unwrap();
        registry.get_named("probe", "secondary").unwrap();
        assert_eq!(*built.lock().unwrap(), 2);
    }

    #[test]
    fn test_unknown_kind_fails_regardless_of_name() {
        let mut registry = Registry::new(context());

        for name in ["canonical", "secondary", ""] {
            let err = registry.get_named("missing", name).unwrap_err();
            assert!(matches!(err, Error::UnknownServiceKind { ref kind } if kind == "missing"));
            assert!(err.is_configuration());
        }
    }

    #[test]
    fn test_group_runs_services_in_declaration_order() {
        let mut registry = Registry::new(context());
        let runs = Arc::new(Mutex::new(Vec::new()));
        let built = Arc::new(Mutex::new(0));
        register_probe(&mut registry, "second", runs.clone(), built.clone());
        register_probe(&mut registry, "first", runs.clone(), built);

        let group = ServiceGroup::new("test", vec!["first", "second"]);
        group.build_required(&mut registry).unwrap();
        assert_eq!(*runs.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_empty_group_is_a_configuration_error() {
        let mut registry = Registry::new(context());
        let group = ServiceGroup::new("hollow", Vec::new());
        let err = group.build_required(&mut registry).unwrap_err();
        assert!(matches!(err, Error::EmptyServiceGroup { ref group } if group == "hollow"));
    }

    #[test]
    fn test_group_surfaces_unknown_kind() {
        let mut registry = Registry::new(context());
        let group = ServiceGroup::new("test", vec!["missing"]);
        let err = group.build_required(&mut registry).unwrap_err();
        assert!(matches!(err, Error::UnknownServiceKind { .. }));
    }
}
