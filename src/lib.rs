// src/lib.rs

//! Recipe Private
//!
//! Core of an add-on that makes a host publishing platform's recipes
//! embed-only: recipes lose their public pages, archive, rewrite URLs, and
//! public taxonomy pages while staying embeddable inside posts and pages.
//!
//! # Architecture
//!
//! - Explicit wiring: services resolve through a registry built once at
//!   bootstrap, never through ambient static state
//! - Explicit tenancy: every per-tenant operation takes a tenant id; there
//!   is no switched-and-restored "current tenant"
//! - One record: all persisted state is a small per-tenant options record,
//!   rewritten whole on every lifecycle transition
//! - Host behind traits: options storage, tenant directory, capability
//!   checks, settings registry, and the rewrite flush are collaborators the
//!   embedder provides

pub mod admin;
mod error;
pub mod filters;
pub mod host;
pub mod lifecycle;
pub mod options;
pub mod plugin;
pub mod registry;
pub mod store;
pub mod tenant;

pub use error::{Error, Result};
pub use filters::{ContentTypeArgs, TaxonomyArgs};
pub use host::{AllowAll, Authorizer, HookBus, RewriteFlusher, SettingsRegistry};
pub use lifecycle::{InstallState, Lifecycle, Scope};
pub use options::{OptionsGateway, OptionsRecord};
pub use plugin::{Plugin, RequestContext, VERSION};
pub use registry::{Registry, Service, ServiceContext, ServiceGroup};
pub use store::{MemoryStore, OptionsStore, SqliteDirectory, SqliteStore};
pub use tenant::{SingleSite, TenantDirectory, TenantId};
