// src/host.rs

//! Host platform touchpoints
//!
//! The add-on never talks to the host publishing platform directly.
//! Everything it needs from the host sits behind a small trait or the
//! [`HookBus`]: the capability check gating lifecycle transitions, the
//! rewrite-rules flush, the settings registry, and the filter/notification
//! hooks the host drives while rendering and registering content types.

use crate::error::Result;
use crate::filters::{ContentTypeArgs, TaxonomyArgs};
use crate::tenant::TenantId;
use tracing::info;

/// Capability check for the acting principal
///
/// A principal without the manage-add-ons capability causes lifecycle
/// transitions to silently no-op rather than error. That convention comes
/// from the host platform and is preserved here.
pub trait Authorizer {
    fn can_manage_addons(&self) -> bool;
}

/// Grants everything; the CLI and embedders that gate access upstream
#[derive(Debug, Default)]
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn can_manage_addons(&self) -> bool {
        true
    }
}

/// Denies everything
#[derive(Debug, Default)]
pub struct DenyAll;

impl Authorizer for DenyAll {
    fn can_manage_addons(&self) -> bool {
        false
    }
}

/// The host's rewrite-rules flush: regenerates the URL-routing table
pub trait RewriteFlusher {
    fn flush(&mut self, tenant: TenantId) -> Result<()>;
}

/// Flusher that only records the request in the log
///
/// Used where the process has no live routing table, such as the CLI; the
/// host flushes for real once the `rewrites_flushed` flag is seen unset.
#[derive(Debug, Default)]
pub struct LogFlusher;

impl RewriteFlusher for LogFlusher {
    fn flush(&mut self, tenant: TenantId) -> Result<()> {
        info!("rewrite flush requested for tenant {}", tenant);
        Ok(())
    }
}

/// Flusher that counts invocations per tenant
#[derive(Debug, Default)]
pub struct CountingFlusher {
    flushes: Vec<TenantId>,
}

impl CountingFlusher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tenants flushed so far, in call order
    pub fn flushed(&self) -> &[TenantId] {
        &self.flushes
    }
}

impl RewriteFlusher for CountingFlusher {
    fn flush(&mut self, tenant: TenantId) -> Result<()> {
        self.flushes.push(tenant);
        Ok(())
    }
}

/// The host's settings registry
///
/// Only the removal surface is modeled; the add-on unregisters the
/// permalink settings that stop making sense once recipe rewrites are off.
pub trait SettingsRegistry {
    /// Remove a settings section and its rendered fields from a group
    fn remove_section(&mut self, group: &str, section: &str);

    /// Unregister a single named setting from a group
    fn unregister_setting(&mut self, group: &str, name: &str);
}

/// In-process settings registry tracking what remains registered
#[derive(Debug, Default)]
pub struct MemorySettingsRegistry {
    sections: Vec<(String, String)>,
    settings: Vec<(String, String)>,
}

impl MemorySettingsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_section(&mut self, group: &str, section: &str) {
        self.sections.push((group.to_string(), section.to_string()));
    }

    pub fn add_setting(&mut self, group: &str, name: &str) {
        self.settings.push((group.to_string(), name.to_string()));
    }

    pub fn has_section(&self, group: &str, section: &str) -> bool {
        self.sections
            .iter()
            .any(|(g, s)| g == group && s == section)
    }

    pub fn has_setting(&self, group: &str, name: &str) -> bool {
        self.settings.iter().any(|(g, n)| g == group && n == name)
    }
}

impl SettingsRegistry for MemorySettingsRegistry {
    fn remove_section(&mut self, group: &str, section: &str) {
        self.sections.retain(|(g, s)| !(g == group && s == section));
    }

    fn unregister_setting(&mut self, group: &str, name: &str) {
        self.settings.retain(|(g, n)| !(g == group && n == name));
    }
}

type ContentTypeFilter = Box<dyn Fn(ContentTypeArgs) -> ContentTypeArgs>;
type TaxonomyFilter = Box<dyn Fn(TaxonomyArgs) -> TaxonomyArgs>;
type TitleFilter = Box<dyn Fn(String, &str) -> String>;
type InitObserver = Box<dyn Fn(&str)>;

/// The ambient publish/subscribe surface between the add-on and the host
///
/// Services register filters and observers here during bootstrap; the host
/// applies the filter chains when it registers the recipe content type,
/// registers the category taxonomy, or renders a recipe title, and drains
/// queued admin notices on its next admin render.
#[derive(Default)]
pub struct HookBus {
    content_type_filters: Vec<ContentTypeFilter>,
    taxonomy_filters: Vec<TaxonomyFilter>,
    title_filters: Vec<TitleFilter>,
    before_init: Vec<InitObserver>,
    after_init: Vec<InitObserver>,
    admin_notices: Vec<String>,
}

impl HookBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to the moment just before the add-on's services are built
    pub fn on_before_init(&mut self, observer: InitObserver) {
        self.before_init.push(observer);
    }

    /// Subscribe to the moment just after the add-on's services are built
    pub fn on_after_init(&mut self, observer: InitObserver) {
        self.after_init.push(observer);
    }

    /// Register a filter over recipe content-type registration arguments
    pub fn on_content_type_args(&mut self, filter: ContentTypeFilter) {
        self.content_type_filters.push(filter);
    }

    /// Register a filter over category taxonomy registration arguments
    pub fn on_taxonomy_args(&mut self, filter: TaxonomyFilter) {
        self.taxonomy_filters.push(filter);
    }

    /// Register a filter over recipe title rendering
    pub fn on_title(&mut self, filter: TitleFilter) {
        self.title_filters.push(filter);
    }

    /// Queue a notice for the host's next admin render
    pub fn push_admin_notice(&mut self, notice: impl Into<String>) {
        self.admin_notices.push(notice.into());
    }

    /// Drain all queued admin notices
    pub fn take_admin_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.admin_notices)
    }

    pub fn emit_before_init(&self, version: &str) {
        for observer in &self.before_init {
            observer(version);
        }
    }

    pub fn emit_after_init(&self, version: &str) {
        for observer in &self.after_init {
            observer(version);
        }
    }

    /// Run the content-type args through every registered filter, in
    /// registration order
    pub fn apply_content_type_args(&self, args: ContentTypeArgs) -> ContentTypeArgs {
        self.content_type_filters
            .iter()
            .fold(args, |args, filter| filter(args))
    }

    /// Run the taxonomy args through every registered filter
    pub fn apply_taxonomy_args(&self, args: TaxonomyArgs) -> TaxonomyArgs {
        self.taxonomy_filters
            .iter()
            .fold(args, |args, filter| filter(args))
    }

    /// Run a recipe title through every registered filter
    ///
    /// `entry_title` is the title of the entry the recipe is embedded in.
    pub fn render_title(&self, title: String, entry_title: &str) -> String {
        self.title_filters
            .iter()
            .fold(title, |title, filter| filter(title, entry_title))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_chains_apply_in_registration_order() {
        let mut bus = HookBus::new();
        bus.on_title(Box::new(|title, _| format!("{title}-a")));
        bus.on_title(Box::new(|title, _| format!("{title}-b")));
        assert_eq!(bus.render_title("t".to_string(), "entry"), "t-a-b");
    }

    #[test]
    fn test_admin_notices_drain_once() {
        let mut bus = HookBus::new();
        bus.push_admin_notice("first");
        bus.push_admin_notice("second");
        assert_eq!(bus.take_admin_notices(), vec!["first", "second"]);
        assert!(bus.take_admin_notices().is_empty());
    }

    #[test]
    fn test_memory_settings_registry_removal() {
        let mut registry = MemorySettingsRegistry::new();
        registry.add_section("advanced", "permalinks");
        registry.add_setting("advanced", "recipe_base");

        registry.remove_section("advanced", "permalinks");
        registry.unregister_setting("advanced", "recipe_base");

        assert!(!registry.has_section("advanced", "permalinks"));
        assert!(!registry.has_setting("advanced", "recipe_base"));
    }

    #[test]
    fn test_counting_flusher_records_order() {
        let mut flusher = CountingFlusher::new();
        flusher.flush(TenantId(2)).unwrap();
        flusher.flush(TenantId(1)).unwrap();
        assert_eq!(flusher.flushed(), &[TenantId(2), TenantId(1)]);
    }
}
