// src/admin/settings.rs

//! Permalink settings removal
//!
//! With rewrite URLs disabled, the host's permalink settings (archive
//! base, recipe base, category base) would only confuse: changing them
//! does nothing. This service removes the whole permalinks section and
//! unregisters the individual settings from the host's settings registry.

use crate::error::Result;
use crate::host::SettingsRegistry;
use crate::registry::{Service, ServiceContext};
use std::sync::{Arc, Mutex};

/// The host settings group the permalink settings live in
pub const SETTINGS_GROUP: &str = "recipes_advanced";

/// The permalinks section within that group
pub const PERMALINKS_SECTION: &str = "recipe_permalinks";

/// The individual permalink settings to unregister
pub const PERMALINK_SETTINGS: [&str; 3] =
    ["recipe_archive_base", "recipe_base", "recipe_category_base"];

/// Service removing the permalink settings surface
pub struct SettingsGuard {
    settings: Arc<Mutex<dyn SettingsRegistry>>,
}

impl SettingsGuard {
    pub fn new(settings: Arc<Mutex<dyn SettingsRegistry>>) -> Self {
        Self { settings }
    }

    pub fn from_context(ctx: &ServiceContext) -> Self {
        Self::new(ctx.settings.clone())
    }
}

impl Service for SettingsGuard {
    fn run(&mut self) -> Result<()> {
        let mut settings = self.settings.lock().unwrap();
        settings.remove_section(SETTINGS_GROUP, PERMALINKS_SECTION);
        for name in PERMALINK_SETTINGS {
            settings.unregister_setting(SETTINGS_GROUP, name);
        }
        Ok(())
    }
}
