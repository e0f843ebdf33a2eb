// src/admin/mod.rs

//! Admin-context services
//!
//! These services only run when the request is an admin request: pruning
//! the host's permalink settings that stop applying once rewrites are off,
//! and completing the pending rewrite flush recorded by activation.

mod rewrites;
mod settings;

pub use rewrites::RewriteMonitor;
pub use settings::{
    PERMALINK_SETTINGS, PERMALINKS_SECTION, SETTINGS_GROUP, SettingsGuard,
};
