// src/filters.rs

//! Content restriction filters
//!
//! These are the filters that actually make recipes embed-only. They run
//! late in the host's filter chains so they win over anything the host or
//! another add-on set earlier: the recipe content type and its category
//! taxonomy lose their public pages, archives, and rewrite URLs while the
//! editing UI stays available. Title rendering falls back to the embedding
//! entry's own title, since the recipe page itself is no longer reachable.

use crate::error::Result;
use crate::host::HookBus;
use crate::registry::{Service, ServiceContext};
use std::sync::{Arc, Mutex};

/// Registration arguments for the recipe content type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentTypeArgs {
    /// Whether the content type gets public pages
    pub public: bool,
    /// Whether the content type gets an archive page
    pub has_archive: bool,
    /// Rewrite slug for individual entries, `None` for no rewrite URLs
    pub rewrite: Option<String>,
    /// Whether the editing UI is shown
    pub show_ui: bool,
}

impl Default for ContentTypeArgs {
    /// The host's defaults: publicly browsable recipes
    fn default() -> Self {
        Self {
            public: true,
            has_archive: true,
            rewrite: Some("recipes".to_string()),
            show_ui: true,
        }
    }
}

/// Registration arguments for the recipe category taxonomy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyArgs {
    /// Whether taxonomy term pages are publicly browsable
    pub public: bool,
    /// Rewrite slug for term pages, `None` for no rewrite URLs
    pub rewrite: Option<String>,
    /// Whether the taxonomy UI is shown
    pub show_ui: bool,
}

impl Default for TaxonomyArgs {
    fn default() -> Self {
        Self {
            public: true,
            rewrite: Some("recipe-category".to_string()),
            show_ui: true,
        }
    }
}

/// Force the recipe content type private while keeping its admin UI
pub fn restrict_content_type(mut args: ContentTypeArgs) -> ContentTypeArgs {
    args.public = false;
    args.has_archive = false;
    args.rewrite = None;
    args.show_ui = true;
    args
}

/// Force the category taxonomy private while keeping its admin UI
pub fn restrict_taxonomy(mut args: TaxonomyArgs) -> TaxonomyArgs {
    args.public = false;
    args.rewrite = None;
    args.show_ui = true;
    args
}

/// Service registering the content-type and taxonomy restriction filters
pub struct ContentFilters {
    bus: Arc<Mutex<HookBus>>,
}

impl ContentFilters {
    pub fn new(bus: Arc<Mutex<HookBus>>) -> Self {
        Self { bus }
    }

    pub fn from_context(ctx: &ServiceContext) -> Self {
        Self::new(ctx.bus.clone())
    }
}

impl Service for ContentFilters {
    fn run(&mut self) -> Result<()> {
        let mut bus = self.bus.lock().unwrap();
        bus.on_content_type_args(Box::new(restrict_content_type));
        bus.on_taxonomy_args(Box::new(restrict_taxonomy));
        Ok(())
    }
}

/// Service registering the title-rendering filter
///
/// With recipe pages hidden, a recipe's visible title is the title of the
/// entry it is embedded in.
pub struct TitleFilter {
    bus: Arc<Mutex<HookBus>>,
}

impl TitleFilter {
    pub fn new(bus: Arc<Mutex<HookBus>>) -> Self {
        Self { bus }
    }

    pub fn from_context(ctx: &ServiceContext) -> Self {
        Self::new(ctx.bus.clone())
    }
}

impl Service for TitleFilter {
    fn run(&mut self) -> Result<()> {
        let mut bus = self.bus.lock().unwrap();
        bus.on_title(Box::new(|_title, entry_title| entry_title.to_string()));
        Ok(())
    }
}
