//! Theme support for highlighted code blocks.
//!
//! This crate provides:
//! - Highlight slot definitions (scope names → highlight.js classes)
//! - Discovery of the theme stylesheets shipped in `assets/build/themes`
//! - Resolution of which stylesheet to link in which page context

pub mod assets;
pub mod catalog;
pub mod slots;

pub use assets::{AssetContext, BLOCK_NAME, StylesheetLink, theme_stylesheet};
pub use catalog::{
    CatalogError, THEMES_SUBDIR, ThemeCatalog, ThemeEntry, ThemeStylesheet, slug_for_file,
};
pub use slots::{ThemeSlot, capture_to_slot, class_for_capture};
