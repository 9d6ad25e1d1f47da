//! Shared test utilities

#![allow(dead_code, unused_imports)]

pub mod matcher;
pub mod source;

pub use matcher::CountingMatcher;
pub use source::{StaticCatalogSource, catalog_json, test_config};
