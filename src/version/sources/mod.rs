//! Catalog source implementations

pub mod http;

pub use http::HttpCatalogSource;
