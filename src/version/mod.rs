//! Package version resolution and response caching
//!
//! This module provides the core functionality for turning a published
//! package catalog into the set of current kernel module packages, and for
//! caching per-request answers until the next catalog refresh.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Source    │────▶│  Resolver   │────▶│    Cache    │
//! │  (fetch)    │     │ (filter)    │     │  (shared)   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │                                       ▲
//!        ▼                                       │
//! ┌─────────────┐                         ┌─────────────┐
//! │   Sources   │                         │   Matcher   │
//! │   (http)    │                         │ (disttool)  │
//! └─────────────┘                         └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`cache`]: Mutex-guarded version maps and response cache
//! - [`catalog`]: Catalog document model
//! - [`error`]: Error types for cache, catalog and matcher operations
//! - [`fingerprint`]: Request fingerprints used as cache keys
//! - [`matcher`]: Kernel matcher trait
//! - [`matchers`]: Concrete matcher implementations
//! - [`resolver`]: Filename to version map reduction
//! - [`source`]: Catalog source trait
//! - [`sources`]: Concrete catalog sources
//! - [`types`]: Common types like `PackageVersion` and `VersionMap`

pub mod cache;
pub mod catalog;
pub mod error;
pub mod fingerprint;
pub mod matcher;
pub mod matchers;
pub mod resolver;
pub mod source;
pub mod sources;
pub mod types;
