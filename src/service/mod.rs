//! Service layer wiring the version core to incoming requests
//!
//! This module drives the shared state: a background task keeps the version
//! maps current, and request handlers answer from the cache or the matcher.
//!
//! # Modules
//!
//! - [`os_release`]: Extracts the distribution code from an os-release payload
//! - [`refresh`]: Background refresh of per-distribution version maps
//! - [`request`]: Fingerprint, cache lookup and matcher fallback per request
//! - [`server`]: Service startup, logging and shutdown

pub mod os_release;
pub mod refresh;
pub mod request;
pub mod server;
