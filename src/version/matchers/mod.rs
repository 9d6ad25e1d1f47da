//! Kernel matcher implementations

pub mod disttool;

pub use disttool::DistToolMatcher;
