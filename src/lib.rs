// src/lib.rs

//! Finds semver contract violations in the release history of packages:
//! public methods removed without a major bump, and methods added without a
//! minor bump.

pub mod aggregate;
pub mod backfill;
pub mod cli;
pub mod coords;
pub mod detector;
pub mod error;
pub mod lineage;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod store;
pub mod version;

pub use error::{LineageError, Result};
