//! Shared test utilities for the Chosen workspace.
//!
//! A dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`data_dir`]: [`TestDataDir`], a temporary data root with helpers

pub mod data_dir;

pub use data_dir::{TestDataDir, is_root};
