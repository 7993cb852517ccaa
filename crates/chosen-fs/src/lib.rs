//! File access and advisory locking for the Chosen data store
//!
//! Provides the filesystem layer the YAML store is built on: guarded path
//! and pattern handling, race-free file primitives with a uniform error
//! taxonomy, and cross-process advisory locks.

pub mod error;
pub mod handler;
pub mod info;
pub mod io;
pub mod lock;
pub mod path;

pub use error::{Error, ErrorKind, Result};
pub use handler::FileHandler;
pub use info::FileInfo;
pub use lock::{DEFAULT_LOCK_TIMEOUT, FileLock, LockGuard, LockManager};
pub use path::{validate_path_component, validate_pattern};
