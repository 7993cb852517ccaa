//! Typed YAML records and file-per-entity repositories
//!
//! Builds on `chosen-fs`: [`YamlStore`] turns records into YAML documents and
//! back with schema validation, and [`YamlRepository`] keeps one document per
//! entity id.

pub mod codec;
pub mod error;
pub mod record;
pub mod repository;
pub mod store;

pub use error::{Error, ErrorKind, Result};
pub use record::{Entity, FieldViolation, Record, ValidationContext, ViolationKind};
pub use repository::{DEFAULT_LIST_LIMIT, Filters, Repository, YamlRepository};
pub use store::YamlStore;
