//! # Lattice Model
//!
//! Value and schema layer for LatticeDB.
//!
//! This crate provides:
//! - Dynamic scalar values ([`Value`]) and their kind tags ([`ScalarKind`])
//! - The hashable primary-key value subset ([`KeyValue`])
//! - Type descriptors and field declarations ([`TypeDescriptor`],
//!   [`FieldDescriptor`])
//! - The schema catalog mapping type names to descriptors
//!   ([`SchemaCatalog`])

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod schema;
mod value;

pub use error::{ModelError, ModelResult};
pub use schema::{FieldDescriptor, FieldKind, SchemaCatalog, TypeDescriptor};
pub use value::{KeyValue, ScalarKind, Value};
