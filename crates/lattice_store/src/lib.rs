//! # Lattice Store
//!
//! Transactional in-memory row store for LatticeDB.
//!
//! This crate provides:
//! - Row storage per registered type, with scalar, reference and list
//!   columns
//! - A single write-transaction discipline: snapshot at begin, restore on
//!   cancel
//! - Primary-key and unique-field indexes with constraint enforcement
//! - Typed read accessors for materialized rows

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod store;
mod table;
mod types;

pub use error::{StoreError, StoreResult};
pub use store::Store;
pub use types::{ListHandle, RowHandle, RowId, TableId};
