//! # Lattice Graph
//!
//! Bulk object-graph insertion and upsert engine for LatticeDB.
//!
//! Given an arbitrary, possibly cyclic, graph of application objects, the
//! engine materializes it as rows in a [`lattice_store::Store`] exactly
//! once per object identity. Primary-key-bearing types are reconciled by
//! key value in upsert mode; non-keyed types are never reconciled.
//!
//! All four operations run inside a write transaction the caller already
//! holds; the engine never begins, commits or cancels one itself.
//!
//! ```rust,ignore
//! store.begin_write()?;
//! lattice_graph::insert(&store, &object)?;
//! store.commit()?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod adapter;
mod error;
mod identity;
mod object;
mod resolver;
mod walker;

pub use error::{GraphError, GraphResult};
pub use object::{FieldValue, Object, ObjectTag};
pub use walker::{insert, insert_all, insert_or_update, insert_or_update_all};
