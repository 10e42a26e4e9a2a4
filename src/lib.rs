//! # poset_registry
//!
//! A registry of independent partially ordered sets, each addressed by an
//! opaque handle.
//!
//! Elements are named, and the "less than or equal" relation is kept as its
//! full transitive closure: declaring `a <= b` and `b <= c` makes `a <= c`
//! visible at once. Cycles and redundant pairs are rejected, and a pair can
//! only be deleted while it does not still follow through some element in
//! between.
mod config;
mod error;
pub mod ffi;
pub mod hasse;
mod id;
mod poset;
mod registry;

pub use config::RegistryConfig;
pub use error::PosetError;
pub use id::{ElementId, IdAllocator, IdStrategy, PosetHandle};
pub use poset::Poset;
pub use registry::Registry;
