//! # Storage Module
//!
//! Disk-backed persistence for the progression engine.

mod redb_store;

pub use redb_store::RedbStore;
