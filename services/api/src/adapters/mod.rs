//! services/api/src/adapters/mod.rs
//!
//! Concrete implementations of the core's store port.

pub mod db;

pub use db::PgStoreAdapter;
