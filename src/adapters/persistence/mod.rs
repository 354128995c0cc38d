//! Persistence adapters. Implement StoragePort.

pub mod store_json;

pub use store_json::JsonStore;
