//! Configuration schema for road-network backends and rules documents.

pub mod schema;

pub use schema::*;
