//! Shared types and the rules configuration schema for `roadnet`.
//!
//! This crate provides the configuration types and error types shared
//! by the `roadnet` command-line tools: backend selection, backend build
//! properties and the YAML rules document (rule book, phase rings and
//! intersections).

pub mod config;
pub mod error;
