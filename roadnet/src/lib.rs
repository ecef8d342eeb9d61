//! `roadnet` - road-network rule-state tooling
//!
//! Loads road networks from one of several backends, models their rule
//! books, phase rings and intersections, and advances the phase rings over
//! time with a [`phase::DynamicEnvironmentHandler`].

pub mod cli;
pub mod config;
pub mod error;
pub mod network;
pub mod observability;
pub mod phase;
