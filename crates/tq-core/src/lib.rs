//! # tq-core
//!
//! Core types shared across all twentyq crates:
//! - Entity structs (candidates) with their open attribute map
//! - Game records and the ordered question trace
//! - Attribute-name allow-list and value normalization
//! - Document-store snapshot envelope and its version rules
//! - Cross-cutting error types
//! - CLI response types

pub mod attributes;
pub mod entities;
pub mod errors;
pub mod responses;
pub mod snapshot;
