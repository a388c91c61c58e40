//! Document store: the JSON snapshot file kept in step with the relational store.

pub mod exporter;
pub mod importer;
pub mod writer;
