//! services/api/src/lib.rs
//!
//! The CodeWithChat API: HTTP handlers, storage and cache adapters, and the
//! maintenance routines shared by the service binaries.

pub mod adapters;
pub mod config;
pub mod error;
pub mod maintenance;
pub mod web;
