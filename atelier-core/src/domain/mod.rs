//! Core domain types
//!
//! These types describe asynchronous provider jobs and the loosely-typed
//! payloads providers send back. They are shared between the provider
//! clients (which produce them) and the HTTP service (which reports them).

pub mod data_uri;
pub mod field_path;
pub mod job;
