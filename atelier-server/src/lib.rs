//! Atelier Server
//!
//! Backend-for-frontend exposing model synthesis, background removal and
//! garment try-on over HTTP. Each endpoint validates its input, calls one
//! provider, and answers with a single normalized image reference.
//!
//! Layers:
//! - Configuration: read once at startup, validated, shared via state
//! - API: axum handlers and the JSON error boundary
//! - Services: provider selection, request bodies, response extraction

pub mod api;
pub mod config;
pub mod service;
pub mod state;
