//! Data Transfer Objects for the public endpoints
//!
//! Request bodies accepted by the Atelier service and the normalized
//! response bodies it returns, independent of which provider served them.

pub mod error;
pub mod model;
pub mod removebg;
pub mod tryon;
