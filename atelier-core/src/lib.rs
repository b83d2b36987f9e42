//! Atelier Core
//!
//! Core types shared by the Atelier provider clients and HTTP service.
//!
//! This crate contains:
//! - Domain types: job handles, job status, field paths over provider payloads
//! - DTOs: inbound request/response bodies for the public endpoints

pub mod domain;
pub mod dto;
