//! WhatsApp Cloud API provider for hemotrack.
//!
//! Implements the core's [`MessageSender`](hemotrack_core::MessageSender)
//! capability against Meta's Cloud API. The HTTP client is feature-gated
//! (`cloud-api`); payload and response types compile regardless, so hosts
//! and tests can exercise the wire format without network access. For
//! offline development use the simulated sender shipped with
//! hemotrack-core instead.

pub mod client;
pub mod config;
pub mod payload;

pub use client::*;
pub use config::*;
