//! Prize Funnel Core - Shared types library.
//!
//! This crate provides the domain types used across the prize funnel:
//! - `prize-funnel` - Gateway, session, services, and the funnel controller
//! - `prize-funnel-cli` - Command-line shell that drives the funnel
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no HTTP
//! clients, no clock or randomness. Anything that needs "now" or a random
//! number takes it as an argument.
//!
//! # Modules
//!
//! - [`types`] - Identities, credentials, orders, feedback, shipping, and the
//!   local `UserState` projection

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
