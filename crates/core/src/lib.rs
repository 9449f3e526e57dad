#![deny(unused)]
//! Core types, traits, and error definitions for the marketplace suggestions service.
//!
//! This crate holds the contracts shared by the store, governance and gateway
//! crates. Collaborators (cache store, user store, remote source, nonce
//! verifier) are traits here so every component receives them explicitly.

pub mod config;
pub mod error;
pub mod mocks;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use traits::*;
pub use types::*;
