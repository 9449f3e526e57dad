//! Core type definitions for the marketplace suggestions service.

pub mod dismissal;
pub mod suggestion;

pub use dismissal::*;
pub use suggestion::*;
