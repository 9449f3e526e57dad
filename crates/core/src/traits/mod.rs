//! Collaborator traits.
//!
//! - `store`: cache and user-scoped persistence (TransientStore, UserMetaStore)
//! - `source`: the remote suggestion document (SuggestionSource)
//! - `governance`: request authorization (NonceVerifier)

pub mod governance;
pub mod source;
pub mod store;

pub use governance::*;
pub use source::*;
pub use store::*;
