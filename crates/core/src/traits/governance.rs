//! Governance traits.

use crate::types::UserId;

/// Result of checking an anti-forgery token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonceCheck {
    /// Issued in the current half-lifetime window.
    Fresh,
    /// Issued in the previous half-lifetime window; still accepted.
    Aged,
    /// Missing, forged, expired, or bound to another user or action.
    Invalid,
}

impl NonceCheck {
    pub fn is_valid(&self) -> bool {
        !matches!(self, Self::Invalid)
    }
}

/// Issues and verifies per-user, per-action anti-forgery tokens.
pub trait NonceVerifier: Send + Sync {
    /// Create a token for `action` bound to `user_id`.
    fn create(&self, action: &str, user_id: &UserId) -> String;

    /// Verify a token previously issued by `create`.
    fn verify(&self, token: &str, action: &str, user_id: &UserId) -> NonceCheck;
}
