//! Anti-forgery nonces for state-changing AJAX actions.
//!
//! A nonce is bound to a user, an action name and a time window ("tick").
//! Ticks are half a lifetime long; a token stays valid for its own tick and
//! the next one, so it lives between half and a full lifetime.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, Secret};
use sha2::Sha256;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use subtle::ConstantTimeEq;

use marketplace_core::{
    traits::{NonceCheck, NonceVerifier},
    types::UserId,
};

type HmacSha256 = Hmac<Sha256>;

/// Visible length of an issued token, in hex characters.
const TOKEN_LEN: usize = 10;

/// HMAC-SHA256 nonce issuer and verifier.
pub struct HmacNonceVerifier {
    secret: Secret<String>,
    lifetime: Duration,
}

impl HmacNonceVerifier {
    /// Create a verifier with the given signing secret and token lifetime.
    pub fn new(secret: Secret<String>, lifetime: Duration) -> Self {
        Self { secret, lifetime }
    }

    fn tick(&self, now_secs: u64) -> u64 {
        let half = (self.lifetime.as_secs() / 2).max(1);
        now_secs.div_ceil(half)
    }

    fn token_for_tick(&self, tick: u64, action: &str, user_id: &UserId) -> String {
        // new_from_slice accepts keys of any length for HMAC
        let mut mac = match HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes()) {
            Ok(mac) => mac,
            Err(_) => return String::new(),
        };
        mac.update(format!("{}|{}|{}", tick, action, user_id).as_bytes());
        let digest = hex::encode(mac.finalize().into_bytes());
        digest[..TOKEN_LEN].to_string()
    }

    /// Issue a token as of `now_secs` since the Unix epoch.
    pub fn create_at(&self, action: &str, user_id: &UserId, now_secs: u64) -> String {
        self.token_for_tick(self.tick(now_secs), action, user_id)
    }

    /// Verify a token as of `now_secs` since the Unix epoch.
    pub fn verify_at(&self, token: &str, action: &str, user_id: &UserId, now_secs: u64) -> NonceCheck {
        if token.is_empty() {
            return NonceCheck::Invalid;
        }

        let tick = self.tick(now_secs);
        let matches = |t: u64| -> bool {
            let expected = self.token_for_tick(t, action, user_id);
            bool::from(expected.as_bytes().ct_eq(token.as_bytes()))
        };

        if matches(tick) {
            NonceCheck::Fresh
        } else if tick > 0 && matches(tick - 1) {
            NonceCheck::Aged
        } else {
            NonceCheck::Invalid
        }
    }

    fn now_secs() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

impl NonceVerifier for HmacNonceVerifier {
    fn create(&self, action: &str, user_id: &UserId) -> String {
        self.create_at(action, user_id, Self::now_secs())
    }

    fn verify(&self, token: &str, action: &str, user_id: &UserId) -> NonceCheck {
        let check = self.verify_at(token, action, user_id, Self::now_secs());
        if check == NonceCheck::Invalid {
            tracing::debug!(action = action, user_id = %user_id, "Nonce verification failed");
        }
        check
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: u64 = 86_400;
    const ACTION: &str = "add_dismissed_marketplace_suggestion";

    fn verifier() -> HmacNonceVerifier {
        HmacNonceVerifier::new(Secret::new("test-secret".to_string()), Duration::from_secs(DAY))
    }

    #[test]
    fn test_fresh_token_verifies() {
        let v = verifier();
        let user = UserId::from("1");
        let now = 1_700_000_000;

        let token = v.create_at(ACTION, &user, now);
        assert_eq!(token.len(), TOKEN_LEN);
        assert_eq!(v.verify_at(&token, ACTION, &user, now), NonceCheck::Fresh);
    }

    #[test]
    fn test_token_ages_then_expires() {
        let v = verifier();
        let user = UserId::from("1");
        let now = 1_700_000_000;
        let token = v.create_at(ACTION, &user, now);

        let half = DAY / 2;
        let next_tick = now + half;
        assert_eq!(v.verify_at(&token, ACTION, &user, next_tick), NonceCheck::Aged);

        let two_ticks_later = now + 2 * half;
        assert_eq!(
            v.verify_at(&token, ACTION, &user, two_ticks_later),
            NonceCheck::Invalid
        );
    }

    #[test]
    fn test_token_bound_to_user_and_action() {
        let v = verifier();
        let now = 1_700_000_000;
        let token = v.create_at(ACTION, &UserId::from("1"), now);

        assert_eq!(
            v.verify_at(&token, ACTION, &UserId::from("2"), now),
            NonceCheck::Invalid
        );
        assert_eq!(
            v.verify_at(&token, "other_action", &UserId::from("1"), now),
            NonceCheck::Invalid
        );
    }

    #[test]
    fn test_token_bound_to_secret() {
        let user = UserId::from("1");
        let now = 1_700_000_000;
        let token = verifier().create_at(ACTION, &user, now);

        let other = HmacNonceVerifier::new(Secret::new("other".to_string()), Duration::from_secs(DAY));
        assert_eq!(other.verify_at(&token, ACTION, &user, now), NonceCheck::Invalid);
    }

    #[test]
    fn test_empty_and_garbage_tokens_rejected() {
        let v = verifier();
        let user = UserId::from("1");
        assert_eq!(v.verify_at("", ACTION, &user, 1_700_000_000), NonceCheck::Invalid);
        assert_eq!(
            v.verify_at("not-a-nonce", ACTION, &user, 1_700_000_000),
            NonceCheck::Invalid
        );
    }

    #[test]
    fn test_trait_roundtrip_uses_wall_clock() {
        let v = verifier();
        let user = UserId::from("9");
        let token = v.create(ACTION, &user);
        assert!(v.verify(&token, ACTION, &user).is_valid());
    }
}
