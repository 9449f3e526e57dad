//! Mock implementations of core traits for testing.
//!
//! These are shared by the unit tests of every crate and by the
//! integration tests of the gateway and the root binary.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::{
    traits::{NonceCheck, NonceVerifier, SuggestionSource, TransientStore, UserMetaStore},
    types::{Suggestion, UserId},
    Error, Result,
};

// =============================================================================
// Mock Suggestion Source
// =============================================================================

/// A scripted reply from [`MockSuggestionSource`].
#[derive(Debug, Clone)]
pub enum MockReply {
    Suggestions(Vec<Suggestion>),
    RemoteError(String),
    Malformed(String),
}

/// Scripted suggestion source that counts its calls.
///
/// Replies are served in order; the last one repeats once the script runs out.
pub struct MockSuggestionSource {
    replies: Mutex<Vec<MockReply>>,
    call_count: Mutex<usize>,
}

impl MockSuggestionSource {
    pub fn new(replies: Vec<MockReply>) -> Self {
        Self {
            replies: Mutex::new(replies),
            call_count: Mutex::new(0),
        }
    }

    /// A source that always returns the given suggestions.
    pub fn returning(suggestions: Vec<Suggestion>) -> Self {
        Self::new(vec![MockReply::Suggestions(suggestions)])
    }

    /// A source that always fails at the transport level.
    pub fn failing(message: &str) -> Self {
        Self::new(vec![MockReply::RemoteError(message.to_string())])
    }

    /// Number of fetches performed so far.
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

#[async_trait]
impl SuggestionSource for MockSuggestionSource {
    async fn fetch(&self) -> Result<Vec<Suggestion>> {
        let idx = {
            let mut count = self.call_count.lock().unwrap();
            *count += 1;
            *count - 1
        };

        let reply = {
            let replies = self.replies.lock().unwrap();
            replies
                .get(idx)
                .or_else(|| replies.last())
                .cloned()
                .unwrap_or(MockReply::Suggestions(Vec::new()))
        };

        match reply {
            MockReply::Suggestions(items) => Ok(items),
            MockReply::RemoteError(msg) => Err(Error::remote_fetch(msg)),
            MockReply::Malformed(msg) => Err(Error::malformed_payload(msg)),
        }
    }
}

// =============================================================================
// Recording Transient Store
// =============================================================================

/// A write observed by [`RecordingTransientStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct TransientWrite {
    pub key: String,
    pub value: Value,
    pub ttl: Duration,
}

/// Transient store that never expires entries but records every write.
#[derive(Default)]
pub struct RecordingTransientStore {
    entries: Mutex<HashMap<String, Value>>,
    writes: Mutex<Vec<TransientWrite>>,
    fail_reads: bool,
}

impl RecordingTransientStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value as if it had been cached earlier.
    pub fn with_entry(key: &str, value: Value) -> Self {
        let store = Self::new();
        store.entries.lock().unwrap().insert(key.to_string(), value);
        store
    }

    /// A store whose reads always fail.
    pub fn failing_reads() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }

    /// All writes, oldest first.
    pub fn writes(&self) -> Vec<TransientWrite> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransientStore for RecordingTransientStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        if self.fail_reads {
            return Err(Error::storage("mock read failure"));
        }
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &Value, ttl: Duration) -> Result<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.clone());
        self.writes.lock().unwrap().push(TransientWrite {
            key: key.to_string(),
            value: value.clone(),
            ttl,
        });
        Ok(())
    }
}

// =============================================================================
// Mock User Meta Store
// =============================================================================

/// In-memory user meta store that counts writes.
#[derive(Default)]
pub struct MockUserMetaStore {
    entries: Mutex<HashMap<(String, String), Value>>,
    write_count: Mutex<usize>,
}

impl MockUserMetaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw value for a user.
    pub fn with_value(user_id: &UserId, key: &str, value: Value) -> Self {
        let store = Self::new();
        store
            .entries
            .lock()
            .unwrap()
            .insert((user_id.0.clone(), key.to_string()), value);
        store
    }

    /// Raw stored value, bypassing the trait.
    pub fn raw(&self, user_id: &UserId, key: &str) -> Option<Value> {
        self.entries
            .lock()
            .unwrap()
            .get(&(user_id.0.clone(), key.to_string()))
            .cloned()
    }

    pub fn write_count(&self) -> usize {
        *self.write_count.lock().unwrap()
    }
}

#[async_trait]
impl UserMetaStore for MockUserMetaStore {
    async fn get(&self, user_id: &UserId, key: &str) -> Result<Option<Value>> {
        Ok(self.raw(user_id, key))
    }

    async fn set(&self, user_id: &UserId, key: &str, value: &Value) -> Result<()> {
        self.entries
            .lock()
            .unwrap()
            .insert((user_id.0.clone(), key.to_string()), value.clone());
        *self.write_count.lock().unwrap() += 1;
        Ok(())
    }
}

// =============================================================================
// Static Nonce Verifier
// =============================================================================

/// Nonce verifier that accepts exactly one token, for any user and action.
pub struct StaticNonceVerifier {
    token: String,
}

impl StaticNonceVerifier {
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
        }
    }
}

impl NonceVerifier for StaticNonceVerifier {
    fn create(&self, _action: &str, _user_id: &UserId) -> String {
        self.token.clone()
    }

    fn verify(&self, token: &str, _action: &str, _user_id: &UserId) -> NonceCheck {
        if token == self.token {
            NonceCheck::Fresh
        } else {
            NonceCheck::Invalid
        }
    }
}
