//! Short-lived bearer tokens issued to the companion browser extension.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;
use uuid::Uuid;

/// A token as persisted by the issuing side.
#[derive(Clone)]
pub struct ExtensionToken {
    pub token: String,
    pub user_id: Uuid,
    pub active: bool,
    pub expires_at: DateTime<Utc>,
}

impl ExtensionToken {
    /// An active token valid for `ttl` from now.
    pub fn issue(user_id: Uuid, ttl: Duration) -> Self {
        Self {
            token: Uuid::new_v4().simple().to_string(),
            user_id,
            active: true,
            expires_at: Utc::now() + ttl,
        }
    }

    /// A token handed out ahead of time, valid until revoked.
    pub fn provisioned(token: impl Into<String>, user_id: Uuid) -> Self {
        Self {
            token: token.into(),
            user_id,
            active: true,
            expires_at: DateTime::<Utc>::MAX_UTC,
        }
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.active && self.expires_at > now
    }
}

impl fmt::Debug for ExtensionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionToken")
            .field("token", &"[REDACTED]")
            .field("user_id", &self.user_id)
            .field("active", &self.active)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Parse a comma-separated `token:user-uuid` list into provisioned tokens.
pub fn parse_provisioned_tokens(raw: &str) -> Result<Vec<ExtensionToken>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .enumerate()
        .map(|(index, entry)| {
            let (token, user_id) = entry
                .rsplit_once(':')
                .with_context(|| format!("extension token #{} is not token:user_id", index + 1))?;
            let token = token.trim();
            if token.is_empty() {
                anyhow::bail!("extension token #{} is empty", index + 1);
            }
            let user_id = Uuid::parse_str(user_id.trim())
                .with_context(|| format!("extension token #{} has an invalid user id", index + 1))?;
            Ok(ExtensionToken::provisioned(token, user_id))
        })
        .collect()
}

/// Lookup of extension tokens.
///
/// Implementations return only tokens that are active and unexpired.
#[async_trait]
pub trait ExtensionTokenStore: Send + Sync {
    async fn find_valid(&self, token: &str) -> Result<Option<ExtensionToken>>;
}

/// In-memory token store.
#[derive(Default)]
pub struct MemoryExtensionTokenStore {
    tokens: RwLock<HashMap<String, ExtensionToken>>,
}

impl MemoryExtensionTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(tokens: impl IntoIterator<Item = ExtensionToken>) -> Self {
        let store = Self::new();
        for token in tokens {
            store.insert(token);
        }
        store
    }

    pub fn insert(&self, token: ExtensionToken) {
        if let Ok(mut tokens) = self.tokens.write() {
            tokens.insert(token.token.clone(), token);
        }
    }

    /// Mark a token inactive. Returns false if it was unknown.
    pub fn revoke(&self, token: &str) -> bool {
        match self.tokens.write() {
            Ok(mut tokens) => match tokens.get_mut(token) {
                Some(entry) => {
                    entry.active = false;
                    true
                }
                None => false,
            },
            Err(_) => false,
        }
    }
}

#[async_trait]
impl ExtensionTokenStore for MemoryExtensionTokenStore {
    async fn find_valid(&self, token: &str) -> Result<Option<ExtensionToken>> {
        let tokens = self
            .tokens
            .read()
            .map_err(|_| anyhow::anyhow!("extension token store lock poisoned"))?;

        Ok(tokens
            .get(token)
            .filter(|entry| entry.is_valid_at(Utc::now()))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_active_token_is_found() {
        let store = MemoryExtensionTokenStore::new();
        let user_id = Uuid::new_v4();
        let token = ExtensionToken::issue(user_id, Duration::hours(1));
        let raw = token.token.clone();
        store.insert(token);

        let found = store.find_valid(&raw).await.unwrap().unwrap();
        assert_eq!(found.user_id, user_id);
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        let store = MemoryExtensionTokenStore::new();
        let mut token = ExtensionToken::issue(Uuid::new_v4(), Duration::hours(1));
        token.expires_at = Utc::now() - Duration::minutes(1);
        let raw = token.token.clone();
        store.insert(token);

        assert!(store.find_valid(&raw).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_revoked_token_is_rejected() {
        let store = MemoryExtensionTokenStore::new();
        let token = ExtensionToken::issue(Uuid::new_v4(), Duration::hours(1));
        let raw = token.token.clone();
        store.insert(token);

        assert!(store.revoke(&raw));
        assert!(store.find_valid(&raw).await.unwrap().is_none());
        assert!(!store.revoke("unknown"));
    }

    #[test]
    fn test_parse_provisioned_tokens() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let raw = format!(" ext-one:{} , ,ext-two:{}", first, second);

        let tokens = parse_provisioned_tokens(&raw).unwrap();

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].token, "ext-one");
        assert_eq!(tokens[0].user_id, first);
        assert_eq!(tokens[1].token, "ext-two");
        assert!(tokens[1].is_valid_at(Utc::now() + Duration::days(3650)));
        assert!(parse_provisioned_tokens("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_provisioned_tokens_rejects_bad_entries() {
        let err = parse_provisioned_tokens("no-separator").unwrap_err();
        assert!(err.to_string().contains("#1"));

        let err = parse_provisioned_tokens(&format!("ok:{},bad:not-a-uuid", Uuid::new_v4()))
            .unwrap_err();
        assert!(err.to_string().contains("#2"));

        assert!(parse_provisioned_tokens(&format!(":{}", Uuid::new_v4())).is_err());
    }

    #[tokio::test]
    async fn test_seeded_store_finds_tokens() {
        let user_id = Uuid::new_v4();
        let token = ExtensionToken::provisioned("ext-seed", user_id);
        let store = MemoryExtensionTokenStore::seeded(vec![token]);

        let found = store.find_valid("ext-seed").await.unwrap().unwrap();
        assert_eq!(found.user_id, user_id);
        assert!(!format!("{:?}", found).contains("ext-seed"));
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let store = MemoryExtensionTokenStore::new();
        assert!(store.find_valid("nope").await.unwrap().is_none());
    }
}
