//! Client identities and the provider that hands them out.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::IdentityError;
use crate::profile::{ChannelProfile, NetworkProfile};

/// Authenticated handle bound to one identity.
///
/// Cheap to clone; the network profile is shared and never mutated.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    identity: String,
    msp_id: String,
    profile: Arc<NetworkProfile>,
}

impl ClientHandle {
    pub fn new(identity: impl Into<String>, msp_id: impl Into<String>, profile: Arc<NetworkProfile>) -> Self {
        Self {
            identity: identity.into(),
            msp_id: msp_id.into(),
            profile,
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn msp_id(&self) -> &str {
        &self.msp_id
    }

    /// Serialized creator used when minting transaction ids.
    pub fn creator(&self) -> Vec<u8> {
        format!("{}:{}", self.msp_id, self.identity).into_bytes()
    }

    /// Channel profile, `None` when the channel is not configured.
    pub fn channel(&self, name: &str) -> Option<&ChannelProfile> {
        self.profile.channel(name)
    }
}

/// Supplies authenticated client handles.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Return the handle for `identity`, enrolling it on first use.
    async fn get_or_enroll(&self, identity: &str, secret: &str) -> Result<ClientHandle, IdentityError>;
}

/// Identity provider backed by a fixed credential table.
///
/// Handles are created on first successful authentication and reused for
/// later requests. No certificate authority is contacted.
pub struct StaticIdentityProvider {
    msp_id: String,
    profile: Arc<NetworkProfile>,
    credentials: HashMap<String, String>,
    enrolled: RwLock<HashMap<String, ClientHandle>>,
}

impl StaticIdentityProvider {
    pub fn new<I>(msp_id: impl Into<String>, profile: Arc<NetworkProfile>, credentials: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self {
            msp_id: msp_id.into(),
            profile,
            credentials: credentials.into_iter().collect(),
            enrolled: RwLock::new(HashMap::new()),
        }
    }

    fn verify(&self, identity: &str, secret: &str) -> Result<(), IdentityError> {
        let expected = self
            .credentials
            .get(identity)
            .ok_or_else(|| IdentityError::UnknownIdentity(identity.to_string()))?;

        if bool::from(expected.as_bytes().ct_eq(secret.as_bytes())) {
            Ok(())
        } else {
            warn!("Rejected secret for identity {}", identity);
            Err(IdentityError::InvalidSecret(identity.to_string()))
        }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn get_or_enroll(&self, identity: &str, secret: &str) -> Result<ClientHandle, IdentityError> {
        // Secrets are checked on every call, cached or not.
        self.verify(identity, secret)?;

        if let Some(handle) = self.enrolled.read().await.get(identity) {
            debug!("Loaded identity {} from cache", identity);
            return Ok(handle.clone());
        }

        let mut enrolled = self.enrolled.write().await;
        let handle = enrolled
            .entry(identity.to_string())
            .or_insert_with(|| ClientHandle::new(identity, self.msp_id.clone(), Arc::clone(&self.profile)))
            .clone();

        info!("Enrolled identity {} for {}", identity, self.msp_id);
        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> StaticIdentityProvider {
        StaticIdentityProvider::new(
            "Org1MSP",
            Arc::new(NetworkProfile::default()),
            vec![("user1".to_string(), "s3cret".to_string())],
        )
    }

    #[tokio::test]
    async fn test_enroll_known_identity() {
        let handle = provider().get_or_enroll("user1", "s3cret").await.unwrap();
        assert_eq!(handle.identity(), "user1");
        assert_eq!(handle.msp_id(), "Org1MSP");
        assert_eq!(handle.creator(), b"Org1MSP:user1".to_vec());
    }

    #[tokio::test]
    async fn test_cached_handle_still_checks_secret() {
        let provider = provider();
        provider.get_or_enroll("user1", "s3cret").await.unwrap();

        let err = provider.get_or_enroll("user1", "wrong").await.unwrap_err();
        assert!(matches!(err, IdentityError::InvalidSecret(_)));
    }

    #[tokio::test]
    async fn test_unknown_identity() {
        let err = provider().get_or_enroll("mallory", "x").await.unwrap_err();
        assert!(matches!(err, IdentityError::UnknownIdentity(id) if id == "mallory"));
    }
}
