//! Shared-storage grant for desktop platforms

use async_trait::async_trait;
use bridge_traits::{
    error::Result,
    storage::{ExternalDir, StorageGrant},
};
use std::collections::HashSet;

/// Desktop storage grant
///
/// Desktop operating systems do not gate the user's standard folders behind
/// a runtime permission, so every directory is granted unless the host
/// explicitly revokes it (kiosk or managed deployments).
#[derive(Debug, Clone, Default)]
pub struct DesktopStorageGrant {
    revoked: HashSet<ExternalDir>,
}

impl DesktopStorageGrant {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deny writes into `dir`
    pub fn revoke(mut self, dir: ExternalDir) -> Self {
        self.revoked.insert(dir);
        self
    }

    /// Deny writes into every shared directory
    pub fn deny_all() -> Self {
        Self {
            revoked: ExternalDir::ALL.into_iter().collect(),
        }
    }
}

#[async_trait]
impl StorageGrant for DesktopStorageGrant {
    async fn is_granted(&self, dir: ExternalDir) -> Result<bool> {
        Ok(!self.revoked.contains(&dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_granted_by_default() {
        let grant = DesktopStorageGrant::new();
        for dir in ExternalDir::ALL {
            assert!(grant.is_granted(dir).await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_revoke() {
        let grant = DesktopStorageGrant::new().revoke(ExternalDir::Images);
        assert!(!grant.is_granted(ExternalDir::Images).await.unwrap());
        assert!(grant.is_granted(ExternalDir::Audio).await.unwrap());

        let denied = DesktopStorageGrant::deny_all();
        assert!(!denied.is_granted(ExternalDir::Downloads).await.unwrap());
    }
}
