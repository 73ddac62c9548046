//! External identity verification
//!
//! The reconciler asks one question of the directory: may this account be
//! treated as still active? Only an explicit inactive match answers "no".

pub mod client;
pub mod types;

pub use client::DirectoryClient;
pub use types::{DirectoryResponse, DirectoryUser, DirectoryVerdict};

use async_trait::async_trait;

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// `false` only when the directory explicitly reports the account inactive
    async fn verify(&self, correlation_key: &str) -> bool;
}

#[async_trait]
impl IdentityVerifier for DirectoryClient {
    async fn verify(&self, correlation_key: &str) -> bool {
        self.check(correlation_key).await.treat_as_active()
    }
}

/// Verifier that never vetoes, for runs without directory access
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeActive;

#[async_trait]
impl IdentityVerifier for AssumeActive {
    async fn verify(&self, _correlation_key: &str) -> bool {
        true
    }
}
