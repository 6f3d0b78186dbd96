use async_trait::async_trait;
use thiserror::Error;

use crate::services::store::StoreError;

/// Authentication failures. Messages are shown to the user as-is.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("An account with this email already exists")]
    EmailTaken,

    #[error("{0}")]
    Provider(String),
}

/// Account identity returned by the provider after sign-up or sign-in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
    pub session_id: String,
}

/// Email/password identity provider
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create the account and open a first session for it
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<Identity, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    async fn sign_out(&self, identity: &Identity) -> Result<(), AuthError>;
}

/// Object storage for profile photos
#[async_trait]
pub trait BlobStorage: Send + Sync {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StoreError>;

    fn public_url(&self, path: &str) -> String;
}
