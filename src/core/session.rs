use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::core::decode as decode_doc;
use crate::error::SparError;
use crate::models::{Profile, ProfileUpdate, SignUpRequest};
use crate::services::{
    BlobStorage, CacheKey, CacheManager, Collection, DocumentStore, Identity, IdentityProvider,
};

/// Authenticated session, passed explicitly into every operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub profile_id: String,
    pub email: String,
    pub token: String,
    pub identity: Identity,
}

impl Session {
    pub fn id(&self) -> &str {
        &self.identity.session_id
    }
}

/// Photo bytes as received from the client
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    sid: String,
    email: String,
    iat: u64,
    exp: u64,
}

/// Wraps the identity provider and the `users` collection.
///
/// A session is acquired at sign-up or sign-in and released by `sign_out`.
/// Tokens are signed JWTs, and additionally must still be registered in the
/// session cache so that signing out revokes them.
pub struct SessionManager {
    identity: Arc<dyn IdentityProvider>,
    store: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStorage>,
    sessions: CacheManager<Session>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: u64,
}

impl SessionManager {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStorage>,
        jwt_secret: &str,
        ttl_secs: u64,
        max_sessions: u64,
    ) -> Self {
        Self {
            identity,
            store,
            blobs,
            sessions: CacheManager::new(max_sessions, ttl_secs),
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            ttl_secs,
        }
    }

    async fn open(&self, identity: Identity) -> Result<Session, SparError> {
        let now = Utc::now().timestamp().max(0) as u64;
        let claims = Claims {
            sub: identity.user_id.clone(),
            sid: identity.session_id.clone(),
            email: identity.email.clone(),
            iat: now,
            exp: now + self.ttl_secs,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| SparError::Internal(format!("failed to sign session token: {}", e)))?;

        let session = Session {
            profile_id: identity.user_id.clone(),
            email: identity.email.clone(),
            token,
            identity,
        };
        self.sessions
            .set(&CacheKey::session(session.id()), session.clone())
            .await;

        Ok(session)
    }

    /// Create an account, upload the optional photo and write the profile
    pub async fn sign_up(
        &self,
        request: SignUpRequest,
        photo: Option<PhotoUpload>,
    ) -> Result<(Session, Profile), SparError> {
        request.validate()?;
        if let Some(photo) = &photo {
            check_photo(photo)?;
        }

        let identity = self
            .identity
            .sign_up(&request.email, &request.password, &request.display_name)
            .await?;

        let photo_url = match photo {
            Some(photo) => Some(self.store_photo(&identity.user_id, photo).await?),
            None => None,
        };

        let now = Utc::now();
        let profile = Profile {
            id: identity.user_id.clone(),
            email: identity.email.clone(),
            display_name: request.display_name,
            photo_url,
            age: request.age,
            bio: request.bio,
            fight_style: request.fight_style,
            experience: request.experience,
            weight: request.weight,
            height: request.height,
            location: request.location,
            wins: 0,
            losses: 0,
            created_at: now,
            last_active: now,
        };

        self.store
            .insert(Collection::Users, &profile.id, serde_json::to_value(&profile)?)
            .await?;

        tracing::info!("Registered profile {}", profile.id);

        let session = self.open(identity).await?;
        Ok((session, profile))
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, SparError> {
        let identity = self.identity.sign_in(email, password).await?;
        tracing::info!("Signed in profile {}", identity.user_id);
        self.open(identity).await
    }

    /// Resolve a bearer token back into its live session
    pub async fn restore(&self, token: &str) -> Result<Session, SparError> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))
            .map_err(|e| SparError::Unauthorized(format!("invalid session token: {}", e)))?;

        match self.sessions.get(&CacheKey::session(&data.claims.sid)).await {
            Some(session) if session.token == token => Ok(session),
            _ => Err(SparError::Unauthorized("session has ended".to_string())),
        }
    }

    /// The session holder's profile, if one was ever written
    pub async fn current_profile(&self, session: &Session) -> Result<Option<Profile>, SparError> {
        let document = self.store.get(Collection::Users, &session.profile_id).await?;
        Ok(document.map(decode_doc::<Profile>).transpose()?)
    }

    async fn require_profile(&self, session: &Session) -> Result<Profile, SparError> {
        self.current_profile(session)
            .await?
            .ok_or_else(|| SparError::NotFound(format!("profile {}", session.profile_id)))
    }

    /// Apply an edit to the caller's own profile, always bumping `lastActive`
    pub async fn update_profile(
        &self,
        session: &Session,
        update: ProfileUpdate,
    ) -> Result<Profile, SparError> {
        update.validate()?;

        let mut patch = serde_json::to_value(&update)?;
        patch["lastActive"] = serde_json::to_value(Utc::now())?;

        self.store
            .update(Collection::Users, &session.profile_id, patch)
            .await?;

        tracing::debug!("Updated profile {}", session.profile_id);
        self.require_profile(session).await
    }

    /// Replace the caller's profile photo
    pub async fn upload_photo(
        &self,
        session: &Session,
        photo: PhotoUpload,
    ) -> Result<Profile, SparError> {
        check_photo(&photo)?;
        let url = self.store_photo(&session.profile_id, photo).await?;

        let patch = serde_json::json!({
            "photoURL": url,
            "lastActive": Utc::now(),
        });
        self.store
            .update(Collection::Users, &session.profile_id, patch)
            .await?;

        self.require_profile(session).await
    }

    async fn store_photo(&self, user_id: &str, photo: PhotoUpload) -> Result<String, SparError> {
        let path = format!("photos/{}", user_id);
        let stored = self
            .blobs
            .upload(&path, photo.bytes, &photo.content_type)
            .await?;
        Ok(self.blobs.public_url(&stored))
    }

    /// Release the session: the token stops working immediately and the
    /// provider session is closed
    pub async fn sign_out(&self, session: Session) -> Result<(), SparError> {
        self.sessions.delete(&CacheKey::session(session.id())).await;
        self.identity.sign_out(&session.identity).await?;
        tracing::info!("Signed out profile {}", session.profile_id);
        Ok(())
    }
}

fn check_photo(photo: &PhotoUpload) -> Result<(), SparError> {
    if photo.bytes.is_empty() {
        return Err(SparError::Validation("Photo is empty".to_string()));
    }
    if !photo.content_type.starts_with("image/") {
        return Err(SparError::Validation(format!(
            "Unsupported photo type: {}",
            photo.content_type
        )));
    }
    Ok(())
}
