//! In-process backend used for local development and tests.
//!
//! Behaves like the hosted backend as far as the service can observe:
//! insertion-ordered listings, unique document ids and the same filter
//! semantics. Nothing is persisted across restarts.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use crate::services::identity::{AuthError, BlobStorage, Identity, IdentityProvider};
use crate::services::store::{Collection, DocumentStore, Filter, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Value>>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail as if the network were down
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of documents in a collection
    pub async fn count(&self, collection: Collection) -> usize {
        self.collections
            .read()
            .await
            .get(&collection)
            .map(Vec::len)
            .unwrap_or(0)
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store offline".to_string()));
        }
        Ok(())
    }
}

fn document_id(document: &Value) -> Option<&str> {
    document.get("id").and_then(Value::as_str)
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(
        &self,
        collection: Collection,
        id: &str,
        mut document: Value,
    ) -> Result<String, StoreError> {
        self.check_available()?;

        let obj = document
            .as_object_mut()
            .ok_or_else(|| StoreError::Malformed("document must be an object".to_string()))?;
        obj.insert("id".to_string(), Value::String(id.to_string()));

        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection).or_default();
        if docs.iter().any(|d| document_id(d) == Some(id)) {
            return Err(StoreError::Conflict(format!("{}/{}", collection.as_str(), id)));
        }
        docs.push(document);

        tracing::trace!("memory insert {}/{}", collection.as_str(), id);
        Ok(id.to_string())
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>, StoreError> {
        self.check_available()?;

        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| document_id(d) == Some(id)))
            .cloned())
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Value,
    ) -> Result<(), StoreError> {
        self.check_available()?;

        let Value::Object(fields) = patch else {
            return Err(StoreError::Malformed("patch must be an object".to_string()));
        };

        let mut collections = self.collections.write().await;
        let document = collections
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|d| document_id(d) == Some(id)))
            .ok_or_else(|| StoreError::NotFound(format!("{}/{}", collection.as_str(), id)))?;

        if let Some(obj) = document.as_object_mut() {
            for (key, value) in fields {
                if key != "id" {
                    obj.insert(key, value);
                }
            }
        }
        Ok(())
    }

    async fn query(
        &self,
        collection: Collection,
        filters: &[Filter],
    ) -> Result<Vec<Value>, StoreError> {
        self.check_available()?;

        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| filters.iter().all(|f| f.matches(d)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

struct Account {
    user_id: String,
    password: String,
}

/// Email/password accounts held in memory
#[derive(Default)]
pub struct MemoryIdentity {
    accounts: RwLock<HashMap<String, Account>>,
    sessions: RwLock<HashMap<String, String>>,
}

impl MemoryIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of provider sessions still open
    pub async fn open_sessions(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn open_session(&self, user_id: &str, email: &str) -> Identity {
        let session_id = uuid::Uuid::new_v4().simple().to_string();
        self.sessions
            .write()
            .await
            .insert(session_id.clone(), user_id.to_string());
        Identity {
            user_id: user_id.to_string(),
            email: email.to_string(),
            session_id,
        }
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentity {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        _display_name: &str,
    ) -> Result<Identity, AuthError> {
        let key = email.trim().to_lowercase();
        let user_id = {
            let mut accounts = self.accounts.write().await;
            if accounts.contains_key(&key) {
                return Err(AuthError::EmailTaken);
            }
            let user_id = uuid::Uuid::new_v4().simple().to_string();
            accounts.insert(
                key,
                Account {
                    user_id: user_id.clone(),
                    password: password.to_string(),
                },
            );
            user_id
        };
        Ok(self.open_session(&user_id, email).await)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let user_id = {
            let accounts = self.accounts.read().await;
            match accounts.get(&email.trim().to_lowercase()) {
                Some(account) if account.password == password => account.user_id.clone(),
                _ => return Err(AuthError::InvalidCredentials),
            }
        };
        Ok(self.open_session(&user_id, email).await)
    }

    async fn sign_out(&self, identity: &Identity) -> Result<(), AuthError> {
        self.sessions.write().await.remove(&identity.session_id);
        Ok(())
    }
}

/// Blob storage kept in memory
#[derive(Default)]
pub struct MemoryBlobs {
    blobs: RwLock<HashMap<String, (Vec<u8>, String)>>,
}

impl MemoryBlobs {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, path: &str) -> bool {
        self.blobs.read().await.contains_key(path)
    }
}

#[async_trait]
impl BlobStorage for MemoryBlobs {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StoreError> {
        self.blobs
            .write()
            .await
            .insert(path.to_string(), (bytes, content_type.to_string()));
        Ok(path.to_string())
    }

    fn public_url(&self, path: &str) -> String {
        format!("memory://blobs/{}", path)
    }
}
