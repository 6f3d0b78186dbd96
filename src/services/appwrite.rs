use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::{json, Map, Value};
use std::time::Duration;
use thiserror::Error;

use crate::services::identity::{AuthError, BlobStorage, Identity, IdentityProvider};
use crate::services::store::{Collection, DocumentStore, Filter, StoreError};

/// Page size used when listing documents
const PAGE_SIZE: usize = 100;

/// Attributes holding nested objects. Appwrite has no object attribute type,
/// so these are stored as JSON strings.
const EMBEDDED_FIELDS: [&str; 3] = ["user1", "user2", "result"];

/// Errors that can occur when interacting with Appwrite
#[derive(Debug, Error)]
pub enum AppwriteError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

impl From<AppwriteError> for StoreError {
    fn from(err: AppwriteError) -> Self {
        match err {
            AppwriteError::RequestError(e) => StoreError::Unavailable(e.to_string()),
            AppwriteError::Unauthorized(m) => StoreError::PermissionDenied(m),
            AppwriteError::NotFound(m) => StoreError::NotFound(m),
            AppwriteError::Conflict(m) => StoreError::Conflict(m),
            AppwriteError::InvalidResponse(m) => StoreError::Malformed(m),
            e @ AppwriteError::ApiError { .. } => StoreError::Backend(e.to_string()),
        }
    }
}

impl From<AppwriteError> for AuthError {
    fn from(err: AppwriteError) -> Self {
        match err {
            AppwriteError::Unauthorized(_) => AuthError::InvalidCredentials,
            AppwriteError::Conflict(_) => AuthError::EmailTaken,
            AppwriteError::ApiError { message, .. } => AuthError::Provider(message),
            other => AuthError::Provider(other.to_string()),
        }
    }
}

/// Collection IDs in Appwrite
#[derive(Debug, Clone)]
pub struct AppwriteCollections {
    pub users: String,
    pub swipes: String,
    pub matches: String,
}

impl AppwriteCollections {
    fn id(&self, collection: Collection) -> &str {
        match collection {
            Collection::Users => &self.users,
            Collection::Swipes => &self.swipes,
            Collection::Matches => &self.matches,
        }
    }
}

/// Appwrite API client
///
/// Implements the document store, identity provider and blob storage on top
/// of the Appwrite REST API:
/// - Databases for `users`, `swipes` and `matches`
/// - Users/Account for email and password sessions
/// - Storage for profile photos
pub struct AppwriteClient {
    base_url: String,
    api_key: String,
    project_id: String,
    database_id: String,
    bucket_id: String,
    client: Client,
    collections: AppwriteCollections,
}

impl AppwriteClient {
    /// Create a new Appwrite client
    pub fn new(
        base_url: String,
        api_key: String,
        project_id: String,
        database_id: String,
        bucket_id: String,
        collections: AppwriteCollections,
    ) -> Result<Self, AppwriteError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            project_id,
            database_id,
            bucket_id,
            client,
            collections,
        })
    }

    fn documents_url(&self, collection: Collection) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.base_url,
            self.database_id,
            self.collections.id(collection)
        )
    }

    fn document_url(&self, collection: Collection, id: &str) -> String {
        format!("{}/{}", self.documents_url(collection), urlencoding::encode(id))
    }

    /// Attach project and server key headers
    fn server(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("X-Appwrite-Project", &self.project_id)
            .header("X-Appwrite-Key", &self.api_key)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Value, AppwriteError> {
        let response = builder.send().await?;
        read_response(response).await
    }

    fn file_id(path: &str) -> String {
        path.replace('/', "_")
    }

    fn files_url(&self) -> String {
        format!("{}/storage/buckets/{}/files", self.base_url, self.bucket_id)
    }

    async fn create_file(
        &self,
        file_id: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<Value, AppwriteError> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_id.to_string())
            .mime_str(content_type)
            .map_err(|e| AppwriteError::InvalidResponse(format!("invalid content type: {}", e)))?;
        let form = reqwest::multipart::Form::new()
            .text("fileId", file_id.to_string())
            .part("file", part);

        self.send(self.server(self.client.post(self.files_url())).multipart(form))
            .await
    }

    async fn delete_file(&self, file_id: &str) -> Result<(), AppwriteError> {
        let url = format!("{}/{}", self.files_url(), urlencoding::encode(file_id));
        match self.send(self.server(self.client.delete(url))).await {
            Ok(_) | Err(AppwriteError::NotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// Turn an Appwrite response into its JSON body or a typed error
async fn read_response(response: Response) -> Result<Value, AppwriteError> {
    let status = response.status();

    if status == StatusCode::NO_CONTENT {
        return Ok(Value::Null);
    }

    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or(body);

    tracing::debug!("Appwrite returned {}: {}", status, message);

    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppwriteError::Unauthorized(message),
        StatusCode::NOT_FOUND => AppwriteError::NotFound(message),
        StatusCode::CONFLICT => AppwriteError::Conflict(message),
        _ => AppwriteError::ApiError {
            status: status.as_u16(),
            message,
        },
    })
}

fn attribute(field: &str) -> &str {
    if field == "id" {
        "$id"
    } else {
        field
    }
}

/// Appwrite JSON query syntax for a filter
fn query_json(filter: &Filter) -> Value {
    match filter {
        Filter::Equal(field, value) => json!({
            "method": "equal",
            "attribute": attribute(field),
            "values": [value],
        }),
        Filter::NotEqual(field, value) => json!({
            "method": "notEqual",
            "attribute": attribute(field),
            "values": [value],
        }),
        Filter::Or(filters) => json!({
            "method": "or",
            "values": filters.iter().map(query_json).collect::<Vec<_>>(),
        }),
    }
}

/// Prepare a document for writing: nested objects become strings and the
/// `id` field is carried by `$id` instead.
fn encode_document(document: Value) -> Result<Map<String, Value>, AppwriteError> {
    let Value::Object(mut obj) = document else {
        return Err(AppwriteError::InvalidResponse(
            "document must be a JSON object".into(),
        ));
    };
    obj.remove("id");

    for field in EMBEDDED_FIELDS {
        if let Some(value) = obj.get_mut(field) {
            if value.is_object() {
                *value = Value::String(value.to_string());
            }
        }
    }
    Ok(obj)
}

/// Normalize a stored document back into the service's shape
fn decode_document(doc: &Value) -> Value {
    let Some(source) = doc.as_object() else {
        return doc.clone();
    };

    let mut obj: Map<String, Value> = source
        .iter()
        .filter(|(k, _)| !k.starts_with('$'))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    if let Some(id) = source.get("$id") {
        obj.insert("id".to_string(), id.clone());
    }

    for field in EMBEDDED_FIELDS {
        if let Some(Value::String(raw)) = obj.get(field) {
            if let Ok(parsed) = serde_json::from_str::<Value>(raw) {
                obj.insert(field.to_string(), parsed);
            }
        }
    }

    Value::Object(obj)
}

#[async_trait]
impl DocumentStore for AppwriteClient {
    async fn insert(
        &self,
        collection: Collection,
        id: &str,
        document: Value,
    ) -> Result<String, StoreError> {
        let data = encode_document(document)?;
        let payload = json!({ "documentId": id, "data": data });

        let created = self
            .send(self.server(self.client.post(self.documents_url(collection))).json(&payload))
            .await?;

        tracing::debug!("Created {} document {}", collection.as_str(), id);

        Ok(created
            .get("$id")
            .and_then(Value::as_str)
            .unwrap_or(id)
            .to_string())
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>, StoreError> {
        let url = self.document_url(collection, id);

        match self.send(self.server(self.client.get(&url))).await {
            Ok(doc) => Ok(Some(decode_document(&doc))),
            Err(AppwriteError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Value,
    ) -> Result<(), StoreError> {
        let data = encode_document(patch)?;
        let url = self.document_url(collection, id);

        self.send(self.server(self.client.patch(&url)).json(&json!({ "data": data })))
            .await?;

        tracing::debug!("Updated {} document {}", collection.as_str(), id);
        Ok(())
    }

    async fn query(
        &self,
        collection: Collection,
        filters: &[Filter],
    ) -> Result<Vec<Value>, StoreError> {
        let url = self.documents_url(collection);
        let base: Vec<String> = filters.iter().map(|f| query_json(f).to_string()).collect();

        let mut documents = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut params: Vec<(&str, String)> =
                base.iter().map(|q| ("queries[]", q.clone())).collect();
            params.push((
                "queries[]",
                json!({"method": "limit", "values": [PAGE_SIZE]}).to_string(),
            ));
            if let Some(after) = &cursor {
                params.push((
                    "queries[]",
                    json!({"method": "cursorAfter", "values": [after]}).to_string(),
                ));
            }

            let json = self
                .send(self.server(self.client.get(&url)).query(&params))
                .await?;

            let page = json
                .get("documents")
                .and_then(Value::as_array)
                .ok_or_else(|| AppwriteError::InvalidResponse("Missing documents array".into()))?;

            cursor = page
                .last()
                .and_then(|d| d.get("$id"))
                .and_then(Value::as_str)
                .map(str::to_string);
            documents.extend(page.iter().map(decode_document));

            if page.len() < PAGE_SIZE || cursor.is_none() {
                break;
            }
        }

        tracing::debug!(
            "Queried {} {} documents",
            documents.len(),
            collection.as_str()
        );

        Ok(documents)
    }
}

#[async_trait]
impl IdentityProvider for AppwriteClient {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<Identity, AuthError> {
        let payload = json!({
            "userId": "unique()",
            "email": email,
            "password": password,
            "name": display_name,
        });

        let created = self
            .send(
                self.server(self.client.post(format!("{}/users", self.base_url)))
                    .json(&payload),
            )
            .await?;

        let user_id = created.get("$id").and_then(Value::as_str).unwrap_or("?");
        tracing::info!("Created account {}", user_id);

        self.sign_in(email, password).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let url = format!("{}/account/sessions/email", self.base_url);
        let session = self
            .send(
                self.client
                    .post(url)
                    .header("X-Appwrite-Project", &self.project_id)
                    .json(&json!({ "email": email, "password": password })),
            )
            .await?;

        let field = |name: &str| {
            session
                .get(name)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| AuthError::Provider(format!("session response missing {}", name)))
        };

        Ok(Identity {
            user_id: field("userId")?,
            email: email.to_string(),
            session_id: field("$id")?,
        })
    }

    async fn sign_out(&self, identity: &Identity) -> Result<(), AuthError> {
        let url = format!(
            "{}/users/{}/sessions/{}",
            self.base_url,
            urlencoding::encode(&identity.user_id),
            urlencoding::encode(&identity.session_id)
        );

        match self.send(self.server(self.client.delete(url))).await {
            Ok(_) | Err(AppwriteError::NotFound(_)) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl BlobStorage for AppwriteClient {
    /// Store the file under an id derived from `path`. If that id is taken,
    /// the old file is deleted and the upload retried.
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StoreError> {
        let file_id = Self::file_id(path);

        match self.create_file(&file_id, bytes.clone(), content_type).await {
            Ok(_) => {}
            Err(AppwriteError::Conflict(_)) => {
                tracing::debug!("Replacing existing file {}", file_id);
                self.delete_file(&file_id).await?;
                self.create_file(&file_id, bytes, content_type).await?;
            }
            Err(e) => return Err(e.into()),
        }

        tracing::debug!("Uploaded {}", path);
        Ok(path.to_string())
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/buckets/{}/files/{}/view?project={}",
            self.base_url,
            self.bucket_id,
            urlencoding::encode(&Self::file_id(path)),
            urlencoding::encode(&self.project_id)
        )
    }
}
