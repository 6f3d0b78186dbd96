// Service exports
pub mod appwrite;
pub mod cache;
pub mod identity;
pub mod memory;
pub mod store;

pub use appwrite::{AppwriteClient, AppwriteCollections, AppwriteError};
pub use cache::{CacheKey, CacheManager};
pub use identity::{AuthError, BlobStorage, Identity, IdentityProvider};
pub use memory::{MemoryBlobs, MemoryIdentity, MemoryStore};
pub use store::{Collection, DocumentStore, Filter, StoreError};
