use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use spar_match::config::{LoggingSettings, Settings, StoreBackend};
use spar_match::core::{MatchIds, MatchLifecycle, SessionManager, SwipeEngine};
use spar_match::routes::{self, AppState};
use spar_match::services::{
    AppwriteClient, AppwriteCollections, BlobStorage, CacheManager, DocumentStore,
    IdentityProvider, MemoryBlobs, MemoryIdentity, MemoryStore,
};
use std::io;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

type Backends = (
    Arc<dyn DocumentStore>,
    Arc<dyn IdentityProvider>,
    Arc<dyn BlobStorage>,
);

fn init_logging(logging: &LoggingSettings) {
    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| logging.level.clone());
    let format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| logging.format.clone());
    let filter = EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

fn build_backends(settings: &Settings) -> io::Result<Backends> {
    match settings.store.backend {
        StoreBackend::Memory => {
            warn!("Using the in-memory backend; nothing survives a restart");
            let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
            let identity: Arc<dyn IdentityProvider> = Arc::new(MemoryIdentity::new());
            let blobs: Arc<dyn BlobStorage> = Arc::new(MemoryBlobs::new());
            Ok((store, identity, blobs))
        }
        StoreBackend::Appwrite => {
            let appwrite = settings.appwrite.clone().ok_or_else(|| {
                io::Error::new(io::ErrorKind::Other, "missing [appwrite] configuration")
            })?;

            let collections = AppwriteCollections {
                users: settings.collection.users.clone(),
                swipes: settings.collection.swipes.clone(),
                matches: settings.collection.matches.clone(),
            };

            let client = Arc::new(
                AppwriteClient::new(
                    appwrite.endpoint,
                    appwrite.api_key,
                    appwrite.project_id,
                    appwrite.database_id,
                    appwrite.bucket_id,
                    collections,
                )
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?,
            );

            info!("Appwrite client initialized");
            let store: Arc<dyn DocumentStore> = client.clone();
            let identity: Arc<dyn IdentityProvider> = client.clone();
            let blobs: Arc<dyn BlobStorage> = client;
            Ok((store, identity, blobs))
        }
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load();
    init_logging(
        &settings
            .as_ref()
            .map(|s| s.logging.clone())
            .unwrap_or_default(),
    );

    info!("Starting Spar Match service...");

    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(io::Error::new(io::ErrorKind::Other, e.to_string()));
        }
    };

    info!("Configuration loaded successfully");

    let (store, identity, blobs) = build_backends(&settings)?;

    let sessions = Arc::new(SessionManager::new(
        identity,
        store.clone(),
        blobs,
        &settings.session.jwt_secret,
        settings.session.ttl_secs,
        settings.session.max_sessions,
    ));

    let match_ids = if settings.matching.unique_pair_ids {
        MatchIds::PairUnique
    } else {
        MatchIds::Random
    };
    info!("Match ids: {:?}", match_ids);

    let app_state = AppState {
        sessions,
        swipes: Arc::new(SwipeEngine::new(store.clone(), match_ids)),
        matches: Arc::new(MatchLifecycle::new(store)),
        decks: CacheManager::new(settings.session.max_sessions, settings.session.ttl_secs),
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(routes::handle_json_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
