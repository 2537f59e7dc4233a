/// Media Gateway - HTTP server
///
/// Serves the `/view/...` download surface through the download middleware;
/// every other path falls through to the inner application (health
/// endpoints here).
use actix_web::{middleware as actix_middleware, web, App, HttpResponse, HttpServer};
use media_gateway::cache::FileStore;
use media_gateway::handlers::AppState;
use media_gateway::middleware::DownloadMiddleware;
use media_gateway::services::thumbnail::Thumbnailer;
use media_gateway::services::vhost::VHostResolver;
use media_gateway::services::S3Storage;
use media_gateway::Config;
use std::io;
use std::sync::Arc;
use std::time::Duration;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("Invalid configuration: {e}")))?;

    let bind_address = format!("{}:{}", config.app.host, config.app.port);

    if config.tenants.is_empty() {
        tracing::warn!("GATEWAY_VHOSTS is empty; every request will resolve to 404");
    }

    let cache = FileStore::new(&config.cache.dir).map_err(|e| {
        io::Error::new(
            io::ErrorKind::Other,
            format!("Failed to initialize cache store: {e}"),
        )
    })?;

    let storage = S3Storage::from_config(&config.storage).await;

    let state = Arc::new(AppState {
        vhosts: VHostResolver::new(config.tenants.clone()),
        cache: Arc::new(cache),
        storage: Arc::new(storage),
        thumbnailer: Arc::new(Thumbnailer::new(config.render.clone())),
        remote_timeout: Duration::from_secs(config.storage.fetch_timeout_secs),
    });

    tracing::info!(
        bind = %bind_address,
        tenants = state.vhosts.len(),
        cache_dir = %config.cache.dir.display(),
        "media-gateway starting"
    );

    HttpServer::new(move || {
        App::new()
            .wrap(actix_middleware::Logger::default())
            .wrap(DownloadMiddleware::new(state.clone()))
            .route(
                "/api/v1/health",
                web::get()
                    .to(|| async { HttpResponse::Ok().json(serde_json::json!({"status": "ok"})) }),
            )
            .route(
                "/api/v1/health/ready",
                web::get().to(|| async { HttpResponse::Ok().finish() }),
            )
            .route(
                "/api/v1/health/live",
                web::get().to(|| async { HttpResponse::Ok().finish() }),
            )
    })
    .bind(&bind_address)?
    .run()
    .await
}
