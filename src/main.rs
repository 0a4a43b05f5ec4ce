use std::env;
use std::sync::Arc;

use agency_service::domain::ports::ListCache;
use agency_service::infrastructure::cache::{NoopListCache, RedisListCache};
use agency_service::{build_server, create_pool, run_migrations};
use dotenvy::dotenv;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .expect("PORT must be a valid number");

    let pool = create_pool(&database_url);
    run_migrations(&pool);

    let cache: Arc<dyn ListCache> = match env::var("REDIS_URL") {
        Ok(url) => match RedisListCache::connect(&url) {
            Ok(cache) => {
                log::info!("List cache enabled");
                Arc::new(cache)
            }
            Err(e) => {
                log::warn!("Invalid REDIS_URL, running without list cache: {e}");
                Arc::new(NoopListCache)
            }
        },
        Err(_) => {
            log::info!("REDIS_URL not set, running without list cache");
            Arc::new(NoopListCache)
        }
    };

    log::info!("Starting server at http://{}:{}", host, port);

    build_server(pool, cache, &host, port)?.await
}
