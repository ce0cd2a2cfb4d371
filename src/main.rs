use log::{info, warn};
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use warp::Filter;

use property_dashboard::config::MetricsConfig;
use property_dashboard::routes;
use property_dashboard::services::prefs::PrefsStore;
use property_dashboard::services::store::DataStore;
use property_dashboard::AppState;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();
    info!("Logger initialized. Starting the property dashboard backend...");

    let port_str = env::var("PORT").unwrap_or_else(|_| {
        warn!("$PORT not set, defaulting to 3030");
        "3030".to_string()
    });
    let port: u16 = port_str.parse().expect("PORT must be a number");
    info!("Using PORT: {}", port);

    let store = DataStore::from_env()
        .expect("SUPABASE_URL and SUPABASE_ANON_KEY must be set");
    let prefs_dir = env::var("PREFS_DIR").unwrap_or_else(|_| "./prefs".to_string());
    let prefs = PrefsStore::new(&prefs_dir)
        .unwrap_or_else(|e| panic!("Failed to open preferences directory {}: {}", prefs_dir, e));

    let state = Arc::new(AppState {
        store,
        prefs,
        config: MetricsConfig::default(),
    });

    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    info!("Will bind to: {}", addr);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_header("content-type")
        .allow_methods(vec!["GET", "POST", "PUT"]);

    let api = routes::routes(state).with(cors);
    info!("Routes configured successfully with CORS.");

    info!("Starting server on {}", addr);
    warp::serve(api).run(addr).await;
}
