use std::sync::Arc;

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use slidepilot::config::Settings;
use slidepilot::llm::ChatService;
use slidepilot::routes::{self, AppState};

#[tokio::main]
async fn main() {
    // Load .env.local → .env from the project root, first match wins.
    let manifest_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    'env_load: for env_file in [".env.local", ".env"] {
        let path = manifest_dir.join(env_file);
        if path.exists() {
            match dotenvy::from_path(&path) {
                Ok(_) => eprintln!("[STARTUP] Loaded {}", path.display()),
                Err(e) => eprintln!("[STARTUP] Failed to load {}: {}", path.display(), e),
            }
            break 'env_load;
        }
    }

    env_logger::init();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("[STARTUP] {}", e);
            std::process::exit(1);
        }
    };
    let port = settings.port;

    let chat = ChatService::new(&settings);
    let state = Arc::new(AppState { settings, chat });

    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "https://localhost:3000",
        "http://127.0.0.1:3000",
        "https://127.0.0.1:3000",
    ]
    .iter()
    .filter_map(|origin| origin.parse().ok())
    .collect();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(routes::root))
        .route("/upload", post(routes::upload_presentation))
        .route("/process", post(routes::process_user_prompt))
        .layer(cors)
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    log::info!("[STARTUP] Listening on {}", addr);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            log::error!("[STARTUP] Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        log::error!("[STARTUP] Server error: {}", e);
        std::process::exit(1);
    }
}
