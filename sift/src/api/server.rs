use crate::api::routes::{self, AppState};
use crate::config::CorsConfig;
use crate::Result;
use axum::http::{HeaderValue, Method};
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub struct ApiServer {
    state: AppState,
    cors_config: CorsConfig,
}

impl ApiServer {
    pub fn new(state: AppState, cors_config: CorsConfig) -> Self {
        Self { state, cors_config }
    }

    fn build_cors_layer(&self) -> CorsLayer {
        if !self.cors_config.enabled {
            return CorsLayer::new();
        }

        let origins: Vec<HeaderValue> = self
            .cors_config
            .origins
            .iter()
            .filter_map(|o| if o == "*" { None } else { o.parse().ok() })
            .collect();
        let has_wildcard = self.cors_config.origins.iter().any(|o| o == "*");

        let cors = if has_wildcard {
            CorsLayer::new().allow_origin(tower_http::cors::Any)
        } else if origins.is_empty() {
            CorsLayer::new()
        } else {
            CorsLayer::new().allow_origin(origins)
        };

        cors.allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers(tower_http::cors::Any)
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(routes::identity))
            .route("/create/:app_id", post(routes::create).put(routes::create))
            .route("/status/:app_id", get(routes::status))
            .route("/update/:app_id", post(routes::update).put(routes::update))
            .route("/:app_id", delete(routes::delete))
            .route("/search/:app_id", get(routes::search))
            .route("/search/:app_id/:app_type", get(routes::search_typed))
            .route("/stat/:app_id", get(routes::stat))
            .route("/stat/:app_id/:app_type", get(routes::stat))
            .route("/denoise/:app_id", get(routes::denoise))
            .route("/stout", get(routes::stout))
            .fallback(routes::fallback)
            .layer(self.build_cors_layer())
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    pub async fn serve(self, addr: &str) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("listening on {}", addr);
        axum::serve(listener, self.router())
            .await
            .map_err(|e| crate::Error::Internal(e.to_string()))?;
        Ok(())
    }
}
