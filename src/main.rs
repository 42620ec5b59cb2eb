use std::net::SocketAddr;
use std::sync::Arc;

use axum::headers::ContentType;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{middleware, Router, TypedHeader};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod admission;
mod config;
mod error;
mod extractor;
mod pipeline;
mod range;
mod ratelimit;
mod serve;
mod transcoder;
mod util;

pub use error::{Error, Result};

use config::Config;
use extractor::{Extractor, Ytdlp};
use pipeline::Pipeline;
use ratelimit::RateLimiter;
use transcoder::{Ffmpeg, Transcoder};

#[derive(Clone)]
pub struct AppState {
  pub extractor: Arc<dyn Extractor>,
  pub pipeline: Arc<Pipeline>,
  pub limiter: Arc<RateLimiter>,
}

impl AppState {
  pub fn new(
    config: &Config,
    extractor: Arc<dyn Extractor>,
    transcoder: Arc<dyn Transcoder>,
  ) -> Self {
    let pipeline = Pipeline::new(
      &config.temp_dir,
      extractor.clone(),
      transcoder,
      config.job_concurrency,
    );
    let limiter =
      RateLimiter::new(config.rate_limit_window, config.rate_limit_max);

    Self {
      extractor,
      pipeline: Arc::new(pipeline),
      limiter: Arc::new(limiter),
    }
  }
}

pub const INDEX_HTML: &str = include_str!("../html/index.html");

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info")),
    )
    .init();

  let config = Config::from_env();
  tokio::fs::create_dir_all(&config.temp_dir).await?;

  let extractor = Arc::new(Ytdlp::new());
  let transcoder = Arc::new(Ffmpeg::new());

  // fail the boot, not the first request, when a tool is missing
  extractor.preflight().await?;
  transcoder.preflight().await?;

  let state = AppState::new(&config, extractor, transcoder);
  let app = router(state);

  let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
  info!("listening on http://{addr}");

  axum::Server::bind(&addr)
    .serve(app.into_make_service())
    .await?;

  Ok(())
}

pub fn router(state: AppState) -> Router {
  let limited = Router::new()
    .route("/info", post(serve::info))
    .route("/download", get(serve::download))
    .route_layer(middleware::from_fn_with_state(
      state.clone(),
      ratelimit::limit,
    ));

  Router::new()
    .route("/", get(homepage))
    .route("/health", get(health))
    .merge(limited)
    .with_state(state)
}

async fn homepage() -> impl IntoResponse {
  (TypedHeader::<ContentType>(ContentType::html()), INDEX_HTML)
}

async fn health() -> impl IntoResponse {
  "ok".to_owned()
}
