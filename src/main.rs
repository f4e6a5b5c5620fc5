mod entity;
mod error;
mod handlers;
mod prelude;
mod state;
mod sv;
mod utils;

use std::net::SocketAddr;

use anyhow::Context;
use tower::ServiceBuilder;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{
  cors::{Any, CorsLayer},
  trace::TraceLayer,
};
use tracing_subscriber::{
  EnvFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::{
  prelude::*,
  state::{AppState, Config},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();

  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
      "nova=debug,tower_http=debug,axum=trace,sea_orm=warn".into()
    }))
    .with(tracing_subscriber::fmt::layer())
    .init();

  let config = Config::from_env()?;
  let port = config.port;

  info!("Starting Nova backend v{}", env!("CARGO_PKG_VERSION"));

  let app_state = Arc::new(AppState::new(config).await?);

  let governor_conf = Arc::new(
    GovernorConfigBuilder::default()
      .per_second(2)
      .burst_size(100)
      .finish()
      .context("Failed to build rate limiter config")?,
  );

  let governor_limiter = governor_conf.limiter().clone();
  tokio::spawn(async move {
    loop {
      tokio::time::sleep(Duration::from_secs(60)).await;
      governor_limiter.retain_recent();
    }
  });

  let app = handlers::router(app_state)
    .layer(
      ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(GovernorLayer::new(governor_conf))
        .layer(
          CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        ),
    )
    .into_make_service_with_connect_info::<SocketAddr>();

  let addr = SocketAddr::from(([0, 0, 0, 0], port));
  info!("HTTP server listening on {addr}");

  let listener = tokio::net::TcpListener::bind(addr)
    .await
    .context("Failed to bind")?;
  axum::serve(listener, app).await.context("Server error")?;

  Ok(())
}
