//! TableTalk service entrypoint.
//! Boots the Axum HTTP server with shared state, metrics and CORS.

use std::sync::Arc;

use shuttle_axum::ShuttleAxum;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tabletalk::config::AppConfig;
use tabletalk::metrics::Metrics;
use tabletalk::store::InMemoryStore;
use tabletalk::{router, AppState, SystemClock};

/// Compact logs by default; `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tabletalk=info,warn"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    // try_init: the runtime may already have installed a subscriber
    let res = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
    if res.is_err() {
        eprintln!("tracing subscriber already set; keeping existing one");
    }
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = AppConfig::load()?;
    let metrics_enabled = config.metrics.enabled;
    info!(frontend_url = %config.frontend_url, "configuration loaded");

    let state = AppState::new(config, Arc::new(InMemoryStore::new()), Arc::new(SystemClock));
    let mut app = router(state);

    if metrics_enabled {
        match Metrics::init() {
            Ok(m) => app = app.merge(m.router()),
            Err(e) => warn!(error = ?e, "metrics disabled"),
        }
    }

    Ok(app.into())
}
