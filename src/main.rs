use std::net::SocketAddr;
use std::path::PathBuf;

use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mcp_config_manager::{config, routes, state::AppState};

const UI_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/ui");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logging (stdout + tägliche Datei-Rotation unter ./logs)
    std::fs::create_dir_all("logs").ok();
    let (stdout_nb, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());
    let file_appender = tracing_appender::rolling::daily("logs", "mcp-config-manager.log");
    let (file_nb, file_guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(stdout_nb))
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(file_nb))
        .init();
    // Guards am Leben halten, damit die Non-Blocking Writer korrekt flushen
    let _log_guards = (stdout_guard, file_guard);

    // Load configuration (embedded defaults -> mcp-config-manager.toml -> env/.env)
    let app_cfg = config::load()?;

    let state = AppState::new(app_cfg.clone())?;
    info!(
        "Editing {} ({}, {} presets loaded)",
        state.store.path().display(),
        if state.store.exists() { "exists" } else { "will be created on first save" },
        state.presets.len()
    );

    // Statische Web-UI mit SPA-Fallback: <exe_dir>/ui bevorzugt, sonst Build-Zeit-Pfad
    let ui_root = {
        let runtime_ui = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|d| d.join("ui")))
            .unwrap_or_else(|| PathBuf::from("ui"));
        if runtime_ui.join("index.html").is_file() {
            runtime_ui
        } else {
            PathBuf::from(UI_DIR)
        }
    };
    let static_ui_service = ServeDir::new(&ui_root)
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new(ui_root.join("index.html")));

    let cfg_arc = state.config.clone();
    let app = routes::api_router(state).fallback_service(static_ui_service);
    let app = routes::with_middleware(app, cfg_arc)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http());

    // CORS: nur in Debug permissiv (UI-Entwicklung auf anderem Port), in Release same-origin
    let app = if cfg!(debug_assertions) { app.layer(CorsLayer::permissive()) } else { app };

    let port: u16 = app_cfg.server.port;
    let host: String = app_cfg.server.host.clone();
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid listen addr {}:{} - {}", host, port, e))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("MCP Config Manager listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    info!("Shutdown signal received. Stopping server...");
}
