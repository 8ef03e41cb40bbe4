// src/main.rs
use anyhow::{Context, Result};
use ping_tray::{
    config,
    health::{HttpProber, ProbeOutcome},
    reflector::{Fanout, StatusBoard, StatusReflector, WatchSink},
    tray::{popup_menu, stdin_commands, ConsoleRenderer, Tray, TrayExit},
};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing; stdout belongs to the console tray
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ping_tray=debug".parse()?)
                .add_directive("hyper=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.yaml".to_string());

    info!("Loading configuration from: {}", config_path);
    let config = config::load_config(&config_path)
        .await
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;

    let prober = HttpProber::new(config.endpoint.clone(), &config.polling)
        .context("Failed to create health prober")?;

    // The board keeps the latest snapshot, the watch channel feeds the tray
    let board = Arc::new(StatusBoard::new());
    let (tray_sink, status_rx) = WatchSink::channel(ProbeOutcome::Down);
    let sink = Fanout::new().with(board.clone()).with(Arc::new(tray_sink));

    info!(endpoint = %prober.endpoint(), "Polling health endpoint");
    let handle = StatusReflector::new(Arc::new(prober), Arc::new(sink), config.polling.interval()).start();

    let mut renderer = ConsoleRenderer::stdout();
    renderer
        .show_menu(&popup_menu())
        .context("Failed to draw tray menu")?;
    let mut tray = Tray::new(config.tray.clone(), renderer);
    let commands = stdin_commands(16).context("Failed to start command input")?;

    let exit = tokio::select! {
        exit = tray.run(status_rx, commands) => exit.context("Tray UI failed")?,
        _ = shutdown_signal() => TrayExit::ExitRequested,
    };
    info!(?exit, "Tray closed");

    let ticks = handle.stop().await.context("Status reflector task failed")?;
    match board.latest() {
        Some(last) => info!(
            ticks,
            last = %last.outcome,
            checked_at = %last.checked_at,
            "Shut down"
        ),
        None => info!("Shut down before the first probe completed"),
    }

    Ok(())
}

// Graceful shutdown handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
