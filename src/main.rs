//! bt-timer - switch Bluetooth off after a chosen delay
//!
//! This is the main entry point for the bt-timer daemon.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use bt_timer::{
    api::create_router,
    config::Config,
    error::{AdapterError, ControllerError},
    state::AppState,
    tasks::{notification_task, spawn_adapter_monitor, spawn_timer_service},
    ui::{run_terminal, Controller},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("bt_timer={},tower_http=info", config.log_level()))
        .with_writer(std::io::stderr)
        .init();

    info!("Starting bt-timer v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, adapter={:?}, notifier={:?}",
          config.host, config.port, config.adapter, config.notifier);

    let adapter = config.build_adapter();
    let adapter_state = spawn_adapter_monitor(adapter.clone(), config.poll_period()).await;
    if !adapter_state.borrow().present {
        warn!("No Bluetooth adapter found via {}", adapter.name());
    }

    // Start the countdown service and the notification that mirrors it
    let timer = spawn_timer_service(adapter.clone());
    tokio::spawn(notification_task(
        config.build_notifier(),
        timer.subscribe(),
        timer.watch(),
    ));

    let state = Arc::new(AppState::new(
        timer.clone(),
        adapter.clone(),
        adapter_state.clone(),
        config.port,
        config.host.clone(),
    ));
    let app = create_router(state);

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /timer/start  - Start a countdown {{\"minutes\": 1-999}}");
    info!("  POST /timer/cancel - Cancel the running countdown");
    info!("  GET  /status       - Timer and Bluetooth status");
    info!("  GET  /events       - Server-sent timer events");
    info!("  GET  /health       - Health check");

    let server = axum::serve(listener, app);

    if config.interactive {
        let created = Controller::new(timer.clone(), adapter.clone(), adapter_state).await;
        let controller = match created {
            Ok(controller) => controller,
            Err(ControllerError::Adapter(AdapterError::Unavailable)) => {
                eprintln!("Bluetooth not supported");
                std::process::exit(1);
            }
            Err(e) => return Err(e.into()),
        };
        let has_capability = adapter.has_disable_capability().await;

        tokio::select! {
            result = server => {
                if let Err(e) = result {
                    error!("Server error: {}", e);
                }
            }
            result = run_terminal(controller, has_capability) => {
                if let Err(e) = result {
                    error!("Terminal error: {}", e);
                }
                info!("Terminal closed");
            }
            _ = shutdown_signal() => {
                info!("Shutdown signal received");
            }
        }
    } else {
        if !adapter.has_disable_capability().await {
            warn!("Bluetooth disable capability not granted, expiry will fail");
        }

        tokio::select! {
            result = server => {
                if let Err(e) = result {
                    error!("Server error: {}", e);
                }
            }
            _ = shutdown_signal() => {
                info!("Shutdown signal received");
            }
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
