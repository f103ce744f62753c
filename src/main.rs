#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

use agro_user_service::adapters::Store;
use agro_user_service::api::{self, MgmtState, ServiceContainer};
use agro_user_service::config::Config;
use agro_user_service::{AppBuilder, telemetry};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::Instrument;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load();
    let telemetry_guard = telemetry::init_telemetry(&config.telemetry)?;

    agro_user_service::setup_panic_hook();

    let boot_span = tracing::info_span!("boot_server", store = config.store.kind.as_str());
    let (rpc_listener, mgmt_listener, services, mgmt_app, store, shutdown_tx, shutdown_rx) = async {
        // Phase 1: Infrastructure Setup (Resources)
        let store = Store::connect(&config).await?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        agro_user_service::spawn_signal_handler(shutdown_tx.clone());

        // Phase 2: Component Wiring (Pure logic, no side effects)
        let app = AppBuilder::new(config.clone()).with_store(store.clone()).build()?;

        // Phase 3: Runtime Setup (Listeners and Routers)
        let mgmt_app = api::mgmt_router(MgmtState { health_service: app.health_service });

        let rpc_addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
        let mgmt_addr: SocketAddr = format!("{}:{}", config.server.host, config.server.mgmt_port).parse()?;

        let rpc_listener = TcpListener::bind(rpc_addr).await?;
        let mgmt_listener = TcpListener::bind(mgmt_addr).await?;

        tracing::info!(address = %rpc_addr, "gRPC server listening");
        tracing::info!(address = %mgmt_addr, "management server listening");

        Ok::<
            (
                TcpListener,
                TcpListener,
                ServiceContainer,
                axum::Router,
                Store,
                watch::Sender<bool>,
                watch::Receiver<bool>,
            ),
            anyhow::Error,
        >((rpc_listener, mgmt_listener, app.services, mgmt_app, store, shutdown_tx, shutdown_rx))
    }
    .instrument(boot_span)
    .await?;

    // Phase 4: Start Runtime
    let rpc_server = async {
        api::serve_rpc(rpc_listener, services, shutdown_rx.clone()).await.map_err(anyhow::Error::from)
    };

    let mut mgmt_rx = shutdown_rx.clone();
    let mgmt_server = async move {
        axum::serve(mgmt_listener, mgmt_app)
            .with_graceful_shutdown(async move {
                let _ = mgmt_rx.wait_for(|&s| s).await;
            })
            .await
            .map_err(anyhow::Error::from)
    };

    if let Err(e) = tokio::try_join!(rpc_server, mgmt_server) {
        tracing::error!(error = %e, "Server error");
    }

    // Phase 5: Graceful Shutdown Orchestration
    let _ = shutdown_tx.send(true);
    tokio::select! {
        () = store.close() => {}
        () = tokio::time::sleep(Duration::from_secs(config.server.shutdown_timeout_secs)) => {
            tracing::warn!("Timeout waiting for store connections to close.");
        }
    }

    telemetry_guard.shutdown();
    Ok(())
}
