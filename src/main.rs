use anyhow::Result;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};
use dotenvy::dotenv;

use coldchain_dispatch::config::environment::EnvironmentConfig;
use coldchain_dispatch::services::worker::spawn_workers;
use coldchain_dispatch::{build_router, build_state};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("🧊 Cold-Chain Dispatch Planner - Backend VRPTW");
    info!("================================================");

    let config = EnvironmentConfig::default();
    let (state, queue_rx) = build_state(config.clone());

    // Pool de workers para el solver
    spawn_workers(state.clone(), queue_rx);
    info!("👷 Pool de {} workers iniciado", config.worker_count);

    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("📋 Planificación:");
    info!("   POST /api/planning - Crear trabajo de planificación");
    info!("   GET  /api/planning - Listar trabajos");
    info!("   GET  /api/planning/:job_id - Estado del trabajo");
    info!("   GET  /api/planning/:job_id/violations - Reporte de violaciones");
    info!("   POST /api/planning/:job_id/cancel - Cancelar trabajo");
    info!("   GET  /api/planning/map-data - Datos para el mapa");
    info!("🚗 Flota:");
    info!("   POST /api/vehicles - Registrar vehículo");
    info!("   GET  /api/vehicles - Listar vehículos");
    info!("   GET  /api/vehicles/:id - Obtener vehículo");
    info!("📦 Envíos:");
    info!("   POST /api/shipments - Registrar envío");
    info!("   GET  /api/shipments - Listar envíos");
    info!("   GET  /api/shipments/:id - Obtener envío");
    info!("🗺️ Rutas:");
    info!("   GET  /api/routes/:id - Obtener ruta con paradas");
    info!("   PATCH /api/routes/:id/status - Actualizar estado (lock optimista)");
    info!("🏭 Depósitos:");
    info!("   POST /api/depots - Registrar depósito");
    info!("   GET  /api/depots - Listar depósitos");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Error del servidor: {}", e);
        return Err(e.into());
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
