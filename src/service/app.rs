use crate::api::{self, AppState};
use crate::config::Settings;
use crate::infrastructure::Database;
use crate::Result;
use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, instrument, warn};

/// Main application struct that coordinates all components
///
/// Owns the settings and the database handle from process start to stop.
pub struct App {
    settings: Settings,
    database: Database,
}

impl App {
    #[instrument(skip(settings))]
    pub async fn new(settings: Settings) -> Result<Self> {
        info!(url = %settings.database.url, "Connecting to database");
        let database = Database::connect(&settings.database).await?;

        Ok(Self { settings, database })
    }

    pub fn router(&self) -> Router {
        api::router(AppState::new(self.database.clone()), &self.settings)
    }

    #[instrument(skip(self))]
    pub async fn run(self) -> Result<()> {
        let address = self.settings.bind_address();
        let listener = TcpListener::bind(&address).await?;
        info!(%address, "Starting shutdown manager server");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        self.database.close().await;
        info!("Server stopped");
        Ok(())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn database(&self) -> &Database {
        &self.database
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutdown signal received");
}
