//! Dashboard API server

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::Authorizer;
use crate::error::Error;
use crate::handlers::{
    backup, policy_binding, restore, rule_group, schedule, storage_location,
};
use crate::provider::ProviderResolver;
use crate::settings::SettingsProvider;

/// TLS certificate and key files
#[derive(Debug, Clone)]
pub struct TlsConfig {
    /// PEM certificate chain
    pub cert_path: PathBuf,
    /// PEM private key
    pub key_path: PathBuf,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server
    pub addr: SocketAddr,
    /// Serve HTTPS with these files; plain HTTP when absent
    pub tls: Option<TlsConfig>,
}

/// Shared state for handlers
#[derive(Clone)]
pub struct AppState {
    /// Caller authentication and project access decisions
    pub authorizer: Arc<Authorizer>,
    /// Accessor construction per access verdict
    pub providers: Arc<ProviderResolver>,
    /// Global settings for feature gates
    pub settings: Arc<dyn SettingsProvider>,
}

/// Router with every dashboard route
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/projects/{project}/clusters/{cluster}/backups",
            get(backup::list_backups).post(backup::create_backup),
        )
        .route(
            "/projects/{project}/clusters/{cluster}/backups/{name}",
            get(backup::get_backup).delete(backup::delete_backup),
        )
        .route(
            "/projects/{project}/clusters/{cluster}/restores",
            get(restore::list_restores).post(restore::create_restore),
        )
        .route(
            "/projects/{project}/clusters/{cluster}/restores/{name}",
            get(restore::get_restore).delete(restore::delete_restore),
        )
        .route(
            "/projects/{project}/clusters/{cluster}/backupschedules",
            get(schedule::list_schedules).post(schedule::create_schedule),
        )
        .route(
            "/projects/{project}/clusters/{cluster}/backupschedules/{name}",
            get(schedule::get_schedule)
                .patch(schedule::patch_schedule)
                .delete(schedule::delete_schedule),
        )
        .route(
            "/projects/{project}/backupstoragelocations",
            get(storage_location::list_storage_locations)
                .post(storage_location::create_storage_location),
        )
        .route(
            "/projects/{project}/backupstoragelocations/{name}",
            get(storage_location::get_storage_location)
                .patch(storage_location::patch_storage_location)
                .delete(storage_location::delete_storage_location),
        )
        .route(
            "/projects/{project}/clusters/{cluster}/policybindings",
            get(policy_binding::list_policy_bindings).post(policy_binding::create_policy_binding),
        )
        .route(
            "/projects/{project}/clusters/{cluster}/policybindings/{name}",
            get(policy_binding::get_policy_binding)
                .patch(policy_binding::patch_policy_binding)
                .delete(policy_binding::delete_policy_binding),
        )
        .route(
            "/projects/{project}/clusters/{cluster}/rulegroups",
            get(rule_group::list_rule_groups).post(rule_group::create_rule_group),
        )
        .route(
            "/projects/{project}/clusters/{cluster}/rulegroups/{name}",
            get(rule_group::get_rule_group)
                .put(rule_group::replace_rule_group)
                .delete(rule_group::delete_rule_group),
        );

    Router::new()
        .nest("/api/v2", api)
        .route("/healthz", get(|| async { "ok" }))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the dashboard API until the process is stopped
pub async fn start_server(config: ServerConfig, state: AppState) -> Result<(), Error> {
    let app = router(state);

    match config.tls {
        Some(tls) => {
            let tls_config = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path)
                .await
                .map_err(|e| Error::Internal(format!("TLS config error: {}", e)))?;

            info!(addr = %config.addr, "Starting dashboard API server (TLS)");
            axum_server::bind_rustls(config.addr, tls_config)
                .serve(app.into_make_service())
                .await
                .map_err(|e| Error::Internal(format!("server error: {}", e)))
        }
        None => {
            let listener = tokio::net::TcpListener::bind(config.addr)
                .await
                .map_err(|e| Error::Internal(format!("failed to bind {}: {}", config.addr, e)))?;

            info!(addr = %config.addr, "Starting dashboard API server");
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await
                .map_err(|e| Error::Internal(format!("server error: {}", e)))
        }
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
