//! kubedash - dashboard API server for cluster backups, policies and rules

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use kube::Client;
use tracing::info;

use kubedash_api::auth::{KubeMembershipProvider, KubeUserProvider};
use kubedash_api::provider::KubeClusterOwnership;
use kubedash_api::store::{KubeClusterClients, KubeStore};
use kubedash_api::{
    start_server, AppState, Authorizer, KubeSettingsProvider, OidcConfig, OidcVerifier,
    ProviderResolver, ServerConfig, TlsConfig,
};
use kubedash_common::telemetry::{init_logging, LogFormat};

/// kubedash - HTTP API for the cluster management dashboard
#[derive(Parser, Debug)]
#[command(name = "kubedash", version, about, long_about = None)]
struct Config {
    /// Address to listen on
    #[arg(long, env = "KUBEDASH_LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    listen_addr: SocketAddr,

    /// PEM certificate chain; enables HTTPS together with --tls-key
    #[arg(long, env = "KUBEDASH_TLS_CERT", requires = "tls_key")]
    tls_cert: Option<PathBuf>,

    /// PEM private key for --tls-cert
    #[arg(long, env = "KUBEDASH_TLS_KEY", requires = "tls_cert")]
    tls_key: Option<PathBuf>,

    /// OIDC issuer URL
    #[arg(long, env = "KUBEDASH_OIDC_ISSUER")]
    oidc_issuer: String,

    /// OIDC client id, always accepted as audience
    #[arg(long, env = "KUBEDASH_OIDC_CLIENT_ID")]
    oidc_client_id: String,

    /// Additional accepted token audiences
    #[arg(long, env = "KUBEDASH_OIDC_AUDIENCES", value_delimiter = ',')]
    oidc_audiences: Vec<String>,

    /// Seconds between JWKS refreshes
    #[arg(long, env = "KUBEDASH_JWKS_REFRESH_SECS", default_value_t = 300)]
    jwks_refresh_secs: u64,

    /// Log output: json or text
    #[arg(long, env = "KUBEDASH_LOG_FORMAT", default_value = "json")]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = rustls::crypto::aws_lc_rs::default_provider().install_default() {
        eprintln!("CRITICAL: Failed to install crypto provider: {:?}", e);
        std::process::exit(1);
    }

    let config = Config::parse();
    init_logging(config.log_format)?;

    let client = Client::try_default()
        .await
        .context("failed to create Kubernetes client")?;

    let verifier = OidcVerifier::new(OidcConfig {
        issuer_url: config.oidc_issuer.clone(),
        client_id: config.oidc_client_id.clone(),
        audiences: config.oidc_audiences.clone(),
        jwks_refresh_interval: Duration::from_secs(config.jwks_refresh_secs),
    })
    .context("failed to configure OIDC verifier")?;

    let authorizer = Authorizer::new(
        Arc::new(verifier),
        Arc::new(KubeUserProvider::new(client.clone())),
        Arc::new(KubeMembershipProvider::new(client.clone())),
    );
    let store = KubeStore::new(Arc::new(KubeClusterClients::new(client.clone())));
    let providers = ProviderResolver::new(
        Arc::new(store),
        Arc::new(KubeClusterOwnership::new(client.clone())),
    );

    let state = AppState {
        authorizer: Arc::new(authorizer),
        providers: Arc::new(providers),
        settings: Arc::new(KubeSettingsProvider::new(client)),
    };

    let tls = match (config.tls_cert, config.tls_key) {
        (Some(cert_path), Some(key_path)) => Some(TlsConfig {
            cert_path,
            key_path,
        }),
        _ => None,
    };

    info!(
        issuer = %config.oidc_issuer,
        tls = tls.is_some(),
        "Configured dashboard API"
    );

    start_server(
        ServerConfig {
            addr: config.listen_addr,
            tls,
        },
        state,
    )
    .await?;

    Ok(())
}
