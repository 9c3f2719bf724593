use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use contact_sync::{
    ContactCache, ContactGateway, ContactService, build_router,
    config::{AppConfig, BackendUrl, MutationPolicy},
    gateway::open_store,
    state::AppState,
};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Contact list service. Command line flags override the environment.
#[derive(Debug, Parser)]
#[command(name = "contact_sync", version, about)]
struct Cli {
    /// Interface to listen on (APP_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Contact store connection string, memory:// or file://<path> (MONGO_STRING)
    #[arg(long)]
    database_url: Option<BackendUrl>,

    /// serialized or unserialized (CONTACTS_MUTATION_POLICY)
    #[arg(long)]
    mutation_policy: Option<MutationPolicy>,
}

impl Cli {
    fn apply(self, mut config: AppConfig) -> AppConfig {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(url) = self.database_url {
            config.backend_url = url;
        }
        if let Some(policy) = self.mutation_policy {
            config.mutation_policy = policy;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = cli.apply(AppConfig::from_env().context("failed to load application configuration")?);

    info!(store = %config.backend_url, policy = ?config.mutation_policy, "contact store configured");

    let gateway = ContactGateway::new(open_store(&config.backend_url));
    let service = Arc::new(ContactService::new(
        gateway,
        Arc::new(ContactCache::new()),
        config.mutation_policy,
    ));

    match service.sync().await {
        Ok(count) => info!(contacts = count, "initial sync complete"),
        Err(err) => warn!(error = %err, "failed to sync contacts; starting with an empty mirror"),
    }

    let app = build_router(AppState::new(service));

    let addr = config.address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(address = %addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("contact_sync=debug,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "unable to install Ctrl+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "unable to install SIGTERM handler");
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
}
