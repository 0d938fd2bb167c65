use keyjournal::auth::TokenStore;
use keyjournal::config::Config;
use keyjournal::db::JournalStore;
use keyjournal::router::{JournalState, journal_router};
use keyjournal::service::AuditLog;
use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::from_env()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        data_dir = %cfg.data_dir.display(),
        log_dir = %cfg.log_dir.display(),
        static_dir = %cfg.static_dir.display(),
        loglevel = %cfg.loglevel,
        secure_cookie = cfg.secure_cookie
    );

    let tokens = TokenStore::load();
    if tokens.is_empty() {
        warn!("no auth tokens configured; every endpoint is open");
    }

    tokio::fs::create_dir_all(&cfg.data_dir).await?;
    let store = JournalStore::open(&cfg.database_path()).await?;
    let audit = AuditLog::open(cfg.audit_log_path()).await?;

    let state = JournalState::new(store, audit, tokens, cfg.secure_cookie, cfg.index_path());
    let app = journal_router(state);

    let listener = TcpListener::bind(cfg.listen_addr.as_str()).await?;
    info!("HTTP server listening on {}", cfg.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
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
    info!("shutdown signal received");
}
