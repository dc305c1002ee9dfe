//! Studio web server binary.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use studio_api::{AppState, config::ApiConfig};
use studio_core::mail::{LogMailer, MailQueue};
use studio_core::store::{MemoryStore, PgStore};
use tracing::{info, warn};

/// CLI arguments for the studio server. Anything not given here is read
/// from the environment (see `ApiConfig::from_env`).
#[derive(Parser, Debug)]
#[command(name = "studio_server", about = "Dance studio web server")]
struct Args {
    /// Address to listen on. Overrides `BIND_ADDR`.
    #[arg(long)]
    bind: Option<String>,

    /// PostgreSQL connection URL.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://localhost:5432/studio"
    )]
    database_url: String,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,

    /// Keep all data in process memory instead of PostgreSQL.
    #[arg(long, default_value_t = false)]
    in_memory: bool,

    /// Seconds between sweeps of expired sessions.
    #[arg(long, default_value_t = 3600)]
    purge_interval_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("info,studio_api=debug,studio_core=debug")
            }),
        )
        .init();

    let args = Args::parse();

    let mut config = ApiConfig::from_env();
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    config.pg_connection_url = args.database_url;

    let (mail, mail_worker) = MailQueue::spawn(Arc::new(LogMailer::new(config.mail_sender.clone())));

    let state = if args.in_memory {
        warn!("in-memory storage: nothing survives a restart");
        AppState::new(config.clone(), Arc::new(MemoryStore::new()), mail)
    } else {
        info!(
            max_connections = args.max_connections,
            "configuring connection pool"
        );
        let pool = PgPoolOptions::new()
            .max_connections(args.max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&config.pg_connection_url)
            .await?;

        info!("running database migrations");
        studio_api::migrate(&pool).await?;

        AppState::new(config.clone(), Arc::new(PgStore::new(pool)), mail)
    };

    let purge = tokio::spawn({
        let sessions = state.sessions.clone();
        let period = Duration::from_secs(args.purge_interval_secs.max(1));
        async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                match sessions.purge_expired().await {
                    Ok(0) => {}
                    Ok(n) => info!(removed = n, "purged expired sessions"),
                    Err(e) => warn!("session purge failed: {e}"),
                }
            }
        }
    });

    let app = studio_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    let local_addr = listener.local_addr()?;
    info!(
        addr = %local_addr,
        public_url = %config.public_url,
        version = studio_core::version(),
        "studio listening"
    );

    let result = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for ctrl-c: {e}");
        }
        info!("shutting down");
    })
    .await;

    purge.abort();
    // Router (and with it the last MailQueue sender) is gone; let the worker
    // drain what is left.
    match tokio::time::timeout(Duration::from_secs(5), mail_worker).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("mail worker ended abnormally: {e}"),
        Err(_) => warn!("mail worker did not drain in time"),
    }

    result?;
    Ok(())
}
