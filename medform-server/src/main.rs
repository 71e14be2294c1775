//! medform-server - role-based medical data management backend
//!
//! User accounts, authentication, posts, and the form assignment and
//! submission workflow, served over HTTP against a SQLite store.

use anyhow::Result;
use clap::Parser;
use medform_common::auth::load_token_config;
use medform_common::config::{database_path, resolve_bind_addr, resolve_data_dir};
use medform_common::db::init::init_database;
use medform_server::{build_router, AppState};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "medform-server", version, about = "medform backend server")]
struct Cli {
    /// Data folder holding the database (overrides MEDFORM_DATA_DIR)
    #[arg(long)]
    data_dir: Option<String>,

    /// Bind address, e.g. 127.0.0.1:5740 (overrides MEDFORM_BIND)
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting medform-server v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();

    let data_dir = resolve_data_dir(cli.data_dir.as_deref());
    std::fs::create_dir_all(&data_dir)?;

    let db_path = database_path(&data_dir);
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path).await?;

    let auth = load_token_config(&pool).await?;
    info!("✓ Loaded token signing configuration");

    let state = AppState::new(pool, auth);
    let app = build_router(state);

    let bind_addr = resolve_bind_addr(cli.bind.as_deref());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("medform-server listening on http://{}", bind_addr);
    info!("Health check: http://{}/health", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
