use anyhow::Result;
use axum::Router;
use clap::Parser;
use ordering_core::{Config, PointerOrder};
use ordering_server::remote::{DEFAULT_PREVIEW_PATH, DEFAULT_SEARCH_PATH};
use ordering_server::{build_app, Settings};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "ordering-server")]
#[command(about = "Serve a search-ordering editing session over HTTP")]
struct Args {
    /// JSON bootstrap payload: pointers, posts and title
    #[arg(long)]
    bootstrap: Option<PathBuf>,
    /// Where POST /save writes the pointer list
    #[arg(long)]
    save_to: Option<PathBuf>,
    /// Root URL of the site's REST API
    #[arg(long, default_value = "http://localhost/wp-json")]
    remote: String,
    #[arg(long, default_value = DEFAULT_PREVIEW_PATH)]
    preview_path: String,
    #[arg(long, default_value = DEFAULT_SEARCH_PATH)]
    search_path: String,
    /// Host to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// Quiet period before title/search edits hit the remote
    #[arg(long, default_value_t = ordering_core::config::DEFAULT_DEBOUNCE_MS)]
    debounce_ms: u64,
    /// Order pointers are applied in: stored or position
    #[arg(long, default_value = "stored")]
    pointer_order: PointerOrder,
    /// Remote request timeout seconds
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,
    #[arg(long, default_value = "search-ordering/0.1")]
    user_agent: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let settings = Settings {
        bootstrap: args.bootstrap,
        save_to: args.save_to,
        remote: args.remote,
        preview_path: args.preview_path,
        search_path: args.search_path,
        timeout: Duration::from_secs(args.timeout_secs),
        user_agent: args.user_agent,
        config: Config { debounce: Duration::from_millis(args.debounce_ms), pointer_order: args.pointer_order },
    };
    let app: Router = build_app(settings)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
