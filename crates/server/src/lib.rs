pub mod errors;
pub mod gateway;
pub mod models;
pub mod rag;
pub mod routes;

pub use routes::create_app;

/// Installs the `tracing` fmt subscriber; `RUST_LOG` wins over the default
/// `info` level.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
