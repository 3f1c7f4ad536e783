//! Paper-cut template generator: configuration, tracing setup and the
//! command pipelines behind the `papercut` binary.

pub mod config;
pub mod error;
pub mod pipeline;

use tracing_subscriber::EnvFilter;

/// Log filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "papercut=info,papercut_lib=info,cutline_engine=info,paper_palette=info";

/// Install the fmt subscriber, honouring `RUST_LOG`.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Load `.env` from the current directory or up to two parents.
///
/// Returns the file that was loaded, if any.
pub fn load_dotenv() -> Option<&'static str> {
    let candidates = [".env", "../.env", "../../.env"];
    for path in candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return Some(path);
        }
    }
    tracing::debug!("No .env file found, using system environment variables");
    None
}
