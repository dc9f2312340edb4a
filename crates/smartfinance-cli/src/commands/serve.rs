//! Server command implementation

use std::path::Path;

use anyhow::Result;
use smartfinance_core::ChatBackend;
use smartfinance_server::{ServerConfig, DEFAULT_PORT};

use super::{build_pipeline, load_settings, load_store};

/// Port from the flag, then `$PORT`, then the default
pub fn resolve_port(flag: Option<u16>) -> u16 {
    resolve_port_from(flag, std::env::var("PORT").ok().as_deref())
}

fn resolve_port_from(flag: Option<u16>, env: Option<&str>) -> u16 {
    flag.or_else(|| env.and_then(|v| v.trim().parse().ok()))
        .unwrap_or(DEFAULT_PORT)
}

pub async fn cmd_serve(
    config: Option<&Path>,
    transactions: Option<&Path>,
    host: &str,
    port: u16,
    static_dir: Option<&Path>,
) -> Result<()> {
    let settings = load_settings(config)?;
    let store = load_store(transactions)?;
    let pipeline = build_pipeline(&settings, store.clone())?;
    let server_config = ServerConfig::from_env();

    println!("🚀 Starting SmartFinance web server...");
    println!("   Listening: http://{}:{}", host, port);
    println!("   Transactions: {} loaded", store.len());
    println!(
        "   AI backend: {} ({})",
        pipeline.provider().backend().name(),
        pipeline.provider().model()
    );
    if !pipeline.provider().is_configured() {
        println!("   ⚠️  OPENAI_API_KEY not set - insight requests will fail");
    }
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }
    if !server_config.allowed_origins.is_empty() {
        println!(
            "   CORS origins: {}",
            server_config.allowed_origins.join(", ")
        );
    }
    println!();

    let static_dir = static_dir.map(|p| p.to_string_lossy().into_owned());
    smartfinance_server::serve_with_config(
        pipeline,
        store,
        host,
        port,
        static_dir.as_deref(),
        server_config,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_resolution_order() {
        assert_eq!(resolve_port_from(Some(8080), Some("9000")), 8080);
        assert_eq!(resolve_port_from(None, Some("9000")), 9000);
        assert_eq!(resolve_port_from(None, Some("not-a-port")), DEFAULT_PORT);
        assert_eq!(resolve_port_from(None, None), 5000);
    }
}
