//! `bottler serve`.

use anyhow::Result;
use bottler_axum::{CorsConfig, ServerConfig, start_server};

pub async fn execute(
    prefix_base: Option<String>,
    host: String,
    port: u16,
    allowed_origins: &str,
) -> Result<()> {
    let config = ServerConfig {
        host,
        port,
        prefix_base,
        cors: CorsConfig::from_origin_list(allowed_origins),
    };
    start_server(config).await
}
