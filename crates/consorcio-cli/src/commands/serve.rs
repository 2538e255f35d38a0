//! Server command implementation

use anyhow::Result;

use consorcio_server::ServerConfig;

use super::store_from_env;

pub async fn cmd_serve(
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    origins: Vec<String>,
) -> Result<()> {
    let store = store_from_env()?;

    println!("🏢 Starting Consorcio server...");
    println!("   Data store: {}", store.base_url());
    println!("   Listening: http://{}:{}", host, port);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir);
    }
    if origins.is_empty() {
        println!("   CORS: same-origin only");
    } else {
        println!("   CORS origins: {}", origins.join(", "));
    }

    let config = ServerConfig {
        allowed_origins: origins,
    };
    consorcio_server::serve_with_config(store, host, port, static_dir, config).await
}
