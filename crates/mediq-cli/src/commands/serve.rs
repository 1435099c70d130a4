//! `mediq serve` — Start the Mediq HTTP backend server.

use mediq_server::ServerConfig;

pub async fn run(host: String, port: u16, catalog_dir: Option<&str>) -> Result<(), String> {
    let config = super::load_config(catalog_dir);
    let service = super::init_service(config)?;

    println!("Starting Mediq server on {}:{}...", host, port);

    let addr = mediq_server::start_server(
        ServerConfig {
            host: host.clone(),
            port,
        },
        service,
    )
    .await?;

    println!("Mediq server listening on http://{}", addr);
    println!("Health check: http://{}/health", addr);
    println!("Analysis endpoint: POST http://{}/api/analyze", addr);

    // Keep the process running until interrupted
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("Failed to listen for Ctrl+C: {}", e))?;

    println!("\nShutting down...");
    Ok(())
}
