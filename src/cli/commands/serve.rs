//! Relay gateway server command.

use crate::cli::Output;
use crate::config::Settings;
use crate::gateway::{router, UpstreamClient};

/// Run the relay gateway.
pub async fn run_serve(
    host: Option<String>,
    port: Option<u16>,
    upstream: Option<String>,
    timeout: Option<u64>,
    mut settings: Settings,
) -> anyhow::Result<()> {
    let gateway = &mut settings.gateway;
    if let Some(host) = host {
        gateway.host = host;
    }
    if let Some(port) = port {
        gateway.port = port;
    }
    if let Some(upstream) = upstream {
        gateway.upstream_url = upstream;
    }
    if let Some(timeout) = timeout {
        gateway.timeout_secs = timeout;
    }

    let upstream = UpstreamClient::new(gateway)?;
    let upstream_url = upstream.base_url().to_string();
    let app = router(upstream);

    let addr = format!("{}:{}", gateway.host, gateway.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Recap Gateway");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    Output::kv("Upstream", &upstream_url);
    Output::kv("Timeout", &format!("{}s", gateway.timeout_secs));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("News", "GET  /summaries?q=&sort=");
    Output::kv("Videos", "GET  /youtube-summaries?keyword=");
    Output::kv("Re-summarize", "POST /summarize-originals");
    Output::kv("Audio", "GET  /tts?file_id=");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}
