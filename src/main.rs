// quire site server

use quire::blog::{HandlebarsRenderer, store};
use quire::settings::{AppConfig, OVERRIDE_FILE};
use quire::{Application, site_routes};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load(OVERRIDE_FILE)?;
    let _guard = config.log_config().init()?;

    store::install(Arc::new(store::InMemoryUserRepository::new()))?;

    let routes = site_routes()?;
    let renderer = HandlebarsRenderer::from_dir(&config.templates.dir)?;
    let app = Application::new(routes).with_renderer(renderer);

    let addr = config.addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, debug = config.debug, "server started");

    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "cannot listen for shutdown signal");
        }
    };
    app.serve(listener, shutdown).await?;

    info!("server stopped");
    Ok(())
}
