use actix_web::{middleware, web, App, HttpServer};
use qube_sync::{handlers, Config, WebhookVerifier};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::init();

    // Missing secrets are fatal here, before any request is accepted
    let config = Config::from_env()?;
    let server_address = config.server_address();
    let verifier = web::Data::new(WebhookVerifier::from_config(&config)?);

    log::info!("Starting QUBE webhook receiver...");
    log::info!(
        "Webhook signatures accepted for {}s{}",
        verifier.max_age(),
        if config.previous_webhook_secret.is_some() {
            " (rotation overlap active)"
        } else {
            ""
        }
    );
    log::info!("Server starting on http://{server_address}");

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(verifier.clone())
            .configure(handlers::configure)
    })
    .bind(&server_address)?
    .run()
    .await?;

    Ok(())
}
