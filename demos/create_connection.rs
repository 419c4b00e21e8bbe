//! Creates a QUBE connection and prints it back.
//!
//! Requires QUBE_API_KEY and QUBE_WEBHOOK_SECRET in the environment (or `.env`).

use qube_sync::{Config, QubeClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = Config::from_env()?;
    let client = QubeClient::from_config(&config)?;

    let connection_id = client.create_connection().await?;
    println!("Connection created with ID: {connection_id}");

    let connection = client.get_connection(&connection_id).await?;
    println!("{}", serde_json::to_string_pretty(&connection)?);

    Ok(())
}
