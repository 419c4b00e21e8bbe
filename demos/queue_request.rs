//! Creates a connection and queues a customer query against it.
//!
//! Set QUBE_DEMO_WEBHOOK_URL to have the result delivered to a webhook.

use qube_sync::models::QueuedRequestParams;
use qube_sync::{Config, QubeClient};

const CUSTOMER_QUERY: &str = r#"<?xml version="1.0"?>
<?qbxml version="16.0"?>
<QBXML>
  <QBXMLMsgsRq onError="stopOnError">
    <CustomerQueryRq requestID="1">
      <MaxReturned>10</MaxReturned>
    </CustomerQueryRq>
  </QBXMLMsgsRq>
</QBXML>"#;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = Config::from_env()?;
    let client = QubeClient::from_config(&config)?;

    let connection_id = client.create_connection().await?;
    println!("Connection created with ID: {connection_id}");

    let mut params = QueuedRequestParams::xml(CUSTOMER_QUERY);
    if let Ok(webhook_url) = std::env::var("QUBE_DEMO_WEBHOOK_URL") {
        params = params.with_webhook_url(webhook_url);
    }

    let request = client.queue_request(&connection_id, &params).await?;
    println!("{}", serde_json::to_string_pretty(&request)?);

    Ok(())
}
