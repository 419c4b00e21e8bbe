//! HTTP client for the QUBE REST API.
//!
//! Wraps connection lifecycle, queued request, QWC file, and password
//! generation calls. Every request authenticates with the API key using HTTP
//! basic auth and exchanges JSON.

use crate::config::Config;
use crate::models::connection::{CreatedConnection, GeneratedPassword, QwcResponse};
use crate::models::queued_request::QueuedRequestBody;
use crate::models::{Connection, DataEnvelope, QueuedRequest, QueuedRequestParams};
use log::{debug, info, warn};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub struct QubeClient {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl QubeClient {
    pub fn new(base_url: &str, api_key: SecretString) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        let base_url = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        Self::new(
            &config.api_base_url,
            SecretString::new(config.api_key.expose_secret().clone()),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(self.api_key.expose_secret(), Some(""))
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let response = self.authorize(request).send().await.map_err(|e| {
            warn!("Failed to reach QUBE API: {e}");
            ClientError::Http(e)
        })?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let message = response.text().await.unwrap_or_default();
            warn!("Unexpected QUBE response: {status}");
            Err(ClientError::UnexpectedResponse {
                status: status.as_u16(),
                message,
            })
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.url(path);
        debug!("GET {url}");

        let response = self.execute(self.client.get(&url)).await?;
        Ok(response.json().await?)
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        debug!("POST {url}");

        let response = self.execute(self.client.post(&url).json(body)).await?;
        Ok(response.json().await?)
    }

    /// POST without a request body.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.url(path);
        debug!("POST {url}");

        let response = self.execute(self.client.post(&url)).await?;
        Ok(response.json().await?)
    }

    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        let url = self.url(path);
        debug!("DELETE {url}");

        self.execute(self.client.delete(&url)).await?;
        Ok(())
    }

    /// Creates a connection and returns its id.
    pub async fn create_connection(&self) -> Result<String, ClientError> {
        let response: DataEnvelope<CreatedConnection> = self.post_empty("connections").await?;
        let id = response
            .data
            .id
            .ok_or(ClientError::MissingField("data.id"))?;

        info!("Created QUBE connection {id}");
        Ok(id)
    }

    pub async fn get_connection(&self, id: &str) -> Result<Connection, ClientError> {
        let response: DataEnvelope<Connection> = self.get(&format!("connections/{id}")).await?;
        Ok(response.data)
    }

    pub async fn delete_connection(&self, id: &str) -> Result<(), ClientError> {
        self.delete(&format!("connections/{id}")).await?;
        info!("Deleted QUBE connection {id}");
        Ok(())
    }

    pub async fn queue_request(
        &self,
        connection_id: &str,
        params: &QueuedRequestParams,
    ) -> Result<QueuedRequest, ClientError> {
        if !params.has_request() {
            return Err(ClientError::InvalidRequest(
                "Must have either request_xml or request_json".to_string(),
            ));
        }

        if params.webhook_url.is_none() {
            warn!("No webhook_url provided for request on connection {connection_id}");
        }

        let body = QueuedRequestBody {
            queued_request: params,
        };
        let response: DataEnvelope<QueuedRequest> = self
            .post(&format!("connections/{connection_id}/queued_requests"), &body)
            .await?;

        info!(
            "Queued request {} on connection {connection_id}",
            response.data.id
        );
        Ok(response.data)
    }

    pub async fn get_request(&self, id: &str) -> Result<QueuedRequest, ClientError> {
        let response: DataEnvelope<QueuedRequest> =
            self.get(&format!("queued_requests/{id}")).await?;
        Ok(response.data)
    }

    pub async fn get_requests(&self, connection_id: &str) -> Result<Vec<QueuedRequest>, ClientError> {
        let response: DataEnvelope<Vec<QueuedRequest>> = self
            .get(&format!("connections/{connection_id}/queued_requests"))
            .await?;
        Ok(response.data)
    }

    pub async fn delete_request(&self, id: &str) -> Result<(), ClientError> {
        self.delete(&format!("queued_requests/{id}")).await
    }

    /// Fetches the QuickBooks Web Connector file for a connection.
    pub async fn get_qwc(&self, connection_id: &str) -> Result<String, ClientError> {
        let response: QwcResponse = self
            .post_empty(&format!("connections/{connection_id}/qwc"))
            .await?;
        response.qwc.ok_or(ClientError::MissingField("qwc"))
    }

    pub async fn generate_password(&self, connection_id: &str) -> Result<String, ClientError> {
        let response: DataEnvelope<GeneratedPassword> = self
            .post_empty(&format!("connections/{connection_id}/password"))
            .await?;
        response
            .data
            .password
            .ok_or(ClientError::MissingField("data.password"))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Unexpected QUBE response: {status}\n{message}")]
    UnexpectedResponse { status: u16, message: String },
    #[error("Missing field in QUBE response: {0}")]
    MissingField(&'static str),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}
