use async_trait::async_trait;
use kinocr_core::config::GatewayConfig;
use kinocr_core::gateway::{GatewayError, SubmissionGateway};
use kinocr_core::{PolicyRecord, SubmissionReceipt};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};

const MAX_ERROR_BODY_CHARS: usize = 512;

/// Posts the record list as a JSON array and expects `{ "id": <number> }` back.
#[derive(Clone, Debug)]
pub struct HttpSubmissionGateway {
    client: Client,
    endpoint: String,
    api_token: Option<SecretString>,
}

impl HttpSubmissionGateway {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self { client: Client::new(), endpoint: endpoint.into(), api_token: None }
    }

    pub fn from_config(config: &GatewayConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.endpoint.clone(),
            api_token: config.api_token.clone(),
        }
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(SecretString::from(token.into()));
        self
    }
}

#[async_trait]
impl SubmissionGateway for HttpSubmissionGateway {
    async fn submit(&self, records: &[PolicyRecord]) -> Result<SubmissionReceipt, GatewayError> {
        let mut request = self.client.post(&self.endpoint).json(records);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response =
            request.send().await.map_err(|error| GatewayError::Transport(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        response
            .json::<SubmissionReceipt>()
            .await
            .map_err(|error| GatewayError::Decode(error.to_string()))
    }
}
