//! HTTP client for the contact endpoint

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    domain::contact::{
        form::{SubmissionOutcome, Submitter},
        ContactForm,
    },
    infrastructure::http::errors::ErrorResponse,
};

#[derive(Debug, Deserialize)]
struct SuccessResponse {
    success: bool,
}

/// Posts contact forms to a gateway over HTTP
#[derive(Debug, Clone)]
pub struct HttpSubmitter {
    client: Client,
    endpoint: String,
}

impl HttpSubmitter {
    /// Creates a submitter posting to `endpoint`, e.g. `https://example.com/api/v1/contact`
    pub fn new(endpoint: &str) -> Self {
        Self::with_client(Client::new(), endpoint)
    }

    /// Creates a submitter using a preconfigured client
    pub fn with_client(client: Client, endpoint: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.to_string(),
        }
    }
}

#[async_trait]
impl Submitter for HttpSubmitter {
    async fn submit(&self, form: &ContactForm) -> SubmissionOutcome {
        let response = match self.client.post(&self.endpoint).json(form).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "contact request failed");
                return SubmissionOutcome::Failed { detail: None };
            }
        };

        let status = response.status();
        debug!(%status, "contact request answered");

        if status == StatusCode::TOO_MANY_REQUESTS {
            return SubmissionOutcome::TooManyRequests;
        }

        if status.is_success() {
            return match response.json::<SuccessResponse>().await {
                Ok(SuccessResponse { success: true }) => SubmissionOutcome::Sent,
                _ => SubmissionOutcome::Failed { detail: None },
            };
        }

        let detail = response.json::<ErrorResponse>().await.ok().and_then(|body| {
            body.error
                .or_else(|| (!body.errors.is_empty()).then(|| body.errors.join(" ")))
        });

        SubmissionOutcome::Failed { detail }
    }
}
