//! HTTP transports backed by `reqwest`.

use crate::model::{Credentials, TransportError};
use crate::source::{sse, MessageStream, PullTransport, PushTransport, TransportSettings};
use futures_util::StreamExt;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;
use tracing::debug;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// GET-per-acquisition pulls and Server-Sent-Events pushes over HTTP.
///
/// Uses two clients: the pull client enforces the whole-request timeout,
/// the push client only bounds connection setup so long-lived streams stay open.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    pull_client: Client,
    push_client: Client,
    credentials: Option<Credentials>,
}

impl HttpTransport {
    /// # Errors
    ///
    /// Returns [`TransportError::Client`] if either client cannot be built
    /// (for example when the user agent is not a valid header value).
    pub fn new(settings: &TransportSettings) -> Result<Self, TransportError> {
        let pull_client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(settings.request_timeout)
            .build()
            .map_err(client_error)?;
        let push_client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(client_error)?;

        Ok(Self {
            pull_client,
            push_client,
            credentials: settings.credentials.clone(),
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some(credentials) => request.header(AUTHORIZATION, credentials.expose()),
            None => request,
        }
    }
}

fn client_error(e: reqwest::Error) -> TransportError {
    TransportError::Client {
        reason: e.to_string(),
    }
}

fn request_error(url: &str, e: reqwest::Error) -> TransportError {
    TransportError::Request {
        url: url.to_string(),
        reason: e.to_string(),
    }
}

fn ensure_success(url: &str, response: Response) -> Result<Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(TransportError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        })
    }
}

impl PullTransport for HttpTransport {
    async fn fetch(&self, url: &str) -> Result<String, TransportError> {
        debug!(url, "GET");
        let response = self
            .authorize(self.pull_client.get(url))
            .send()
            .await
            .map_err(|e| request_error(url, e))?;
        let response = ensure_success(url, response)?;
        response.text().await.map_err(|e| request_error(url, e))
    }
}

impl PushTransport for HttpTransport {
    async fn subscribe(&self, url: &str) -> Result<MessageStream, TransportError> {
        debug!(url, "opening event stream");
        let response = self
            .authorize(self.push_client.get(url))
            .header(ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|e| request_error(url, e))?;
        let response = ensure_success(url, response)?;
        Ok(sse::messages(response.bytes_stream(), url.to_string()).boxed_local())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> TransportSettings {
        TransportSettings {
            request_timeout: Duration::from_secs(1),
            user_agent: "factcard-test".to_string(),
            credentials: None,
        }
    }

    #[test]
    fn builds_with_valid_settings() {
        assert!(HttpTransport::new(&settings()).is_ok());
    }

    #[test]
    fn invalid_user_agent_is_client_error() {
        let mut settings = settings();
        settings.user_agent = "bad\nagent".to_string();

        let result = HttpTransport::new(&settings);
        assert!(
            matches!(result, Err(TransportError::Client { .. })),
            "got: {:?}",
            result
        );
    }

    #[test]
    fn debug_output_redacts_credentials() {
        let mut settings = settings();
        settings.credentials = Some(Credentials::new("Bearer hunter2"));
        let transport = HttpTransport::new(&settings).unwrap();

        assert!(!format!("{:?}", settings).contains("hunter2"));
        assert!(!format!("{:?}", transport).contains("hunter2"));
    }

    #[tokio::test]
    async fn unreachable_host_is_request_error() {
        let transport = HttpTransport::new(&settings()).unwrap();

        let result = transport.fetch("http://127.0.0.1:9/fact").await;
        assert!(
            matches!(result, Err(TransportError::Request { ref url, .. }) if url == "http://127.0.0.1:9/fact"),
            "got: {:?}",
            result
        );
    }

    #[tokio::test]
    async fn malformed_url_is_request_error() {
        let transport = HttpTransport::new(&settings()).unwrap();

        let result = transport.subscribe("not a url").await;
        assert!(matches!(result, Err(TransportError::Request { .. })));
    }
}
