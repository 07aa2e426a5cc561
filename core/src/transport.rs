//! Blocking `Transport` backed by a ureq agent.
//!
//! # Design
//! The agent is configured with `http_status_as_error(false)` so 4xx/5xx
//! responses come back as data and status interpretation stays in
//! `SampleClient::parse_json`. No timeout is configured and bodies are read
//! without a size limit.

use ureq::{Agent, RequestBuilder};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};

#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self::with_agent(agent)
    }

    /// Uses a caller-configured agent. It must not turn statuses into errors.
    pub fn with_agent(agent: Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = request.effective_method();
        tracing::debug!(%method, url = %request.url, "sending request");

        let url = request.url.as_str();
        let headers = request.headers.as_slice();
        let body = request.body.as_deref();

        let sent = match method {
            HttpMethod::Get => with_headers(self.agent.get(url), headers).call(),
            HttpMethod::Delete => with_headers(self.agent.delete(url), headers).call(),
            HttpMethod::Post => {
                let builder = with_headers(self.agent.post(url), headers);
                match body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
            HttpMethod::Put => {
                let builder = with_headers(self.agent.put(url), headers);
                match body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };
        let mut response = sent.map_err(|e| ApiError::Transport(format!("{method} {url}: {e}")))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        // ureq caps text bodies at 10 MB by default; JSON pages may exceed that.
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_string()
            .ok();
        tracing::debug!(status, url = %request.url, "received response");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}
