//! Blocking `Transport` backed by `ureq`.

use shop_core::{ApiError, HttpMethod, HttpRequest, HttpResponse, Transport};
use ureq::{Agent, RequestBuilder};

/// Executes requests with a shared `ureq::Agent`.
///
/// The agent is built with `http_status_as_error(false)` so 4xx/5xx responses
/// come back as data and the smoke test can print them.
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
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn with_headers<B>(
    mut builder: RequestBuilder<B>,
    headers: &[(String, String)],
) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

impl Transport for UreqTransport {
    fn execute(&mut self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
        let url = req.url.as_str();
        let headers = req.headers.as_slice();
        let result = match (req.method, req.body) {
            (HttpMethod::Get, _) => with_headers(self.agent.get(url), headers).call(),
            (HttpMethod::Post, Some(body)) => {
                with_headers(self.agent.post(url), headers).send(body.as_bytes())
            }
            (HttpMethod::Post, None) => with_headers(self.agent.post(url), headers).send_empty(),
            (HttpMethod::Put, Some(body)) => {
                with_headers(self.agent.put(url), headers).send(body.as_bytes())
            }
            (HttpMethod::Put, None) => with_headers(self.agent.put(url), headers).send_empty(),
            // The products endpoint reads the id to delete from the body.
            (HttpMethod::Delete, Some(body)) => {
                let builder = self.agent.delete(url).force_send_body();
                with_headers(builder, headers).send(body.as_bytes())
            }
            (HttpMethod::Delete, None) => with_headers(self.agent.delete(url), headers).call(),
        };
        let mut response = result.map_err(|e| ApiError::TransportError(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::TransportError(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
