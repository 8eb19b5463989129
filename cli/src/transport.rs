//! Blocking ureq transport for `student_core`.
//!
//! Status codes are handed back as data (`http_status_as_error(false)`) so
//! the core client decides what counts as a failure. Only a missing
//! response becomes `ApiError::Transport`.

use student_core::{ApiError, HttpMethod, HttpRequest, HttpResponse, Transport};

#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

/// Copy the request's headers onto a ureq builder.
fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

impl Transport for UreqTransport {
    fn execute(&self, req: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let agent = &self.agent;
        let headers = &req.headers;
        let result = match (req.method, req.body.as_deref()) {
            (HttpMethod::Get, _) => with_headers(agent.get(&req.path), headers).call(),
            (HttpMethod::Delete, _) => with_headers(agent.delete(&req.path), headers).call(),
            (HttpMethod::Post, Some(body)) => {
                with_headers(agent.post(&req.path), headers).send(body.as_bytes())
            }
            (HttpMethod::Post, None) => with_headers(agent.post(&req.path), headers).send_empty(),
            (HttpMethod::Put, Some(body)) => {
                with_headers(agent.put(&req.path), headers).send(body.as_bytes())
            }
            (HttpMethod::Put, None) => with_headers(agent.put(&req.path), headers).send_empty(),
        };
        let mut response = result.map_err(|e| ApiError::transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::transport(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
