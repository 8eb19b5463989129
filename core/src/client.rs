//! Stateless HTTP request builder and response parser for the student API.
//!
//! # Design
//! `StudentClient` holds only a `base_url` and carries no mutable state
//! between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. The caller executes the actual HTTP round-trip.

use serde::de::DeserializeOwned;
use serde::Serialize;
use snafu::ResultExt;

use crate::error::{ApiError, DecodeSnafu, EncodeSnafu};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    DeleteReceipt, Envelope, HealthStatus, NewStudent, Student, StudentStatus, StudentUpdate,
};

/// Used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/v1";

/// Path prefix the service mounts its API under. The health endpoint lives
/// beside it, on the bare host.
pub const API_PREFIX: &str = "/api/v1";

/// Synchronous, stateless client for the student API.
#[derive(Debug, Clone)]
pub struct StudentClient {
    base_url: String,
}

impl Default for StudentClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl StudentClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the health endpoint: the base URL with the API prefix removed.
    pub fn health_url(&self) -> String {
        let host = self.base_url.replace(API_PREFIX, "");
        format!("{}/health", host.trim_end_matches('/'))
    }

    pub fn build_list_students(&self) -> HttpRequest {
        self.get(format!("{}/students", self.base_url))
    }

    pub fn build_get_student(&self, id: u64) -> HttpRequest {
        self.get(format!("{}/students/{id}", self.base_url))
    }

    pub fn build_create_student(&self, input: &NewStudent) -> Result<HttpRequest, ApiError> {
        self.with_body(HttpMethod::Post, format!("{}/students", self.base_url), input)
    }

    pub fn build_update_student(
        &self,
        id: u64,
        input: &StudentUpdate,
    ) -> Result<HttpRequest, ApiError> {
        self.with_body(HttpMethod::Put, format!("{}/students/{id}", self.base_url), input)
    }

    pub fn build_delete_student(&self, id: u64) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: format!("{}/students/{id}", self.base_url),
            headers: json_headers(),
            body: None,
        }
    }

    pub fn build_list_students_by_major(&self, major: &str) -> HttpRequest {
        self.get(format!(
            "{}/students/major?major={}",
            self.base_url,
            urlencoding::encode(major)
        ))
    }

    pub fn build_list_students_by_status(&self, status: StudentStatus) -> HttpRequest {
        self.get(format!("{}/students/status?status={status}", self.base_url))
    }

    pub fn build_health_check(&self) -> HttpRequest {
        self.get(self.health_url())
    }

    pub fn parse_list_students(
        &self,
        response: HttpResponse,
    ) -> Result<Envelope<Vec<Student>>, ApiError> {
        decode(response)
    }

    pub fn parse_get_student(&self, response: HttpResponse) -> Result<Student, ApiError> {
        decode::<Envelope<Student>>(response).map(|envelope| envelope.data)
    }

    pub fn parse_create_student(&self, response: HttpResponse) -> Result<Student, ApiError> {
        decode::<Envelope<Student>>(response).map(|envelope| envelope.data)
    }

    pub fn parse_update_student(&self, response: HttpResponse) -> Result<Student, ApiError> {
        decode::<Envelope<Student>>(response).map(|envelope| envelope.data)
    }

    pub fn parse_delete_student(&self, response: HttpResponse) -> Result<DeleteReceipt, ApiError> {
        decode(response)
    }

    pub fn parse_list_students_by_major(
        &self,
        response: HttpResponse,
    ) -> Result<Envelope<Vec<Student>>, ApiError> {
        decode(response)
    }

    pub fn parse_list_students_by_status(
        &self,
        response: HttpResponse,
    ) -> Result<Envelope<Vec<Student>>, ApiError> {
        decode(response)
    }

    pub fn parse_health_check(&self, response: HttpResponse) -> Result<HealthStatus, ApiError> {
        decode(response)
    }

    fn get(&self, path: String) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path,
            headers: json_headers(),
            body: None,
        }
    }

    fn with_body<T: Serialize>(
        &self,
        method: HttpMethod,
        path: String,
        input: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).context(EncodeSnafu)?;
        Ok(HttpRequest {
            method,
            path,
            headers: json_headers(),
            body: Some(body),
        })
    }
}

fn json_headers() -> Vec<(String, String)> {
    vec![("content-type".to_string(), "application/json".to_string())]
}

/// Reject any status outside the success range, carrying the body text.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::Http {
        status: response.status,
        body: response.body.clone(),
    })
}

fn decode<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).context(DecodeSnafu)
}
