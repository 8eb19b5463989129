//! Typed, one-round-trip API client on top of a pluggable transport.
//!
//! `StudentApi` glues `StudentClient`'s builders and parsers to a
//! `Transport`. Each call is exactly one request: no retries, no backoff.

use tracing::{debug, warn};

use crate::client::StudentClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{
    DeleteReceipt, Envelope, HealthStatus, NewStudent, Student, StudentStatus, StudentUpdate,
};

/// Executes a plain-data request against the network.
///
/// Implementations must hand non-2xx responses back as `Ok` so the client
/// can attach the status and body to its error; `Err` is reserved for
/// failures where no response was received.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

#[derive(Debug, Clone)]
pub struct StudentApi<T> {
    client: StudentClient,
    transport: T,
}

impl<T: Transport> StudentApi<T> {
    pub fn new(client: StudentClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &StudentClient {
        &self.client
    }

    /// Execute one request, logging it the same way for every operation.
    pub fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = %request.method, url = %request.path, "sending request");
        let result = self.transport.execute(request);
        match &result {
            Ok(response) if response.is_success() => {
                debug!(status = response.status, "response received");
            }
            Ok(response) => {
                warn!(status = response.status, body = %response.body, "request rejected");
            }
            Err(err) => warn!(error = %err, "request failed"),
        }
        result
    }

    pub fn list_students(&self) -> Result<Envelope<Vec<Student>>, ApiError> {
        let response = self.send(&self.client.build_list_students())?;
        self.client.parse_list_students(response)
    }

    pub fn get_student(&self, id: u64) -> Result<Student, ApiError> {
        let response = self.send(&self.client.build_get_student(id))?;
        self.client.parse_get_student(response)
    }

    pub fn create_student(&self, input: &NewStudent) -> Result<Student, ApiError> {
        let response = self.send(&self.client.build_create_student(input)?)?;
        self.client.parse_create_student(response)
    }

    pub fn update_student(&self, id: u64, input: &StudentUpdate) -> Result<Student, ApiError> {
        let response = self.send(&self.client.build_update_student(id, input)?)?;
        self.client.parse_update_student(response)
    }

    pub fn delete_student(&self, id: u64) -> Result<DeleteReceipt, ApiError> {
        let response = self.send(&self.client.build_delete_student(id))?;
        self.client.parse_delete_student(response)
    }

    pub fn list_students_by_major(&self, major: &str) -> Result<Envelope<Vec<Student>>, ApiError> {
        let response = self.send(&self.client.build_list_students_by_major(major))?;
        self.client.parse_list_students_by_major(response)
    }

    /// Pass `None` to ask for the service default, active students.
    pub fn list_students_by_status(
        &self,
        status: Option<StudentStatus>,
    ) -> Result<Envelope<Vec<Student>>, ApiError> {
        let status = status.unwrap_or_default();
        let response = self.send(&self.client.build_list_students_by_status(status))?;
        self.client.parse_list_students_by_status(response)
    }

    pub fn health_check(&self) -> Result<HealthStatus, ApiError> {
        let response = self.send(&self.client.build_health_check())?;
        self.client.parse_health_check(response)
    }
}
