//! Domain DTOs for the student API.
//!
//! # Design
//! These types mirror the service's JSON but are defined independently from
//! the mock-server crate; integration tests catch schema drift. Optional
//! fields accept both `null` and absence, and unknown fields (the service
//! leaks `deleted_at`) are ignored.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Enrollment status of a student. New records default to `Active`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudentStatus {
    #[default]
    Active,
    Inactive,
    Graduated,
    Suspended,
}

impl StudentStatus {
    pub const ALL: [StudentStatus; 4] = [
        StudentStatus::Active,
        StudentStatus::Inactive,
        StudentStatus::Graduated,
        StudentStatus::Suspended,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StudentStatus::Active => "active",
            StudentStatus::Inactive => "inactive",
            StudentStatus::Graduated => "graduated",
            StudentStatus::Suspended => "suspended",
        }
    }
}

impl fmt::Display for StudentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the four known statuses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown status {:?} (expected active, inactive, graduated or suspended)",
            self.0
        )
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for StudentStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StudentStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// A student record as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: u64,
    pub student_code: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<DateTime<Utc>>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub major: Option<String>,
    #[serde(default)]
    pub year: Option<u8>,
    #[serde(default)]
    pub gpa: Option<f64>,
    #[serde(default)]
    pub status: StudentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Request payload for creating a student: every field except the id and
/// the server-assigned timestamps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewStudent {
    pub student_code: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpa: Option<f64>,
    #[serde(default)]
    pub status: StudentStatus,
}

/// Partial update payload. Only the fields present in the JSON are applied;
/// omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpa: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<StudentStatus>,
}

impl StudentUpdate {
    pub fn is_empty(&self) -> bool {
        *self == StudentUpdate::default()
    }
}

/// Wrapper object every data-bearing response arrives in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major: Option<String>,
}

/// Body of a successful delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteReceipt {
    pub message: String,
}

/// Body of the service health endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}
