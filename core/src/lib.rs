//! Client core for the student records service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern), and keeps the state of the
//! student page in a single `Controller`.
//!
//! # Design
//! - `StudentClient` is stateless; it holds only `base_url`.
//! - Each operation is split into `build_*` and `parse_*` so the I/O boundary
//!   is explicit. `StudentApi` joins the two over a `Transport` for callers
//!   that just want a typed call.
//! - `Controller` hands requests out as `Dispatch` values and takes outcomes
//!   back, so any event loop can drive it and tests need no network.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod client;
pub mod controller;
pub mod error;
pub mod http;
pub mod types;

pub use api::{StudentApi, Transport};
pub use client::{StudentClient, API_PREFIX, DEFAULT_BASE_URL};
pub use controller::{Controller, Dispatch, Draft, DraftField, Pending, Prompt, ViewState};
pub use error::{ApiError, DraftError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{
    DeleteReceipt, Envelope, HealthStatus, NewStudent, Student, StudentStatus, StudentUpdate,
    UnknownStatus,
};
