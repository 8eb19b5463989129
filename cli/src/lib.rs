//! Terminal front end for the student records service.
//!
//! # Overview
//! `student_core` owns the request shapes and the page state; this crate
//! supplies everything that touches the outside world: configuration, the
//! ureq transport, terminal I/O, and text rendering.

pub mod app;
pub mod config;
pub mod console;
pub mod render;
pub mod transport;

pub use app::{App, Command, Flow};
pub use console::Console;
pub use transport::UreqTransport;
