//! # apiprobe core
//!
//! Building blocks for probing a REST API and validating what comes back:
//!
//! - an HTTP client wrapper that times each call and classifies the
//!   result into a success/error envelope
//! - a library of pure validation predicates over untrusted JSON
//! - assertion macros for the terminal, test-aborting checks
//! - a diagnostics sink so tests can assert on what was reported
//!
//! ## Data flow (block diagram)
//!
//! ```text
//! +---------------+      +----------------------+      +---------------------+
//! | test case     | ---> | http::Client::get    | ---> | ApiResponse         |
//! |               |      | (timing, classify)   |      | Data | Error        |
//! +---------------+      +----------------------+      +---------------------+
//!                                                                 |
//!                                                                 v
//! +---------------+      +----------------------+      +---------------------+
//! | check!/       | <--- | validator predicates | ---> | diag::Diagnostics   |
//! | assert_*      |      | (boolean, composable)|      | (findings sink)     |
//! +---------------+      +----------------------+      +---------------------+
//! ```
//!
//! One-way flow, no retries, no state between calls. Boolean validators
//! never throw; client transport/parse failures and the `assert_*` checks
//! always do.

#[doc(hidden)]
pub mod assertion;
pub mod config;
pub mod diag;
pub mod error;
pub mod http;
pub mod model;
pub mod validator;

// Re-exported for the assertion macros and for downstream test crates.
pub use eyre;
pub use pretty_assertions;
pub use tracing;

pub use config::{get_config, Config};
pub use diag::{Diagnostics, Finding, MemoryDiagnostics, TracingDiagnostics};
pub use error::{Error, Result};
pub use http::{Client, GetOptions};
pub use model::{Album, ApiError, ApiResponse, Comment, Payload, Photo, Post, Todo};
pub use validator::{
    assert_envelope, assert_response_time, email_format, url_format, Validator,
    DEFAULT_RESPONSE_TIME_CEILING,
};
