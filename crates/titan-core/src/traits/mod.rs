//! Core traits for the Titan client
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`ApiTransport`]: Send signed requests to the appliance REST API

pub mod transport;

pub use transport::{ApiRequest, ApiResponse, ApiTransport, Method};
