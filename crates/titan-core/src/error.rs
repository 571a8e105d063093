//! Error types for the Titan client
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for Titan operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the Titan client
#[derive(Error, Debug)]
pub enum Error {
    /// Connection, DNS, deadline or cancellation failure
    #[error("Transport error ({endpoint}): {message}")]
    Transport {
        /// Endpoint the request was aimed at
        endpoint: String,
        /// Underlying cause
        message: String,
    },

    /// The appliance answered a read with something other than 200
    #[error("Unexpected HTTP status {status} from {endpoint}: {body}")]
    HttpStatus {
        /// Endpoint the request was aimed at
        endpoint: String,
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// The response body was not a valid envelope
    #[error("Failed to decode response from {endpoint}: {message}")]
    Decode {
        /// Endpoint the request was aimed at
        endpoint: String,
        /// Deserializer message
        message: String,
    },

    /// Create or update of a location was refused
    #[error("endpointURL: {endpoint}, name: {name}, ip: {ip}, status: {status}, body: {body}")]
    UpsertRejected {
        /// Endpoint the form was posted to
        endpoint: String,
        /// Location name that was sent
        name: String,
        /// Location IP that was sent
        ip: String,
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Delete of a location was refused
    #[error("id: {customer_id}, locationId: {location_id}, status: {status}, body: {body}")]
    DeleteRejected {
        /// Owning customer account
        customer_id: i64,
        /// Location id
        location_id: i64,
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a transport error
    pub fn transport(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the request never got an HTTP answer
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// HTTP status carried by the error, if the appliance answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. }
            | Self::UpsertRejected { status, .. }
            | Self::DeleteRejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}
