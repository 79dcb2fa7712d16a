//! Error handling for the metadata fetcher
//!
//! This uses the `error-chain` crate to define errors, enable them for usage
//! with `?`, and give us chaining of causes. It's expected that this module is
//! always glob imported:
//!
//! ```text
//! use errors::*;
//! ```
//!
//! Functions should then return `Result<T>`. Stage context is added via
//! `chain_err`, which keeps the original failure reachable as the cause:
//!
//! ```text
//! let token = self.acquire_token(&client)
//!     .chain_err(|| ErrorKind::TokenAcquisition)?;
//! ```
//!
//! Only the token and instance-id stages ever reach a caller. A failed
//! lifecycle read is replaced with a default inside `metadata`.

use std::io;

use config;
use reqwest;
use serde_json;

error_chain! {
    foreign_links {
        Http(reqwest::Error);
        Io(io::Error);
        Config(config::ConfigError);
        Json(serde_json::Error);
    }

    errors {
        TokenAcquisition {
            description("failed to get IMDS token")
            display("failed to get IMDS token")
        }

        InstanceId {
            description("failed to get instance ID")
            display("failed to get instance ID")
        }

        TokenStatus(status: u16) {
            description("token request was rejected")
            display("failed to get token, status code: {}", status)
        }

        FieldStatus(field: String, status: u16) {
            description("metadata read was rejected")
            display("failed to get metadata for {}, status code: {}", field, status)
        }
    }
}
