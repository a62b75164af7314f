//! Result codes shared by every fallible operation on a client handle.
//!
//! Codes are plain `Copy` values: operations hand them back to their
//! immediate caller, and failing ones are also recorded on the handle's
//! error chain together with a message.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of a configuration or runtime call
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReturnCode {
    Success,
    Failure,
    HostLookupFailure,
    ConnectionFailure,
    Timeout,
    NotFound,
    /// Wraps an operating-system error; the errno lives on the error record.
    Errno,
    MemoryAllocationFailure,
    InvalidArguments,
    ParseError,
    ParseUserError,
    InvalidHostProtocol,
    NotSupported,
    Deprecated,
}

impl ReturnCode {
    /// Canonical, human-readable text for the code
    pub fn as_str(self) -> &'static str {
        match self {
            ReturnCode::Success => "SUCCESS",
            ReturnCode::Failure => "FAILURE",
            ReturnCode::HostLookupFailure => "HOSTNAME LOOKUP FAILURE",
            ReturnCode::ConnectionFailure => "CONNECTION FAILURE",
            ReturnCode::Timeout => "A TIMEOUT OCCURRED",
            ReturnCode::NotFound => "NOT FOUND",
            ReturnCode::Errno => "SYSTEM ERROR",
            ReturnCode::MemoryAllocationFailure => "MEMORY ALLOCATION FAILURE",
            ReturnCode::InvalidArguments => "INVALID ARGUMENTS",
            ReturnCode::ParseError => "PARSE ERROR",
            ReturnCode::ParseUserError => "PARSE USER ERROR",
            ReturnCode::InvalidHostProtocol => "INVALID HOST PROTOCOL",
            ReturnCode::NotSupported => "ACTION NOT SUPPORTED",
            ReturnCode::Deprecated => "DEPRECATED",
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, ReturnCode::Success)
    }

    pub fn is_failure(self) -> bool {
        !self.is_success()
    }

    /// Convert to a `Result` so callers can use `?`
    pub fn into_result(self) -> Result<(), ReturnCode> {
        if self.is_success() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ReturnCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::error::Error for ReturnCode {}
