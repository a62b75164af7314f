//! Client handle
//!
//! The long-lived configuration context. A handle owns its settings, the
//! name of the configuration file it was pointed at, and its error chain;
//! all three are released when the handle is dropped (chain first).
//!
//! The free functions at the bottom of this module accept an optional
//! handle and degrade to no-ops or canonical answers when it is absent.

use std::io::{self, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::behavior::{Behavior, Behaviors, Distribution, HashAlgorithm};
use crate::error_chain::{ErrorChain, ErrorRecord};
use crate::loader;
use crate::parser;
use crate::return_code::ReturnCode;
use crate::server::{ServerEndpoint, Transport};

/// Everything directives can change
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub servers: Vec<ServerEndpoint>,
    pub behaviors: Behaviors,
    pub hash: HashAlgorithm,
    pub distribution: Distribution,
    /// Hash used by the distribution, when it differs from the key hash
    pub distribution_hash: Option<HashAlgorithm>,
    pub namespace: Option<String>,
}

/// A handle could not be built from an option string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct ConfigurationError {
    pub code: ReturnCode,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ClientHandle {
    // Declared first so the chain is released before the rest of the handle.
    errors: ErrorChain,
    settings: Settings,
    configuration_file: Option<Box<str>>,
}

impl ClientHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a handle from option text, loading the file named by
    /// `--CONFIGURE-FILE` if the text asked for one.
    pub fn from_configuration(option_string: &str) -> Result<Self, ConfigurationError> {
        let mut handle = Self::new();
        let mut rc = handle.parse_configuration(option_string);
        if rc.is_success() && handle.behavior_get(Behavior::LoadFromFile) != 0 {
            rc = handle.load_configuration_file();
        }

        if rc.is_failure() {
            return Err(ConfigurationError {
                code: rc,
                message: handle.last_error_message().to_string(),
            });
        }
        Ok(handle)
    }

    // =========================================================================
    // Configuration entry points
    // =========================================================================

    /// Apply inline option text to this handle
    pub fn parse_configuration(&mut self, option_string: &str) -> ReturnCode {
        parser::parse_configuration(self, option_string)
    }

    /// Replace the stored configuration filename
    pub fn set_configuration_file(&mut self, filename: &str) {
        self.configuration_file = Some(filename.into());
    }

    pub fn configuration_file(&self) -> Option<&str> {
        self.configuration_file.as_deref()
    }

    /// Load option lines from `path`
    pub fn parse_configure_file(&mut self, path: impl AsRef<Path>) -> ReturnCode {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return self.set_error(
                ReturnCode::InvalidArguments,
                Some("configuration filename is empty"),
            );
        }
        loader::parse_configure_file(self, path)
    }

    /// Load option lines from the stored configuration filename
    pub fn load_configuration_file(&mut self) -> ReturnCode {
        match self.configuration_file.clone() {
            Some(filename) if !filename.is_empty() => {
                loader::parse_configure_file(self, Path::new(&*filename))
            }
            _ => self.set_error(
                ReturnCode::InvalidArguments,
                Some("no configuration file has been set"),
            ),
        }
    }

    // =========================================================================
    // Settings
    // =========================================================================

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Restore default settings and drop every server
    pub fn reset_settings(&mut self) {
        self.settings = Settings::default();
    }

    pub fn behavior_get(&self, behavior: Behavior) -> u64 {
        self.settings.behaviors.get(behavior)
    }

    pub fn behavior_set(&mut self, behavior: Behavior, value: u64) {
        self.settings.behaviors.set(behavior, value);
    }

    pub fn hash(&self) -> HashAlgorithm {
        self.settings.hash
    }

    pub fn set_hash(&mut self, hash: HashAlgorithm) {
        self.settings.hash = hash;
    }

    pub fn distribution(&self) -> Distribution {
        self.settings.distribution
    }

    pub fn set_distribution(&mut self, distribution: Distribution, hash: Option<HashAlgorithm>) {
        self.settings.distribution = distribution;
        self.settings.distribution_hash = hash;
    }

    pub fn namespace(&self) -> Option<&str> {
        self.settings.namespace.as_deref()
    }

    pub fn set_namespace(&mut self, namespace: &str) {
        self.settings.namespace = if namespace.is_empty() {
            None
        } else {
            Some(namespace.to_string())
        };
    }

    pub fn servers(&self) -> &[ServerEndpoint] {
        &self.settings.servers
    }

    /// Append a server; network endpoints use UDP when `USE-UDP` is set
    pub fn add_server(&mut self, mut server: ServerEndpoint) {
        if server.transport == Transport::Tcp && self.settings.behaviors.use_udp {
            server.transport = Transport::Udp;
        }
        self.settings.servers.push(server);
    }

    // =========================================================================
    // Error chain
    // =========================================================================

    /// Record a failure. `Success` is never recorded.
    pub fn set_error(&mut self, code: ReturnCode, message: Option<&str>) -> ReturnCode {
        if code.is_success() {
            return ReturnCode::Success;
        }
        let _ = self.errors.push(code, 0, message);
        code
    }

    /// Record an operating-system failure
    pub fn set_errno(&mut self, local_errno: i32, message: Option<&str>) -> ReturnCode {
        let _ = self.errors.push(ReturnCode::Errno, local_errno, message);
        ReturnCode::Errno
    }

    pub fn errors(&self) -> &ErrorChain {
        &self.errors
    }

    pub fn last_error_record(&self) -> Option<&ErrorRecord> {
        self.errors.head()
    }

    pub fn last_error(&self) -> ReturnCode {
        self.errors
            .head()
            .map_or(ReturnCode::Success, ErrorRecord::code)
    }

    pub fn last_error_errno(&self) -> i32 {
        self.errors.head().map_or(0, ErrorRecord::local_errno)
    }

    pub fn last_error_message(&self) -> &str {
        match self.errors.head() {
            Some(record) => record.display_message(),
            None => ReturnCode::Success.as_str(),
        }
    }

    /// Write the whole chain, most recent first
    pub fn error_print<W: Write>(&self, out: &mut W) -> io::Result<()> {
        self.errors.print(out)
    }

    /// Drop every recorded error; the handle stays usable
    pub fn error_free(&mut self) {
        self.errors.clear();
    }
}

// =============================================================================
// Absent-handle tolerant helpers
// =============================================================================

pub fn set_error(
    handle: Option<&mut ClientHandle>,
    code: ReturnCode,
    message: Option<&str>,
) -> ReturnCode {
    match handle {
        Some(handle) => handle.set_error(code, message),
        None => code,
    }
}

pub fn set_errno(
    handle: Option<&mut ClientHandle>,
    local_errno: i32,
    message: Option<&str>,
) -> ReturnCode {
    match handle {
        Some(handle) => handle.set_errno(local_errno, message),
        None => ReturnCode::Errno,
    }
}

pub fn last_error(handle: Option<&ClientHandle>) -> ReturnCode {
    handle.map_or(ReturnCode::InvalidArguments, ClientHandle::last_error)
}

pub fn last_error_errno(handle: Option<&ClientHandle>) -> i32 {
    handle.map_or(0, ClientHandle::last_error_errno)
}

pub fn last_error_message(handle: Option<&ClientHandle>) -> &str {
    match handle {
        Some(handle) => handle.last_error_message(),
        None => ReturnCode::InvalidArguments.as_str(),
    }
}

/// Print the chain to stderr
pub fn error_print(handle: Option<&ClientHandle>) {
    if let Some(handle) = handle {
        let _ = handle.error_print(&mut io::stderr().lock());
    }
}

pub fn error_free(handle: Option<&mut ClientHandle>) {
    if let Some(handle) = handle {
        handle.error_free();
    }
}
