//! cacheconf: option-string configuration for cache client handles
//!
//! Re-exports the core parser, registry and error chain from
//! `cacheconf-core` and adds the settings report used by the `cacheconf`
//! command-line tool.
//!
//! ```
//! use cacheconf::{Behavior, ClientHandle, ReturnCode};
//!
//! let mut handle = ClientHandle::new();
//! assert_eq!(
//!     handle.parse_configuration("--SERVER=127.0.0.1:11211 --BINARY-PROTOCOL"),
//!     ReturnCode::Success
//! );
//! assert_eq!(handle.servers().len(), 1);
//! assert_eq!(handle.behavior_get(Behavior::BinaryProtocol), 1);
//! ```

pub mod report;

pub use cacheconf_core::*;
