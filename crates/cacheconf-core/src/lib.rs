//! cacheconf-core: option-string configuration for cache client handles
//!
//! This crate contains the configuration layer with NO network code:
//! - Return codes and their canonical strings
//! - Per-handle error chain (most recent failure first)
//! - Nom-based tokenizer with line/column positions
//! - Static directive registry and the parser that dispatches it
//! - Line-oriented configuration file loader
//! - `check_configuration` for validating text without a live handle
//!
//! Protocol, hashing and connection handling consume the resulting
//! [`Settings`] and live elsewhere.

pub mod behavior;
pub mod check;
pub mod error_chain;
pub mod handle;
pub mod loader;
pub mod parser;
pub mod registry;
pub mod return_code;
pub mod server;
pub mod tokenizer;

// Re-export commonly used types
pub use behavior::{Behavior, Behaviors, Distribution, HashAlgorithm};
pub use check::check_configuration;
pub use error_chain::{ErrorChain, ErrorRecord};
pub use handle::{ClientHandle, ConfigurationError, Settings};
pub use parser::{parse_configuration, DirectiveError};
pub use registry::{Arity, Directive, ValueType};
pub use return_code::ReturnCode;
pub use server::{EndpointError, ServerEndpoint, Transport};
pub use tokenizer::{tokenize, Token, TokenKind, Tokenizer};
