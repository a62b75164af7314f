//! Parser / Context
//!
//! Consumes tokens, matches directives against the registry, validates value
//! shape, and dispatches the bound action against a handle.
//!
//! ## Pipeline
//!
//! ```text
//! Start -> ReadDirective -> ValidateShape -> Dispatch -> (Start | Fail)
//! ```
//!
//! The first failure is recorded on the handle's error chain and ends the
//! call. Directives applied before it keep their effect; there is no
//! rollback. Successes are never recorded.

use std::iter::Peekable;

use thiserror::Error;
use tracing::debug;

use crate::behavior::{Behavior, Distribution, HashAlgorithm};
use crate::handle::ClientHandle;
use crate::registry::{self, Action, Arity, Directive, ValueType};
use crate::return_code::ReturnCode;
use crate::server::{EndpointError, ServerEndpoint};
use crate::tokenizer::{Token, TokenKind, Tokenizer};

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Why a directive was rejected; the `Display` text is what gets recorded
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectiveError {
    #[error("syntax error at {position}: {message}")]
    Syntax { message: String, position: String },

    #[error("unknown directive '--{name}' at {position}")]
    UnknownDirective { name: String, position: String },

    #[error("value '{value}' at {position} does not follow a directive")]
    StrayValue { value: String, position: String },

    #[error("'--{directive}' requires a value")]
    MissingValue { directive: &'static str },

    #[error("'--{directive}' does not take a value")]
    UnexpectedValue { directive: &'static str },

    #[error("'--{directive}' takes a single value")]
    TooManyValues { directive: &'static str },

    #[error("'--{directive}' expects an integer, got '{value}'")]
    NotAnInteger {
        directive: &'static str,
        value: String,
    },

    #[error("'--{directive}' expects a keyword, got a quoted value")]
    NotAKeyword { directive: &'static str },

    #[error("unknown {what} '{value}' for '--{directive}'")]
    UnknownKeyword {
        directive: &'static str,
        what: &'static str,
        value: String,
    },

    #[error("invalid server '{value}': {reason}")]
    InvalidServer { value: String, reason: EndpointError },

    #[error("'--ERROR' directive encountered")]
    UserError,
}

impl DirectiveError {
    pub fn return_code(&self) -> ReturnCode {
        match self {
            DirectiveError::Syntax { .. } => ReturnCode::ParseError,
            DirectiveError::InvalidServer { .. } => ReturnCode::InvalidHostProtocol,
            DirectiveError::UserError => ReturnCode::ParseUserError,
            _ => ReturnCode::InvalidArguments,
        }
    }
}

/// A typed, shape-checked directive value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectiveValue {
    Text(String),
    Integer(u64),
    Keyword(String),
}

impl DirectiveValue {
    fn as_text(&self) -> &str {
        match self {
            DirectiveValue::Text(s) | DirectiveValue::Keyword(s) => s,
            DirectiveValue::Integer(_) => "",
        }
    }
}

/// Whether parsing continues after an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Apply `option_string` to `handle`, stopping at the first failure
pub fn parse_configuration(handle: &mut ClientHandle, option_string: &str) -> ReturnCode {
    ParseContext::new(handle, option_string).run()
}

// =============================================================================
// CONTEXT
// =============================================================================

struct ParseContext<'h, 'a> {
    tokens: Peekable<Tokenizer<'a>>,
    handle: &'h mut ClientHandle,
    rc: ReturnCode,
}

impl<'h, 'a> ParseContext<'h, 'a> {
    fn new(handle: &'h mut ClientHandle, option_string: &'a str) -> Self {
        Self {
            tokens: Tokenizer::new(option_string).peekable(),
            handle,
            rc: ReturnCode::Success,
        }
    }

    fn run(mut self) -> ReturnCode {
        while let Some(token) = self.tokens.next() {
            let step = match token.kind {
                TokenKind::Separator => Ok(Flow::Continue),
                TokenKind::End => Ok(Flow::Stop),
                TokenKind::Directive => self.directive(&token),
                TokenKind::Value | TokenKind::QuotedValue => Err(DirectiveError::StrayValue {
                    value: token.text.to_string(),
                    position: token.position(),
                }),
                TokenKind::Syntax => Err(syntax_error(&token)),
            };

            match step {
                Ok(Flow::Continue) => {}
                Ok(Flow::Stop) => break,
                Err(err) => {
                    let message = err.to_string();
                    self.rc = self.handle.set_error(err.return_code(), Some(&message));
                    debug!(rc = %self.rc, %message, "configuration rejected");
                    break;
                }
            }
        }
        self.rc
    }

    fn directive(&mut self, token: &Token<'a>) -> Result<Flow, DirectiveError> {
        let directive =
            registry::lookup(&token.text).ok_or_else(|| DirectiveError::UnknownDirective {
                name: token.text.to_string(),
                position: token.position(),
            })?;

        let values = self.values(directive)?;
        debug!(directive = directive.name, values = values.len(), "applying directive");
        apply(self.handle, directive, &values)
    }

    /// Pull the value tokens following a directive and check them against
    /// its declared arity and type
    fn values(&mut self, directive: &Directive) -> Result<Vec<DirectiveValue>, DirectiveError> {
        let mut tokens = Vec::new();
        while let Some(kind) = self.tokens.peek().map(|t| t.kind) {
            match kind {
                TokenKind::Value | TokenKind::QuotedValue | TokenKind::Syntax => {}
                _ => break,
            }
            let Some(token) = self.tokens.next() else {
                break;
            };
            if kind == TokenKind::Syntax {
                return Err(syntax_error(&token));
            }
            tokens.push(token);
        }

        match (directive.arity, tokens.len()) {
            (Arity::None, 0) => {}
            (Arity::None, _) => {
                return Err(DirectiveError::UnexpectedValue {
                    directive: directive.name,
                })
            }
            (Arity::One | Arity::OneOrMore, 0) => {
                return Err(DirectiveError::MissingValue {
                    directive: directive.name,
                })
            }
            (Arity::One, 1) | (Arity::OneOrMore, _) => {}
            (Arity::One, _) => {
                return Err(DirectiveError::TooManyValues {
                    directive: directive.name,
                })
            }
        }

        tokens
            .into_iter()
            .map(|token| typed_value(directive, token))
            .collect()
    }
}

fn syntax_error(token: &Token<'_>) -> DirectiveError {
    DirectiveError::Syntax {
        message: token.text.to_string(),
        position: token.position(),
    }
}

fn typed_value(directive: &Directive, token: Token<'_>) -> Result<DirectiveValue, DirectiveError> {
    match directive.value_type {
        ValueType::String => Ok(DirectiveValue::Text(token.text.into_owned())),
        ValueType::Integer => parse_integer(&token.text)
            .map(DirectiveValue::Integer)
            .ok_or_else(|| DirectiveError::NotAnInteger {
                directive: directive.name,
                value: token.text.to_string(),
            }),
        ValueType::Keyword if token.kind == TokenKind::QuotedValue => {
            Err(DirectiveError::NotAKeyword {
                directive: directive.name,
            })
        }
        ValueType::Keyword => Ok(DirectiveValue::Keyword(token.text.into_owned())),
    }
}

/// Plain decimal digits only; no sign
fn parse_integer(text: &str) -> Option<u64> {
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

// =============================================================================
// ACTIONS
// =============================================================================

fn apply(
    handle: &mut ClientHandle,
    directive: &Directive,
    values: &[DirectiveValue],
) -> Result<Flow, DirectiveError> {
    match directive.action {
        Action::Flag(behavior) => handle.behavior_set(behavior, 1),
        Action::Tunable(behavior) => {
            if let Some(DirectiveValue::Integer(value)) = values.first() {
                handle.behavior_set(behavior, *value);
            }
        }
        Action::Server => {
            for value in values {
                add_server(handle, value.as_text(), ServerEndpoint::parse)?;
            }
        }
        Action::Servers => {
            for value in values {
                for item in value.as_text().split(',').filter(|s| !s.is_empty()) {
                    add_server(handle, item, ServerEndpoint::parse)?;
                }
            }
        }
        Action::Socket => {
            for value in values {
                add_server(handle, value.as_text(), ServerEndpoint::parse_socket)?;
            }
        }
        Action::ConfigureFile => {
            if let Some(value) = values.first() {
                handle.set_configuration_file(value.as_text());
                handle.behavior_set(Behavior::LoadFromFile, 1);
            }
        }
        Action::Namespace => {
            if let Some(value) = values.first() {
                handle.set_namespace(value.as_text());
            }
        }
        Action::Hash => {
            if let Some(value) = values.first() {
                let hash = parse_hash(directive, value.as_text())?;
                handle.set_hash(hash);
            }
        }
        Action::Distribution => {
            if let Some(value) = values.first() {
                let (distribution, hash) = parse_distribution(directive, value.as_text())?;
                handle.set_distribution(distribution, hash);
            }
        }
        Action::Reset => handle.reset_settings(),
        Action::End => return Ok(Flow::Stop),
        Action::UserError => return Err(DirectiveError::UserError),
    }
    Ok(Flow::Continue)
}

fn add_server(
    handle: &mut ClientHandle,
    text: &str,
    parse: fn(&str) -> Result<ServerEndpoint, EndpointError>,
) -> Result<(), DirectiveError> {
    let server = parse(text).map_err(|reason| DirectiveError::InvalidServer {
        value: text.to_string(),
        reason,
    })?;
    debug!(server = %server, "adding server");
    handle.add_server(server);
    Ok(())
}

fn parse_hash(directive: &Directive, text: &str) -> Result<HashAlgorithm, DirectiveError> {
    text.parse::<HashAlgorithm>().map_err(|_| DirectiveError::UnknownKeyword {
        directive: directive.name,
        what: "hash algorithm",
        value: text.to_string(),
    })
}

/// `KIND` or `KIND,HASH`
fn parse_distribution(
    directive: &Directive,
    text: &str,
) -> Result<(Distribution, Option<HashAlgorithm>), DirectiveError> {
    let (kind, hash) = match text.split_once(',') {
        Some((kind, hash)) => (kind, Some(hash)),
        None => (text, None),
    };

    let distribution = kind.parse::<Distribution>().map_err(|_| DirectiveError::UnknownKeyword {
        directive: directive.name,
        what: "distribution",
        value: kind.to_string(),
    })?;
    let hash = hash.map(|h| parse_hash(directive, h)).transpose()?;
    Ok((distribution, hash))
}
