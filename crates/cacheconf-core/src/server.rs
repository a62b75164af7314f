//! Server endpoints
//!
//! Accepted forms:
//!
//! ```text
//! host                    default port, weight 1
//! host:port
//! host:port/?weight
//! [v6-address]:port
//! /path/to/socket[/?weight]
//! ```

use std::fmt;

use nom::{
    branch::alt,
    bytes::complete::{tag, take_till1, take_while1},
    character::complete::{char, digit1},
    combinator::{all_consuming, opt},
    sequence::{delimited, preceded},
    IResult,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 11211;
pub const DEFAULT_WEIGHT: u32 = 1;

/// Transport used to reach a server
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transport {
    Tcp,
    Udp,
    UnixSocket,
}

/// One configured cache server
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEndpoint {
    pub host: String,
    /// 0 for unix sockets
    pub port: u16,
    pub weight: u32,
    pub transport: Transport,
}

impl ServerEndpoint {
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            weight: DEFAULT_WEIGHT,
            transport: Transport::Tcp,
        }
    }

    pub fn unix_socket(path: impl Into<String>) -> Self {
        Self {
            host: path.into(),
            port: 0,
            weight: DEFAULT_WEIGHT,
            transport: Transport::UnixSocket,
        }
    }

    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    /// Parse a network endpoint (or socket path, if it starts with `/`)
    pub fn parse(text: &str) -> Result<Self, EndpointError> {
        if text.starts_with('/') {
            return Self::parse_socket(text);
        }

        let (_, (host, port, weight)) = all_consuming(network_endpoint)(text)
            .map_err(|_| EndpointError::Malformed)?;

        let port = match port {
            Some(digits) => parse_port(digits)?,
            None => DEFAULT_PORT,
        };

        let mut endpoint = Self::tcp(host, port);
        if let Some(digits) = weight {
            endpoint.weight = parse_weight(digits)?;
        }
        Ok(endpoint)
    }

    /// Parse `path[/?weight]`
    pub fn parse_socket(text: &str) -> Result<Self, EndpointError> {
        let (path, weight) = match text.rsplit_once("/?") {
            Some((path, digits)) => (path, Some(parse_weight(digits)?)),
            None => (text, None),
        };
        if path.is_empty() || path.chars().any(char::is_whitespace) {
            return Err(EndpointError::Malformed);
        }

        let mut endpoint = Self::unix_socket(path);
        if let Some(weight) = weight {
            endpoint.weight = weight;
        }
        Ok(endpoint)
    }
}

impl fmt::Display for ServerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.transport {
            Transport::UnixSocket => write!(f, "{}", self.host)?,
            _ if self.host.contains(':') => write!(f, "[{}]:{}", self.host, self.port)?,
            _ => write!(f, "{}:{}", self.host, self.port)?,
        }
        if self.weight != DEFAULT_WEIGHT {
            write!(f, "/?{}", self.weight)?;
        }
        Ok(())
    }
}

/// Why an endpoint was rejected
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EndpointError {
    #[error("expected host[:port][/?weight]")]
    Malformed,

    #[error("port must be between 1 and 65535")]
    InvalidPort,

    #[error("weight must be a positive integer")]
    InvalidWeight,
}

fn network_endpoint(input: &str) -> IResult<&str, (&str, Option<&str>, Option<&str>)> {
    let (input, host) = alt((
        delimited(char('['), take_till1(|c: char| c == ']'), char(']')),
        take_while1(|c: char| c != ':' && c != '/' && !c.is_whitespace()),
    ))(input)?;
    let (input, port) = opt(preceded(char(':'), digit1))(input)?;
    let (input, weight) = opt(preceded(tag("/?"), digit1))(input)?;
    Ok((input, (host, port, weight)))
}

fn parse_port(digits: &str) -> Result<u16, EndpointError> {
    match digits.parse::<u16>() {
        Ok(0) | Err(_) => Err(EndpointError::InvalidPort),
        Ok(port) => Ok(port),
    }
}

fn parse_weight(digits: &str) -> Result<u32, EndpointError> {
    match digits.parse::<u32>() {
        Ok(0) | Err(_) => Err(EndpointError::InvalidWeight),
        Ok(weight) => Ok(weight),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_host_and_port() {
        let endpoint = ServerEndpoint::parse("127.0.0.1:11211").unwrap();
        assert_eq!(endpoint, ServerEndpoint::tcp("127.0.0.1", 11211));
        assert_eq!(endpoint.to_string(), "127.0.0.1:11211");
    }

    #[test]
    fn test_default_port() {
        let endpoint = ServerEndpoint::parse("cache.internal").unwrap();
        assert_eq!(endpoint.port, DEFAULT_PORT);
    }

    #[test]
    fn test_weight() {
        let endpoint = ServerEndpoint::parse("host:11212/?5").unwrap();
        assert_eq!(endpoint, ServerEndpoint::tcp("host", 11212).with_weight(5));
        assert_eq!(endpoint.to_string(), "host:11212/?5");
    }

    #[test]
    fn test_ipv6() {
        let endpoint = ServerEndpoint::parse("[::1]:11211").unwrap();
        assert_eq!(endpoint.host, "::1");
        assert_eq!(endpoint.to_string(), "[::1]:11211");
    }

    #[test]
    fn test_unix_socket() {
        let endpoint = ServerEndpoint::parse("/var/run/memcached.sock/?3").unwrap();
        assert_eq!(endpoint.transport, Transport::UnixSocket);
        assert_eq!(endpoint.host, "/var/run/memcached.sock");
        assert_eq!(endpoint.weight, 3);
    }

    #[test]
    fn test_rejects_bad_port() {
        assert_eq!(
            ServerEndpoint::parse("host:0"),
            Err(EndpointError::InvalidPort)
        );
        assert_eq!(
            ServerEndpoint::parse("host:70000"),
            Err(EndpointError::InvalidPort)
        );
    }

    #[test]
    fn test_rejects_malformed() {
        assert_eq!(ServerEndpoint::parse("host:"), Err(EndpointError::Malformed));
        assert_eq!(ServerEndpoint::parse(":11211"), Err(EndpointError::Malformed));
        assert_eq!(ServerEndpoint::parse("host:abc"), Err(EndpointError::Malformed));
        assert_eq!(ServerEndpoint::parse(""), Err(EndpointError::Malformed));
    }

    #[test]
    fn test_rejects_zero_weight() {
        assert_eq!(
            ServerEndpoint::parse("host:11211/?0"),
            Err(EndpointError::InvalidWeight)
        );
    }
}
