//! End-to-end configuration tests
//!
//! Drives the public API the way a client library does: inline option text,
//! configuration files, and the scratch-handle validator.

use std::io::Write;

use cacheconf_core::handle::error_free;
use cacheconf_core::registry::{self, Action, Arity, ValueType};
use cacheconf_core::{
    check_configuration, Behavior, ClientHandle, Distribution, HashAlgorithm, ReturnCode,
    Transport,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tempfile::NamedTempFile;

fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// A valid value for every directive shape in the registry
fn sample_value(directive: &registry::Directive) -> Option<&'static str> {
    match (directive.arity, directive.value_type, directive.action) {
        (Arity::None, _, _) => None,
        (_, ValueType::Integer, _) => Some("42"),
        (_, _, Action::Hash) => Some("murmur"),
        (_, _, Action::Distribution) => Some("ketama"),
        (_, _, Action::Socket) => Some("/var/run/cache.sock"),
        (_, _, Action::Namespace) => Some("app:"),
        (_, _, Action::ConfigureFile) => Some("/etc/cacheconf/cache.conf"),
        _ => Some("cache-1.internal:11211"),
    }
}

#[test]
fn every_known_directive_applies_cleanly() {
    for directive in registry::DIRECTIVES {
        if matches!(directive.action, Action::UserError) {
            continue;
        }

        let text = match sample_value(directive) {
            Some(value) => format!("--{}={}", directive.name, value),
            None => format!("--{}", directive.name),
        };

        let mut handle = ClientHandle::new();
        let rc = handle.parse_configuration(&text);
        assert_eq!(rc, ReturnCode::Success, "{text}: {}", handle.last_error_message());
        assert!(handle.errors().is_empty(), "{text}");

        match directive.action {
            Action::Flag(behavior) => assert_eq!(handle.behavior_get(behavior), 1, "{text}"),
            Action::Tunable(behavior) => assert_eq!(handle.behavior_get(behavior), 42, "{text}"),
            Action::Server | Action::Servers | Action::Socket => {
                assert_eq!(handle.servers().len(), 1, "{text}")
            }
            Action::Hash => assert_eq!(handle.hash(), HashAlgorithm::Murmur),
            Action::Distribution => assert_eq!(handle.distribution(), Distribution::Ketama),
            Action::Namespace => assert_eq!(handle.namespace(), Some("app:")),
            Action::ConfigureFile => {
                assert_eq!(handle.configuration_file(), Some("/etc/cacheconf/cache.conf"))
            }
            Action::Reset | Action::End | Action::UserError => {}
        }
    }
}

#[test]
fn scenario_single_server() {
    let mut handle = ClientHandle::new();
    assert_eq!(
        handle.parse_configuration("--SERVER=127.0.0.1:11211"),
        ReturnCode::Success
    );
    assert_eq!(handle.servers().len(), 1);
    assert_eq!(handle.servers()[0].host, "127.0.0.1");
    assert_eq!(handle.servers()[0].port, 11211);
    assert_eq!(handle.servers()[0].transport, Transport::Tcp);
}

#[test]
fn scenario_unknown_flag() {
    let mut handle = ClientHandle::new();
    assert_eq!(
        handle.parse_configuration("--NOT-A-REAL-FLAG"),
        ReturnCode::InvalidArguments
    );
    assert!(handle.last_error_message().contains("NOT-A-REAL-FLAG"));
}

#[test]
fn file_loader_keeps_lines_before_the_failure() {
    let file = config_file("--SERVER=host:11211\n--BAD\n");
    let mut handle = ClientHandle::new();

    let rc = handle.parse_configure_file(file.path());
    assert_eq!(rc, ReturnCode::InvalidArguments);
    assert_eq!(handle.servers().len(), 1);
    assert_eq!(handle.servers()[0].to_string(), "host:11211");
}

#[test]
fn file_loader_rejects_empty_path() {
    let mut handle = ClientHandle::new();
    assert_eq!(handle.parse_configure_file(""), ReturnCode::InvalidArguments);
}

#[test]
fn from_configuration_loads_the_named_file() {
    let file = config_file(
        "# production pool\n\
         --SERVERS=cache-1:11211,cache-2:11211\n\
         \n\
         --BINARY-PROTOCOL\n\
         --DISTRIBUTION=consistent\n",
    );
    let text = format!("--CONFIGURE-FILE={} --TCP-NODELAY", file.path().display());

    let handle = ClientHandle::from_configuration(&text).unwrap();
    assert_eq!(handle.servers().len(), 2);
    assert_eq!(handle.behavior_get(Behavior::BinaryProtocol), 1);
    assert_eq!(handle.behavior_get(Behavior::TcpNodelay), 1);
    assert_eq!(handle.distribution(), Distribution::Consistent);
}

#[test]
fn from_configuration_reports_the_failure() {
    let err = ClientHandle::from_configuration("--SERVER=a:1 --HASH=sha1").unwrap_err();
    assert_eq!(err.code, ReturnCode::InvalidArguments);
    assert_eq!(err.message, "unknown hash algorithm 'sha1' for '--HASH'");
    assert_eq!(
        err.to_string(),
        "INVALID ARGUMENTS: unknown hash algorithm 'sha1' for '--HASH'"
    );
}

#[test]
fn check_configuration_follows_the_configure_file() {
    let file = config_file("--SERVER=a:1\n--ERROR\n");
    let text = format!("--CONFIGURE-FILE={}", file.path().display());

    let mut buffer = [0u8; 256];
    let rc = check_configuration(&text, Some(&mut buffer[..]));
    assert_eq!(rc, ReturnCode::ParseUserError);
    assert_ne!(buffer[0], 0);
}

#[test]
fn error_free_tears_down_the_chain() {
    let mut handle = ClientHandle::new();
    for i in 0..10 {
        let _ = handle.parse_configuration(&format!("--UNKNOWN-{i}"));
    }
    assert_eq!(handle.errors().len(), 10);
    assert!(handle.last_error_message().contains("UNKNOWN-9"));

    error_free(Some(&mut handle));
    assert_eq!(handle.last_error(), ReturnCode::Success);
    assert_eq!(handle.last_error_message(), ReturnCode::Success.as_str());
}

#[test]
fn error_print_lists_newest_first() {
    let mut handle = ClientHandle::new();
    let _ = handle.parse_configuration("--FIRST");
    let _ = handle.parse_configuration("--ERROR");

    let mut out = Vec::new();
    handle.error_print(&mut out).unwrap();
    let printed = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = printed.lines().collect();
    assert_eq!(
        lines,
        vec![
            "PARSE USER ERROR '--ERROR' directive encountered",
            "INVALID ARGUMENTS unknown directive '--FIRST' at 1:1",
        ]
    );
}

proptest! {
    #[test]
    fn unknown_directives_are_rejected(name in "[A-Z][A-Z0-9-]{0,24}") {
        prop_assume!(registry::lookup(&name).is_none());

        let mut handle = ClientHandle::new();
        let rc = handle.parse_configuration(&format!("--{name}"));
        prop_assert_eq!(rc, ReturnCode::InvalidArguments);
        prop_assert!(handle.last_error_message().contains(&name));
        prop_assert_eq!(handle.errors().len(), 1);
    }

    #[test]
    fn empty_text_never_writes_past_the_first_byte(capacity in 1usize..32) {
        let mut buffer = vec![0xAAu8; capacity];
        let rc = check_configuration("", Some(&mut buffer[..]));
        prop_assert_eq!(rc, ReturnCode::InvalidArguments);
        prop_assert_eq!(buffer[0], 0);
        prop_assert!(buffer[1..].iter().all(|&b| b == 0xAA));
    }
}
