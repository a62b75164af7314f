//! Settings report
//!
//! Renders the settings held by a handle, either as a human-readable summary
//! or as option text that reproduces them when parsed again.

use std::fmt::Write;

use cacheconf_core::registry::{Action, DIRECTIVES};
use cacheconf_core::{
    Behavior, Behaviors, ClientHandle, Distribution, HashAlgorithm, Settings, Transport,
};

/// Human-readable summary of `settings`
pub fn render_text(settings: &Settings) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "servers ({}):", settings.servers.len());
    for server in &settings.servers {
        let transport = match server.transport {
            Transport::Tcp => "tcp",
            Transport::Udp => "udp",
            Transport::UnixSocket => "socket",
        };
        let _ = writeln!(out, "  {server} [{transport}]");
    }

    let _ = writeln!(out, "hash: {}", settings.hash.keyword());
    match settings.distribution_hash {
        Some(hash) => {
            let _ = writeln!(
                out,
                "distribution: {} (hash {})",
                settings.distribution.keyword(),
                hash.keyword()
            );
        }
        None => {
            let _ = writeln!(out, "distribution: {}", settings.distribution.keyword());
        }
    }
    if let Some(namespace) = &settings.namespace {
        let _ = writeln!(out, "namespace: {namespace:?}");
    }

    let _ = writeln!(out, "behaviors:");
    for directive in DIRECTIVES {
        match directive.action {
            Action::Flag(behavior) => {
                let on = settings.behaviors.get(behavior) != 0;
                let _ = writeln!(
                    out,
                    "  {}: {}",
                    directive.name.to_ascii_lowercase(),
                    if on { "on" } else { "off" }
                );
            }
            Action::Tunable(behavior) => {
                let _ = writeln!(
                    out,
                    "  {}: {}",
                    directive.name.to_ascii_lowercase(),
                    settings.behaviors.get(behavior)
                );
            }
            _ => {}
        }
    }

    out
}

/// Option text that rebuilds the settings of `handle` on a fresh handle, one
/// directive per line. Values equal to the defaults are left out.
///
/// A requested configuration file is emitted as `--CONFIGURE-FILE`, which
/// only records the file; the servers it contributed are emitted inline.
pub fn to_option_string(handle: &ClientHandle) -> String {
    let settings = handle.settings();
    let defaults = Behaviors::default();
    let mut lines = Vec::new();

    for directive in DIRECTIVES {
        match directive.action {
            // USE-UDP is placed with the servers it applies to.
            Action::Flag(Behavior::UseUdp) => {}
            Action::Flag(behavior) if settings.behaviors.get(behavior) != 0 => {
                lines.push(format!("--{}", directive.name));
            }
            Action::Tunable(behavior) => {
                let value = settings.behaviors.get(behavior);
                if value != defaults.get(behavior) {
                    lines.push(format!("--{}={}", directive.name, value));
                }
            }
            _ => {}
        }
    }

    if settings.hash != HashAlgorithm::Default {
        lines.push(format!("--HASH={}", settings.hash.keyword()));
    }
    if settings.distribution != Distribution::Modula || settings.distribution_hash.is_some() {
        let mut value = settings.distribution.keyword().to_string();
        if let Some(hash) = settings.distribution_hash {
            value.push(',');
            value.push_str(hash.keyword());
        }
        lines.push(format!("--DISTRIBUTION={value}"));
    }
    if let Some(namespace) = &settings.namespace {
        lines.push(format!("--NAMESPACE={}", quote(namespace)));
    }

    // Servers keep their order; USE-UDP goes in front of the first UDP one
    // so earlier TCP servers stay TCP.
    let mut udp = false;
    for server in &settings.servers {
        if server.transport == Transport::Udp && !udp {
            lines.push("--USE-UDP".to_string());
            udp = true;
        }
        match server.transport {
            Transport::UnixSocket => lines.push(format!("--SOCKET={server}")),
            Transport::Tcp | Transport::Udp => lines.push(format!("--SERVER={server}")),
        }
    }
    if settings.behaviors.use_udp && !udp {
        lines.push("--USE-UDP".to_string());
    }

    if settings.behaviors.load_from_file {
        if let Some(file) = handle.configuration_file() {
            lines.push(format!("--CONFIGURE-FILE={}", quote(file)));
        }
    }

    lines.join("\n")
}

fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}
