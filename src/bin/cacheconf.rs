//! cacheconf command line interface
//!
//! Validates and inspects cache client option strings and files.
//!
//! # Usage
//!
//! ```bash
//! # Validate inline options
//! cacheconf check '--SERVER=127.0.0.1:11211 --BINARY-PROTOCOL'
//!
//! # Validate a configuration file (or set CACHECONF_FILE)
//! cacheconf check --file /etc/cacheconf/cache.conf
//!
//! # Show the settings an option string produces
//! cacheconf show '--SERVERS=a:11211,b:11211 --HASH=md5' --format json
//!
//! # List every directive
//! cacheconf directives
//! ```

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde::Serialize;
use tracing::debug;

use cacheconf::registry::{self, Action, Arity, ValueType};
use cacheconf::report;
use cacheconf::{check, ClientHandle, ReturnCode, Settings};

/// Size of the message buffer handed to `check_configuration`
const MESSAGE_CAPACITY: usize = 1024;

#[derive(Parser)]
#[command(name = "cacheconf")]
#[command(version)]
#[command(about = "Validate and inspect cache client configuration")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, short = 'o', global = true, default_value = "text", value_enum)]
    format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    /// Option text that reproduces the settings (`show` only)
    Options,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate inline options or a configuration file
    Check {
        /// Option string, e.g. "--SERVER=localhost:11211"
        options: Option<String>,

        /// Configuration file, used when no option string is given
        #[arg(short, long, env = "CACHECONF_FILE")]
        file: Option<PathBuf>,
    },

    /// Build a handle from options and print its settings
    Show {
        /// Option string; may name a file with --CONFIGURE-FILE
        options: String,
    },

    /// List every directive with its value shape
    Directives,
}

#[derive(Serialize)]
struct CheckOutput<'a> {
    valid: bool,
    code: ReturnCode,
    message: Option<&'a str>,
}

#[derive(Serialize)]
struct ShowOutput<'a> {
    configuration_file: Option<&'a str>,
    settings: &'a Settings,
}

#[derive(Serialize)]
struct DirectiveOutput {
    name: &'static str,
    arity: &'static str,
    value_type: Option<&'static str>,
}

// =============================================================================
// MAIN
// =============================================================================

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check { options, file } => cmd_check(options, file, cli.format),
        Commands::Show { options } => cmd_show(&options, cli.format).map(|()| true),
        Commands::Directives => cmd_directives(cli.format).map(|()| true),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            if cli.format == OutputFormat::Json {
                println!("{}", serde_json::json!({ "error": format!("{e:#}") }));
            } else {
                eprintln!("{}: {:#}", "error".red().bold(), e);
            }
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

/// Returns whether the configuration is valid
fn cmd_check(
    options: Option<String>,
    file: Option<PathBuf>,
    format: OutputFormat,
) -> Result<bool> {
    match (options, file) {
        (Some(options), _) => check_options(&options, format),
        (None, Some(path)) => check_file(path, format),
        (None, None) => bail!("nothing to check: pass an option string or --file"),
    }
}

fn check_options(options: &str, format: OutputFormat) -> Result<bool> {
    let mut buffer = [0u8; MESSAGE_CAPACITY];
    let rc = check::check_configuration(options, Some(&mut buffer[..]));
    debug!(rc = %rc, "checked option string");

    let message = String::from_utf8_lossy(check::message_in(&buffer)).into_owned();
    let message = if rc.is_failure() && message.is_empty() {
        rc.as_str().to_string()
    } else {
        message
    };

    print_check(rc, rc.is_failure().then_some(message.as_str()), format)?;
    Ok(rc.is_success())
}

fn check_file(path: PathBuf, format: OutputFormat) -> Result<bool> {
    let mut handle = ClientHandle::new();
    let rc = handle.parse_configure_file(&path);
    debug!(path = %path.display(), rc = %rc, "checked configuration file");

    if rc.is_failure() && format == OutputFormat::Text {
        eprintln!("{} {}", "FAILED".red().bold(), path.display());
        handle
            .error_print(&mut io::stderr().lock())
            .context("writing error chain")?;
        return Ok(false);
    }

    print_check(rc, rc.is_failure().then(|| handle.last_error_message()), format)?;
    Ok(rc.is_success())
}

fn print_check(rc: ReturnCode, message: Option<&str>, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let output = CheckOutput {
                valid: rc.is_success(),
                code: rc,
                message,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&output).context("JSON serialization failed")?
            );
        }
        OutputFormat::Text | OutputFormat::Options => match message {
            None => println!("{}", "OK".green()),
            Some(message) => println!("{} {}", rc.as_str().red(), message),
        },
    }
    Ok(())
}

fn cmd_show(options: &str, format: OutputFormat) -> Result<()> {
    let handle = ClientHandle::from_configuration(options).context("invalid configuration")?;

    match format {
        OutputFormat::Json => {
            let output = ShowOutput {
                configuration_file: handle.configuration_file(),
                settings: handle.settings(),
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&output).context("JSON serialization failed")?
            );
        }
        OutputFormat::Options => println!("{}", report::to_option_string(&handle)),
        OutputFormat::Text => {
            if let Some(file) = handle.configuration_file() {
                println!("configuration file: {file}");
            }
            print!("{}", report::render_text(handle.settings()));
        }
    }
    Ok(())
}

fn cmd_directives(format: OutputFormat) -> Result<()> {
    let directives: Vec<DirectiveOutput> = registry::DIRECTIVES
        .iter()
        .map(|d| DirectiveOutput {
            name: d.name,
            arity: match d.arity {
                Arity::None => "none",
                Arity::One => "one",
                Arity::OneOrMore => "one-or-more",
            },
            value_type: match (d.arity, d.value_type) {
                (Arity::None, _) => None,
                (_, ValueType::String) => Some("string"),
                (_, ValueType::Integer) => Some("integer"),
                (_, ValueType::Keyword) => Some("keyword"),
            },
        })
        .collect();

    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&directives).context("JSON serialization failed")?
        ),
        OutputFormat::Text | OutputFormat::Options => {
            for (directive, output) in registry::DIRECTIVES.iter().zip(&directives) {
                let usage = match output.value_type {
                    Some(kind) if matches!(directive.action, Action::Servers) => {
                        format!("--{}=<{kind}>[,...]", directive.name)
                    }
                    Some(kind) => format!("--{}=<{kind}>", directive.name),
                    None => format!("--{}", directive.name),
                };
                println!("  {}", usage.cyan());
            }
        }
    }
    Ok(())
}
