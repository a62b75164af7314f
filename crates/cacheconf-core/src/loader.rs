//! Configuration file loader
//!
//! Reads an option file line by line and feeds each non-blank line to the
//! parser, stopping at the first line that fails. The result is that of the
//! last line parsed ("last statement wins"), not an aggregate.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use tracing::{info, warn};

use crate::handle::ClientHandle;
use crate::return_code::ReturnCode;

/// Parse every line of `path` into `handle`
pub fn parse_configure_file(handle: &mut ClientHandle, path: &Path) -> ReturnCode {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "cannot open configuration file");
            return record_io_error(handle, path, &err);
        }
    };
    info!(path = %path.display(), "loading configuration file");

    let mut rc = ReturnCode::Success;
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                warn!(
                    path = %path.display(),
                    line = index + 1,
                    error = %err,
                    "cannot read configuration file"
                );
                return record_io_error(handle, path, &err);
            }
        };

        if line.is_empty() {
            continue;
        }

        rc = handle.parse_configuration(&line);
        if rc.is_failure() {
            warn!(
                path = %path.display(),
                line = index + 1,
                rc = %rc,
                "configuration line rejected"
            );
            break;
        }
    }

    rc
}

fn record_io_error(handle: &mut ClientHandle, path: &Path, err: &io::Error) -> ReturnCode {
    let message = path.display().to_string();
    match err.raw_os_error() {
        Some(errno) => handle.set_errno(errno, Some(&message)),
        None if err.kind() == io::ErrorKind::InvalidData => handle.set_error(
            ReturnCode::InvalidArguments,
            Some(&format!("{message}: {err}")),
        ),
        None => handle.set_errno(0, Some(&message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::Behavior;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_file() {
        let file = write_config("--SERVER=host:11211\n\n--BINARY-PROTOCOL\n");
        let mut handle = ClientHandle::new();

        let rc = parse_configure_file(&mut handle, file.path());
        assert_eq!(rc, ReturnCode::Success);
        assert_eq!(handle.servers().len(), 1);
        assert_eq!(handle.behavior_get(Behavior::BinaryProtocol), 1);
        assert!(handle.errors().is_empty());
    }

    #[test]
    fn test_stops_at_first_bad_line() {
        let file = write_config("--SERVER=host:11211\n--BAD\n--SERVER=other:11211\n");
        let mut handle = ClientHandle::new();

        let rc = parse_configure_file(&mut handle, file.path());
        assert_eq!(rc, ReturnCode::InvalidArguments);
        assert_eq!(handle.servers().len(), 1);
        assert_eq!(handle.servers()[0].to_string(), "host:11211");
        assert!(handle.last_error_message().contains("BAD"));
    }

    #[test]
    fn test_empty_file_is_success() {
        let file = write_config("\n\n");
        let mut handle = ClientHandle::new();
        assert_eq!(parse_configure_file(&mut handle, file.path()), ReturnCode::Success);
    }

    #[test]
    fn test_missing_file_records_errno() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.conf");
        let mut handle = ClientHandle::new();

        let rc = parse_configure_file(&mut handle, &path);
        assert_eq!(rc, ReturnCode::Errno);
        assert_eq!(handle.last_error(), ReturnCode::Errno);
        assert_ne!(handle.last_error_errno(), 0);
        assert_eq!(handle.last_error_message(), path.display().to_string());
    }

    #[test]
    fn test_invalid_utf8_line() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"--SERVER=a:1\n\xff\xfe\n").unwrap();
        file.flush().unwrap();
        let mut handle = ClientHandle::new();

        let rc = parse_configure_file(&mut handle, file.path());
        assert_eq!(rc, ReturnCode::InvalidArguments);
        assert_eq!(handle.last_error(), ReturnCode::InvalidArguments);
        assert_eq!(handle.servers().len(), 1);
        assert_eq!(handle.servers()[0].to_string(), "a:1");
        assert!(handle
            .last_error_message()
            .contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_comments_are_ignored() {
        let file = write_config("# cache cluster\n--SERVER=a:1 # primary\n");
        let mut handle = ClientHandle::new();
        assert_eq!(parse_configure_file(&mut handle, file.path()), ReturnCode::Success);
        assert_eq!(handle.servers().len(), 1);
    }
}
