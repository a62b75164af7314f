//! Validation entry point
//!
//! Validates option text against a throwaway handle, for tooling that has
//! no live handle of its own.

use tracing::debug;

use crate::behavior::Behavior;
use crate::handle::ClientHandle;
use crate::return_code::ReturnCode;

/// Parse `option_string` (and the file it names, if any) on a scratch handle.
///
/// When `error_buffer` is supplied, its first byte is cleared up front. On
/// failure the head error message is copied in, truncated to
/// `capacity - 1` bytes and terminated with `0`.
pub fn check_configuration(
    option_string: &str,
    mut error_buffer: Option<&mut [u8]>,
) -> ReturnCode {
    if let Some(buffer) = error_buffer.as_deref_mut() {
        let Some(first) = buffer.first_mut() else {
            return ReturnCode::InvalidArguments;
        };
        *first = 0;
    }

    if option_string.is_empty() {
        return ReturnCode::InvalidArguments;
    }

    let mut handle = ClientHandle::new();
    let mut rc = handle.parse_configuration(option_string);
    if rc.is_success() && handle.behavior_get(Behavior::LoadFromFile) != 0 {
        rc = handle.load_configuration_file();
    }

    if rc.is_failure() {
        debug!(rc = %rc, "configuration check failed");
        if let Some(buffer) = error_buffer {
            copy_message(buffer, handle.last_error_message());
        }
    }

    rc
}

fn copy_message(buffer: &mut [u8], message: &str) {
    let Some(room) = buffer.len().checked_sub(1) else {
        return;
    };
    let len = message.len().min(room);
    buffer[..len].copy_from_slice(&message.as_bytes()[..len]);
    buffer[len] = 0;
}

/// The bytes before the terminator, for callers reading a filled buffer
pub fn message_in(buffer: &[u8]) -> &[u8] {
    let end = buffer.iter().position(|&b| b == 0).unwrap_or(buffer.len());
    &buffer[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_valid_text() {
        let mut buffer = [b'x'; 64];
        let rc = check_configuration("--SERVER=127.0.0.1:11211", Some(&mut buffer[..]));
        assert_eq!(rc, ReturnCode::Success);
        assert_eq!(buffer[0], 0);
    }

    #[test]
    fn test_empty_text() {
        let mut buffer = [b'x'; 8];
        assert_eq!(
            check_configuration("", Some(&mut buffer[..])),
            ReturnCode::InvalidArguments
        );
        assert_eq!(buffer[0], 0);
        assert!(buffer[1..].iter().all(|&b| b == b'x'));
    }

    #[test]
    fn test_zero_capacity() {
        let mut buffer: [u8; 0] = [];
        assert_eq!(
            check_configuration("--SERVER=a", Some(&mut buffer[..])),
            ReturnCode::InvalidArguments
        );
    }

    #[test]
    fn test_without_buffer() {
        assert_eq!(check_configuration("--NOPE", None), ReturnCode::InvalidArguments);
        assert_eq!(check_configuration("--SORT-HOSTS", None), ReturnCode::Success);
    }

    #[test]
    fn test_message_copied() {
        let mut buffer = [0u8; 128];
        let rc = check_configuration("--NOT-A-REAL-FLAG", Some(&mut buffer[..]));
        assert_eq!(rc, ReturnCode::InvalidArguments);
        let message = std::str::from_utf8(message_in(&buffer)).unwrap();
        assert_eq!(message, "unknown directive '--NOT-A-REAL-FLAG' at 1:1");
    }

    #[test]
    fn test_capacity_of_one_holds_terminator_only() {
        let mut buffer = [b'x'; 1];
        let _ = check_configuration("--NOPE", Some(&mut buffer[..]));
        assert_eq!(buffer, [0]);
    }

    #[test]
    fn test_missing_configure_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.conf");
        let text = format!("--CONFIGURE-FILE={}", path.display());

        let mut buffer = [0u8; 256];
        assert_eq!(check_configuration(&text, Some(&mut buffer[..])), ReturnCode::Errno);
        assert_eq!(message_in(&buffer), path.display().to_string().as_bytes());
    }

    proptest! {
        #[test]
        fn prop_message_is_truncated(capacity in 1usize..64, name in "[A-Z]{1,80}") {
            let mut buffer = vec![b'x'; capacity];
            let rc = check_configuration(&format!("--ZZ{name}"), Some(&mut buffer[..]));
            prop_assert_eq!(rc, ReturnCode::InvalidArguments);

            let message = message_in(&buffer);
            prop_assert!(message.len() < capacity);
            prop_assert_eq!(buffer[message.len()], 0);

            let full = format!("unknown directive '--ZZ{name}' at 1:1");
            prop_assert_eq!(message, &full.as_bytes()[..message.len()]);
            prop_assert_eq!(message.len(), full.len().min(capacity - 1));
        }
    }
}
