//! Error Chain
//!
//! LIFO log of diagnostic records attached to a client handle. Records are
//! only ever prepended; once linked they are never reordered or mutated.
//! The chain accumulates across calls until it is cleared or its owner is
//! dropped, so the most recent failure is always at the head.

use std::io::{self, Write};

use crate::return_code::ReturnCode;

/// One recorded failure
#[derive(Debug)]
pub struct ErrorRecord {
    code: ReturnCode,
    local_errno: i32,
    message: Box<str>,
    next: Option<Box<ErrorRecord>>,
}

impl ErrorRecord {
    /// Copy `message` into a new record.
    ///
    /// Returns `None` when the copy cannot be allocated.
    fn new(code: ReturnCode, local_errno: i32, message: Option<&str>) -> Option<Self> {
        let message = message.unwrap_or_default();
        let mut owned = String::new();
        owned.try_reserve_exact(message.len()).ok()?;
        owned.push_str(message);

        Some(Self {
            code,
            local_errno,
            message: owned.into_boxed_str(),
            next: None,
        })
    }

    pub fn code(&self) -> ReturnCode {
        self.code
    }

    /// OS error number, 0 unless the failure came from a system call
    pub fn local_errno(&self) -> i32 {
        self.local_errno
    }

    /// Recorded message, possibly empty
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Message if present, otherwise the canonical text of the code
    pub fn display_message(&self) -> &str {
        if self.message.is_empty() {
            self.code.as_str()
        } else {
            &self.message
        }
    }
}

/// Singly linked list of records, newest first
#[derive(Debug, Default)]
pub struct ErrorChain {
    head: Option<Box<ErrorRecord>>,
    len: usize,
}

impl ErrorChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend a record. Returns the new head, or `None` if the record could
    /// not be allocated (the chain is left untouched).
    pub fn push(
        &mut self,
        code: ReturnCode,
        local_errno: i32,
        message: Option<&str>,
    ) -> Option<&ErrorRecord> {
        let mut record = Box::new(ErrorRecord::new(code, local_errno, message)?);
        record.next = self.head.take();
        self.head = Some(record);
        self.len += 1;
        self.head.as_deref()
    }

    pub fn head(&self) -> Option<&ErrorRecord> {
        self.head.as_deref()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Walk records from newest to oldest
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            next: self.head.as_deref(),
        }
    }

    /// Write every record, most recent first, one per line
    pub fn print<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for record in self.iter() {
            if record.message.is_empty() {
                writeln!(out, "{}", record.code)?;
            } else {
                writeln!(out, "{} {}", record.code, record.message)?;
            }
        }
        Ok(())
    }

    /// Release every record
    pub fn clear(&mut self) {
        // Unlink each successor before its owner drops so teardown never
        // recurses through the list.
        let mut current = self.head.take();
        while let Some(mut record) = current {
            current = record.next.take();
        }
        self.len = 0;
    }
}

impl Drop for ErrorChain {
    fn drop(&mut self) {
        self.clear();
    }
}

pub struct Iter<'a> {
    next: Option<&'a ErrorRecord>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a ErrorRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.next?;
        self.next = record.next.as_deref();
        Some(record)
    }
}

impl<'a> IntoIterator for &'a ErrorChain {
    type Item = &'a ErrorRecord;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_push_prepends() {
        let mut chain = ErrorChain::new();
        let _ = chain.push(ReturnCode::InvalidArguments, 0, Some("first"));
        let _ = chain.push(ReturnCode::Errno, 2, Some("second"));

        assert_eq!(chain.len(), 2);
        let head = chain.head().unwrap();
        assert_eq!(head.code(), ReturnCode::Errno);
        assert_eq!(head.local_errno(), 2);
        assert_eq!(head.message(), "second");

        let messages: Vec<&str> = chain.iter().map(ErrorRecord::message).collect();
        assert_eq!(messages, vec!["second", "first"]);
    }

    #[test]
    fn test_record_owns_its_copy() {
        let mut chain = ErrorChain::new();
        let mut buffer = String::from("unknown directive '--FOO'");
        let _ = chain.push(ReturnCode::InvalidArguments, 0, Some(&buffer));
        buffer.clear();
        buffer.push_str("reused");

        assert_eq!(chain.head().unwrap().message(), "unknown directive '--FOO'");
    }

    #[test]
    fn test_display_message_falls_back_to_code() {
        let mut chain = ErrorChain::new();
        let _ = chain.push(ReturnCode::Timeout, 0, None);
        assert_eq!(chain.head().unwrap().display_message(), "A TIMEOUT OCCURRED");
    }

    #[test]
    fn test_print_most_recent_first() {
        let mut chain = ErrorChain::new();
        let _ = chain.push(ReturnCode::ParseUserError, 0, None);
        let _ = chain.push(ReturnCode::InvalidArguments, 0, Some("bad value"));

        let mut out = Vec::new();
        chain.print(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "INVALID ARGUMENTS bad value\nPARSE USER ERROR\n"
        );
    }

    #[test]
    fn test_clear_empties_chain() {
        let mut chain = ErrorChain::new();
        let _ = chain.push(ReturnCode::Failure, 0, Some("x"));
        chain.clear();
        assert!(chain.is_empty());
        assert_eq!(chain.len(), 0);
        assert!(chain.head().is_none());
    }

    #[test]
    fn test_long_chain_teardown_is_iterative() {
        let mut chain = ErrorChain::new();
        for _ in 0..100_000 {
            let _ = chain.push(ReturnCode::Failure, 0, Some("x"));
        }
        assert_eq!(chain.len(), 100_000);
        chain.clear();
        assert!(chain.is_empty());

        for _ in 0..100_000 {
            let _ = chain.push(ReturnCode::Failure, 0, None);
        }
        drop(chain);
    }
}
